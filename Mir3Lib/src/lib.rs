#![allow(non_snake_case)]
//! # Mir3Lib
//!
//! A pure-Rust library for reading, editing and writing Mir3 sprite
//! libraries: indexed archives of DXT1-compressed sprites, each with an
//! optional shadow and overlay layer.
//!
//! ## Quick Start
//!
//! ### Reading a Library
//!
//! ```no_run
//! use mir3lib::prelude::*;
//!
//! let mut library = LibraryContainer::open("Mon-1.Zl")?;
//! println!("{} slots", library.len());
//!
//! // Payloads are decoded on demand
//! if let Some(pixels) = library.materialize(0, LayerKind::Image)? {
//!     pixels.save_png("frame0.png")?;
//! }
//! library.close();
//! # Ok::<(), mir3lib::Error>(())
//! ```
//!
//! ### Building a Library
//!
//! ```no_run
//! use mir3lib::prelude::*;
//!
//! let mut library = LibraryContainer::new()
//!     .with_options(LibraryOptions::default().with_compression(CompressionQuality::Best));
//!
//! let image = PixelBuffer::open("frame0.png")?;
//! let shadow = PixelBuffer::open("frame0_shadow.png")?;
//! library.add_entry(Some(image), Some(shadow), None, -24, -60)?;
//! library.save("Custom.Zl")?;
//! # Ok::<(), mir3lib::Error>(())
//! ```
//!
//! Pixel buffers are kept in surface order (B, G, R, A). The codec works on
//! R, G, B, A; the swap and the black-is-transparent keying happen when an
//! entry is encoded.

pub mod error;
pub mod options;
pub mod pixel;
pub mod codec;
pub mod entry;
pub mod library;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::options::{CompressionQuality, LibraryOptions};
    pub use crate::pixel::PixelBuffer;
    pub use crate::codec::{required_bytes, BlockCodec};
    pub use crate::entry::{EntryHeader, ImageEntry, LayerKind, LayerState};
    pub use crate::library::{LibraryContainer, Slot};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
