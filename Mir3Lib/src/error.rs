//! Error types for `Mir3Lib`

use thiserror::Error;

/// The error type for `Mir3Lib` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Library Container Errors ====================
    /// The header block is inconsistent with the stream it was read from.
    #[error("malformed library header: {reason}")]
    MalformedHeader {
        /// What was inconsistent.
        reason: String,
    },

    /// A lazy read was attempted after the backing stream was closed.
    #[error("library stream is closed")]
    StreamClosed,

    /// A positional edit referenced a slot that does not exist.
    #[error("slot index {index} out of range (library has {len} slots)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of slots in the library.
        len: usize,
    },

    /// The library would exceed the 32-bit offsets of the file format.
    #[error("library too large: {size} bytes")]
    LibraryTooLarge {
        /// The total size in bytes.
        size: usize,
    },

    // ==================== Codec Errors ====================
    /// Fewer compressed bytes were available than the codec requires.
    #[error("truncated payload: expected {expected} bytes, got {actual}")]
    TruncatedPayload {
        /// Bytes required for the layer's padded dimensions.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// Dimensions passed to the codec are not multiples of 4.
    #[error("invalid dimension {width}x{height}: must be multiples of 4")]
    InvalidDimension {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },

    /// Image dimensions do not fit the 16-bit header fields.
    #[error("image too large: {width}x{height} (max {max} per side)", max = i16::MAX)]
    ImageTooLarge {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },

    // ==================== Image Interop Errors ====================
    /// Failed to create an image buffer from pixel data.
    #[error("failed to create image buffer")]
    ImageBufferFailed,

    /// Failed to open or decode a PNG file.
    #[error("failed to open PNG: {message}")]
    PngOpenFailed {
        /// The error message.
        message: String,
    },

    /// Failed to encode a PNG image.
    #[error("failed to encode PNG: {message}")]
    PngEncodeFailed {
        /// The encoding error message.
        message: String,
    },
}

impl Error {
    /// Shorthand for [`Error::MalformedHeader`].
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedHeader {
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for `Mir3Lib` operations.
pub type Result<T> = std::result::Result<T, Error>;
