//! SPDX-FileCopyrightText: 2025 Zircon Library Editor contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Mir3 library container
//!
//! A library file is a length-prefixed header block followed by the
//! compressed payloads of every stored entry:
//!
//! ```text
//! i32 header_len
//! header block (header_len bytes):
//!     i32 slot_count
//!     per slot: u8 present, then the 25-byte entry header if present
//! payloads, per present slot in index order: image, shadow, overlay
//! ```
//!
//! Opening a library reads only the header block. Layer payloads are read
//! from the backing stream on demand until [`LibraryContainer::close`].

mod reader;
mod writer;

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::{Path, PathBuf};

use crate::codec::BlockCodec;
use crate::entry::{ImageEntry, LayerKind};
use crate::error::{Error, Result};
use crate::options::LibraryOptions;
use crate::pixel::{thumbnail, PixelBuffer};

pub use reader::ReadSeek;

/// Size of the outer `header_len` prefix
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Size of the `slot_count` field at the start of the header block
pub const COUNT_FIELD_SIZE: usize = 4;

/// One position in a library
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Slot {
    /// Index is occupied but carries no entry
    #[default]
    Absent,
    Present(ImageEntry),
}

impl Slot {
    #[must_use]
    pub fn entry(&self) -> Option<&ImageEntry> {
        match self {
            Self::Present(entry) => Some(entry),
            Self::Absent => None,
        }
    }

    pub fn entry_mut(&mut self) -> Option<&mut ImageEntry> {
        match self {
            Self::Present(entry) => Some(entry),
            Self::Absent => None,
        }
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Absent, or present without any layer data
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.entry().is_none_or(|entry| !entry.has_data())
    }
}

/// An ordered sequence of optional entries plus the stream they load from
#[derive(Default)]
pub struct LibraryContainer {
    path: Option<PathBuf>,
    slots: Vec<Slot>,
    source: Option<Box<dyn ReadSeek>>,
    options: LibraryOptions,
    codec: BlockCodec,
}

impl fmt::Debug for LibraryContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryContainer")
            .field("path", &self.path)
            .field("slots", &self.slots.len())
            .field("open", &self.is_open())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl LibraryContainer {
    /// Create an empty library with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the options; the encoder for new entries follows them
    #[must_use]
    pub fn with_options(mut self, options: LibraryOptions) -> Self {
        self.codec = BlockCodec::new(options.compression);
        self.options = options;
        self
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Open a library file, reading only its header table
    ///
    /// A path that does not exist yet yields an empty library bound to that
    /// path, so it can be populated and saved.
    ///
    /// # Errors
    /// Returns [`Error::MalformedHeader`] for an inconsistent header block
    /// or an IO error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, LibraryOptions::default())
    }

    /// Open a library file with explicit options
    ///
    /// # Errors
    /// See [`LibraryContainer::open`].
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: LibraryOptions) -> Result<Self> {
        let path = path.as_ref();
        let mut container = Self::new().with_options(options);
        container.path = Some(path.to_path_buf());

        if !path.exists() {
            tracing::info!("{} does not exist, starting an empty library", path.display());
            return Ok(container);
        }

        let file = File::open(path)?;
        container.load(BufReader::new(file))?;
        Ok(container)
    }

    /// Read the header table from any seekable stream, which is kept for
    /// lazy payload reads
    ///
    /// # Errors
    /// See [`LibraryContainer::open`].
    pub fn from_reader<R: Read + Seek + 'static>(reader: R, options: LibraryOptions) -> Result<Self> {
        let mut container = Self::new().with_options(options);
        container.load(reader)?;
        Ok(container)
    }

    /// Open a library, read every entry's compressed payloads and release
    /// the file
    ///
    /// # Errors
    /// See [`LibraryContainer::open`]; payload reads may also fail with
    /// [`Error::TruncatedPayload`].
    pub fn read_fully<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut container = Self::open(path)?;
        container.preload()?;
        container.close();
        Ok(container)
    }

    fn load<R: Read + Seek + 'static>(&mut self, mut reader: R) -> Result<()> {
        self.slots = reader::read_slots(&mut reader, self.options.validate_header)?;
        self.source = Some(Box::new(reader));

        tracing::info!(
            "Loaded library header: {} slots ({} present)",
            self.slots.len(),
            self.slots.iter().filter(|slot| !slot.is_absent()).count()
        );
        Ok(())
    }

    /// Read the compressed payloads of every entry without decoding them
    ///
    /// # Errors
    /// Returns [`Error::StreamClosed`] if a payload is still on disk after
    /// [`LibraryContainer::close`], or a payload read error.
    pub fn preload(&mut self) -> Result<()> {
        for slot in &mut self.slots {
            if let Some(entry) = slot.entry_mut() {
                entry.load_payloads(self.source.as_deref_mut())?;
            }
        }
        Ok(())
    }

    /// Release the backing stream; idempotent
    pub fn close(&mut self) {
        if self.source.take().is_some() {
            tracing::debug!("Closed library stream");
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Path the library was opened from or last saved to
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn options(&self) -> &LibraryOptions {
        &self.options
    }

    #[must_use]
    pub fn codec(&self) -> &BlockCodec {
        &self.codec
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Entry at `index`; `None` for absent slots and out-of-range indices
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&ImageEntry> {
        self.slots.get(index).and_then(Slot::entry)
    }

    pub fn entry_mut(&mut self, index: usize) -> Option<&mut ImageEntry> {
        self.slots.get_mut(index).and_then(Slot::entry_mut)
    }

    /// Present entries with their slot indices
    pub fn entries(&self) -> impl Iterator<Item = (usize, &ImageEntry)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.entry().map(|entry| (index, entry)))
    }

    /// Decode one layer of the entry at `index`
    ///
    /// Absent slots, out-of-range indices and layers without data give
    /// `Ok(None)`.
    ///
    /// # Errors
    /// See [`ImageEntry::materialize`].
    pub fn materialize(&mut self, index: usize, kind: LayerKind) -> Result<Option<&PixelBuffer>> {
        let Some(entry) = self.slots.get_mut(index).and_then(Slot::entry_mut) else {
            return Ok(None);
        };
        entry.materialize(kind, self.source.as_deref_mut())
    }

    /// Preview of a materialized layer at the configured thumbnail size
    ///
    /// Falls back to a 1x1 transparent placeholder.
    #[must_use]
    pub fn thumbnail(&self, index: usize, kind: LayerKind) -> PixelBuffer {
        match self.entry(index) {
            Some(entry) => entry.thumbnail(kind, self.options.thumbnail_edge()),
            None => thumbnail::placeholder(),
        }
    }

    // ========================================================================
    // Editing
    // ========================================================================

    fn build_entry(
        &self,
        image: Option<PixelBuffer>,
        shadow: Option<PixelBuffer>,
        overlay: Option<PixelBuffer>,
        offset_x: i16,
        offset_y: i16,
    ) -> Result<ImageEntry> {
        let mut entry = ImageEntry::encode_from_images(&self.codec, image, shadow, overlay)?;
        entry.set_offset(offset_x, offset_y);
        Ok(entry)
    }

    /// Append a new entry, returning its index
    ///
    /// # Errors
    /// See [`ImageEntry::encode_from_images`].
    pub fn add_entry(
        &mut self,
        image: Option<PixelBuffer>,
        shadow: Option<PixelBuffer>,
        overlay: Option<PixelBuffer>,
        offset_x: i16,
        offset_y: i16,
    ) -> Result<usize> {
        let entry = self.build_entry(image, shadow, overlay, offset_x, offset_y)?;
        self.slots.push(Slot::Present(entry));
        Ok(self.slots.len() - 1)
    }

    /// Insert a new entry before `index`, shifting later slots up
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if `index > len`, or an encoding
    /// error.
    pub fn insert_entry(
        &mut self,
        index: usize,
        image: Option<PixelBuffer>,
        shadow: Option<PixelBuffer>,
        overlay: Option<PixelBuffer>,
        offset_x: i16,
        offset_y: i16,
    ) -> Result<()> {
        if index > self.slots.len() {
            return Err(self.out_of_range(index));
        }
        let entry = self.build_entry(image, shadow, overlay, offset_x, offset_y)?;
        self.slots.insert(index, Slot::Present(entry));
        Ok(())
    }

    /// Replace the slot at `index` with a new entry
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if `index >= len`, or an encoding
    /// error.
    pub fn replace_entry(
        &mut self,
        index: usize,
        image: Option<PixelBuffer>,
        shadow: Option<PixelBuffer>,
        overlay: Option<PixelBuffer>,
        offset_x: i16,
        offset_y: i16,
    ) -> Result<()> {
        if index >= self.slots.len() {
            return Err(self.out_of_range(index));
        }
        let entry = self.build_entry(image, shadow, overlay, offset_x, offset_y)?;
        self.slots[index] = Slot::Present(entry);
        Ok(())
    }

    /// Remove the slot at `index`
    ///
    /// A library with at most one slot is cleared whatever the index.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if `index >= len` on a longer
    /// library.
    pub fn remove_entry(&mut self, index: usize) -> Result<()> {
        if self.slots.len() <= 1 {
            self.slots.clear();
            return Ok(());
        }
        if index >= self.slots.len() {
            return Err(self.out_of_range(index));
        }
        self.slots.remove(index);
        Ok(())
    }

    /// Remove absent slots and entries without data, returning how many
    /// were removed
    ///
    /// Safe mode removes nothing.
    pub fn remove_blanks(&mut self, safe: bool) -> usize {
        if safe {
            tracing::warn!("Safe blank removal has no defined criteria, leaving library unchanged");
            return 0;
        }

        let before = self.slots.len();
        self.slots.retain(|slot| !slot.is_blank());
        let removed = before - self.slots.len();

        if removed > 0 {
            tracing::info!("Removed {} blank slots", removed);
        }
        removed
    }

    fn out_of_range(&self, index: usize) -> Error {
        Error::IndexOutOfRange {
            index,
            len: self.slots.len(),
        }
    }

    // ========================================================================
    // Saving
    // ========================================================================

    /// Size the header block would have if saved now
    #[must_use]
    pub fn header_size(&self) -> usize {
        writer::header_size(&self.slots)
    }

    /// Serialize the library, assigning every stored entry its new position
    ///
    /// Payloads still on disk are read first.
    ///
    /// # Errors
    /// Returns [`Error::StreamClosed`] if a payload is needed after close,
    /// [`Error::LibraryTooLarge`] past 32-bit offsets, or an IO error.
    pub fn write_to<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        self.preload()?;
        writer::assign_positions(&mut self.slots)?;
        writer::write_library(writer, &self.slots)
    }

    /// Serialize the library into memory
    ///
    /// # Errors
    /// See [`LibraryContainer::write_to`].
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.preload()?;
        let total = writer::assign_positions(&mut self.slots)?;

        let mut bytes = Vec::with_capacity(total);
        writer::write_library(&mut bytes, &self.slots)?;
        Ok(bytes)
    }

    /// Write the library to `path` in a single call
    ///
    /// # Errors
    /// See [`LibraryContainer::write_to`].
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        std::fs::write(path, &bytes)?;

        tracing::info!(
            "Saved {} slots ({} bytes) to {}",
            self.slots.len(),
            bytes.len(),
            path.display()
        );
        self.path = Some(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn solid(width: u32, height: u32) -> Option<PixelBuffer> {
        Some(PixelBuffer::from_raw(width, height, [30, 60, 90, 255].repeat((width * height) as usize)).unwrap())
    }

    fn sample() -> LibraryContainer {
        let mut library = LibraryContainer::new();
        library.add_entry(solid(4, 4), None, None, 1, 2).unwrap();
        library.add_entry(None, None, None, 0, 0).unwrap();
        library.add_entry(solid(8, 4), solid(4, 4), None, -3, 5).unwrap();
        library
    }

    #[test]
    fn test_round_trip_through_memory() {
        let bytes = sample().to_bytes().unwrap();
        let mut loaded = LibraryContainer::from_reader(Cursor::new(bytes), LibraryOptions::default()).unwrap();

        assert_eq!(loaded.len(), 3);
        assert!(loaded.slot(1).unwrap().is_absent());
        assert_eq!(loaded.entry(2).unwrap().offset(), (-3, 5));

        let shadow = loaded.materialize(2, LayerKind::Shadow).unwrap().unwrap();
        assert_eq!((shadow.width(), shadow.height()), (4, 4));
        assert!(loaded.materialize(1, LayerKind::Image).unwrap().is_none());
        assert!(loaded.materialize(9, LayerKind::Image).unwrap().is_none());
    }

    #[test]
    fn test_materialize_after_close_fails() {
        let bytes = sample().to_bytes().unwrap();
        let mut loaded = LibraryContainer::from_reader(Cursor::new(bytes), LibraryOptions::default()).unwrap();
        loaded.close();
        assert!(!loaded.is_open());

        let err = loaded.materialize(0, LayerKind::Image).unwrap_err();
        assert!(matches!(err, Error::StreamClosed));
        let err = loaded.to_bytes().unwrap_err();
        assert!(matches!(err, Error::StreamClosed));
    }

    #[test]
    fn test_preload_then_close_keeps_entries_usable() {
        let bytes = sample().to_bytes().unwrap();
        let mut loaded = LibraryContainer::from_reader(Cursor::new(bytes.clone()), LibraryOptions::default()).unwrap();
        loaded.preload().unwrap();
        loaded.close();

        assert!(loaded.materialize(0, LayerKind::Image).unwrap().is_some());
        assert_eq!(loaded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_remove_entry_on_single_slot_clears() {
        let mut library = LibraryContainer::new();
        library.add_entry(solid(4, 4), None, None, 0, 0).unwrap();
        library.remove_entry(7).unwrap();
        assert!(library.is_empty());

        let mut library = sample();
        let err = library.remove_entry(3).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 3, len: 3 }));
        library.remove_entry(0).unwrap();
        assert_eq!(library.entry(1).unwrap().offset(), (-3, 5));
    }

    #[test]
    fn test_positional_edits() {
        let mut library = sample();
        library.insert_entry(3, solid(4, 4), None, None, 7, 7).unwrap();
        assert_eq!(library.len(), 4);
        assert!(matches!(
            library.insert_entry(9, solid(4, 4), None, None, 0, 0),
            Err(Error::IndexOutOfRange { index: 9, len: 4 })
        ));

        library.replace_entry(1, solid(4, 4), None, None, 4, 4).unwrap();
        assert_eq!(library.entry(1).unwrap().offset(), (4, 4));
        assert!(library.replace_entry(4, None, None, None, 0, 0).is_err());
    }

    #[test]
    fn test_remove_blanks() {
        let mut library = sample();
        assert_eq!(library.remove_blanks(true), 0);
        assert_eq!(library.len(), 3);

        assert_eq!(library.remove_blanks(false), 1);
        assert_eq!(library.len(), 2);
        assert!(library.slots().iter().all(|slot| !slot.is_blank()));
    }

    #[test]
    fn test_thumbnail_uses_configured_size() {
        let mut library = LibraryContainer::new().with_options(LibraryOptions::default().with_thumbnail_size(16));
        library.add_entry(solid(8, 8), None, None, 0, 0).unwrap();

        let thumb = library.thumbnail(0, LayerKind::Image);
        assert_eq!((thumb.width(), thumb.height()), (16, 16));
        // 8x8 centered in 16x16
        assert_eq!(thumb.pixel(0, 0).unwrap()[3], 0);
        assert_eq!(thumb.pixel(4, 4), Some([30, 60, 90, 255]));

        let placeholder = library.thumbnail(5, LayerKind::Image);
        assert_eq!((placeholder.width(), placeholder.height()), (1, 1));
    }

    #[test]
    fn test_thumbnail_size_from_settings_is_clamped() {
        let options: LibraryOptions = serde_json::from_str(r#"{"thumbnail_size":0}"#).unwrap();
        let mut library = LibraryContainer::new().with_options(options);
        library.add_entry(solid(8, 8), None, None, 0, 0).unwrap();

        let thumb = library.thumbnail(0, LayerKind::Image);
        assert_eq!((thumb.width(), thumb.height()), (1, 1));
    }
}
