//! Fixed 25-byte entry header
//!
//! SPDX-FileCopyrightText: 2025 Zircon Library Editor contributors
//!
//! SPDX-License-Identifier: MIT

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use super::LayerKind;
use crate::error::{Error, Result};

/// Size of a serialized entry header
pub const ENTRY_HEADER_SIZE: usize = 25;

/// Position of an entry that has not been written to a file yet
pub const UNPLACED_POSITION: i32 = -1;

/// Per-entry metadata, in on-disk field order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryHeader {
    /// Absolute offset of the entry's payloads; 0 means no data
    pub position: i32,
    pub width: i16,
    pub height: i16,
    pub offset_x: i16,
    pub offset_y: i16,
    /// Renderer-defined shadow style
    pub shadow_type: u8,
    pub shadow_width: i16,
    pub shadow_height: i16,
    pub shadow_offset_x: i16,
    pub shadow_offset_y: i16,
    pub overlay_width: i16,
    pub overlay_height: i16,
}

impl EntryHeader {
    /// Read a header
    ///
    /// # Errors
    /// Returns [`Error::Io`] if the reader runs dry and
    /// [`Error::MalformedHeader`] if a stored dimension is negative.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let header = Self {
            position: reader.read_i32::<LittleEndian>()?,

            width: reader.read_i16::<LittleEndian>()?,
            height: reader.read_i16::<LittleEndian>()?,
            offset_x: reader.read_i16::<LittleEndian>()?,
            offset_y: reader.read_i16::<LittleEndian>()?,

            shadow_type: reader.read_u8()?,
            shadow_width: reader.read_i16::<LittleEndian>()?,
            shadow_height: reader.read_i16::<LittleEndian>()?,
            shadow_offset_x: reader.read_i16::<LittleEndian>()?,
            shadow_offset_y: reader.read_i16::<LittleEndian>()?,

            overlay_width: reader.read_i16::<LittleEndian>()?,
            overlay_height: reader.read_i16::<LittleEndian>()?,
        };

        for kind in LayerKind::ALL {
            let (width, height) = header.raw_dimensions(kind);
            if width < 0 || height < 0 {
                return Err(Error::malformed(format!(
                    "negative {} dimensions {width}x{height}",
                    kind.as_str()
                )));
            }
        }

        Ok(header)
    }

    /// Write the header in the same order [`EntryHeader::read`] expects
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32::<LittleEndian>(self.position)?;

        writer.write_i16::<LittleEndian>(self.width)?;
        writer.write_i16::<LittleEndian>(self.height)?;
        writer.write_i16::<LittleEndian>(self.offset_x)?;
        writer.write_i16::<LittleEndian>(self.offset_y)?;

        writer.write_u8(self.shadow_type)?;
        writer.write_i16::<LittleEndian>(self.shadow_width)?;
        writer.write_i16::<LittleEndian>(self.shadow_height)?;
        writer.write_i16::<LittleEndian>(self.shadow_offset_x)?;
        writer.write_i16::<LittleEndian>(self.shadow_offset_y)?;

        writer.write_i16::<LittleEndian>(self.overlay_width)?;
        writer.write_i16::<LittleEndian>(self.overlay_height)?;

        Ok(())
    }

    /// Stored width/height of a layer
    #[must_use]
    pub fn raw_dimensions(&self, kind: LayerKind) -> (i16, i16) {
        match kind {
            LayerKind::Image => (self.width, self.height),
            LayerKind::Shadow => (self.shadow_width, self.shadow_height),
            LayerKind::Overlay => (self.overlay_width, self.overlay_height),
        }
    }

    pub(crate) fn set_dimensions(&mut self, kind: LayerKind, width: i16, height: i16) {
        match kind {
            LayerKind::Image => (self.width, self.height) = (width, height),
            LayerKind::Shadow => (self.shadow_width, self.shadow_height) = (width, height),
            LayerKind::Overlay => (self.overlay_width, self.overlay_height) = (width, height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn sample() -> EntryHeader {
        EntryHeader {
            position: 1234,
            width: 61,
            height: 7,
            offset_x: -12,
            offset_y: 40,
            shadow_type: 49,
            shadow_width: 33,
            shadow_height: 16,
            shadow_offset_x: -3,
            shadow_offset_y: 5,
            overlay_width: 8,
            overlay_height: 12,
        }
    }

    #[test]
    fn test_header_round_trip() {
        let header = sample();
        let mut bytes = Vec::new();
        header.write(&mut bytes).unwrap();
        assert_eq!(bytes.len(), ENTRY_HEADER_SIZE);

        let read = EntryHeader::read(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(read, header);
    }

    #[test]
    fn test_header_round_trip_extremes() {
        let header = EntryHeader {
            position: i32::MAX,
            width: i16::MAX,
            height: i16::MAX,
            offset_x: i16::MIN,
            offset_y: i16::MIN,
            shadow_type: u8::MAX,
            shadow_width: i16::MAX,
            shadow_height: 0,
            shadow_offset_x: i16::MIN,
            shadow_offset_y: i16::MAX,
            overlay_width: 0,
            overlay_height: i16::MAX,
        };
        let mut bytes = Vec::new();
        header.write(&mut bytes).unwrap();
        assert_eq!(bytes.len(), ENTRY_HEADER_SIZE);
        assert_eq!(EntryHeader::read(&mut Cursor::new(&bytes)).unwrap(), header);

        let zeroed = EntryHeader::default();
        let mut bytes = Vec::new();
        zeroed.write(&mut bytes).unwrap();
        assert_eq!(bytes, vec![0u8; ENTRY_HEADER_SIZE]);
        assert_eq!(EntryHeader::read(&mut Cursor::new(&bytes)).unwrap(), zeroed);
    }

    #[test]
    fn test_header_field_order() {
        let mut bytes = Vec::new();
        sample().write(&mut bytes).unwrap();

        assert_eq!(&bytes[0..4], &1234i32.to_le_bytes());
        assert_eq!(&bytes[4..6], &61i16.to_le_bytes());
        assert_eq!(&bytes[8..10], &(-12i16).to_le_bytes());
        assert_eq!(bytes[12], 49);
        assert_eq!(&bytes[13..15], &33i16.to_le_bytes());
        assert_eq!(&bytes[21..23], &8i16.to_le_bytes());
        assert_eq!(&bytes[23..25], &12i16.to_le_bytes());
    }

    #[test]
    fn test_negative_dimension_rejected() {
        let mut header = sample();
        header.shadow_height = -4;
        let mut bytes = Vec::new();
        header.write(&mut bytes).unwrap();

        let err = EntryHeader::read(&mut Cursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader { .. }));
    }

    #[test]
    fn test_short_header_is_io_error() {
        let err = EntryHeader::read(&mut Cursor::new(&[0u8; 10])).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
