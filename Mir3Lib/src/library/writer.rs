//! Library serialization
//!
//! Two passes over the slots: size the header block and assign every written
//! entry its absolute position, then emit the framing, the interleaved header
//! table and the concatenated payloads.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

use super::{Slot, COUNT_FIELD_SIZE, LENGTH_PREFIX_SIZE};
use crate::entry::ENTRY_HEADER_SIZE;
use crate::error::{Error, Result};

/// True if the slot is stored with a header and payload
pub(crate) fn is_written(slot: &Slot) -> bool {
    slot.entry().is_some_and(|entry| entry.data_size() > 0)
}

/// Size of the header block: count field, one presence byte per slot and a
/// header per written slot
pub(crate) fn header_size(slots: &[Slot]) -> usize {
    let written = slots.iter().filter(|slot| is_written(slot)).count();
    COUNT_FIELD_SIZE + slots.len() + ENTRY_HEADER_SIZE * written
}

/// Give each written entry its absolute payload position
///
/// Returns the total file size.
pub(crate) fn assign_positions(slots: &mut [Slot]) -> Result<usize> {
    let mut position = header_size(slots) + LENGTH_PREFIX_SIZE;

    for slot in slots.iter_mut() {
        if !is_written(slot) {
            continue;
        }
        let Some(entry) = slot.entry_mut() else {
            continue;
        };

        let placed = i32::try_from(position).map_err(|_| Error::LibraryTooLarge { size: position })?;
        entry.set_position(placed);
        position += entry.data_size();
    }

    if i32::try_from(position).is_err() {
        return Err(Error::LibraryTooLarge { size: position });
    }

    Ok(position)
}

/// Serialize slots whose positions were assigned by [`assign_positions`]
pub(crate) fn write_library<W: Write>(writer: &mut W, slots: &[Slot]) -> Result<()> {
    let header_size = header_size(slots);

    // Both fit: assign_positions bounds the whole file by i32::MAX
    writer.write_i32::<LittleEndian>(header_size as i32)?;
    writer.write_i32::<LittleEndian>(slots.len() as i32)?;

    for slot in slots {
        match slot.entry().filter(|_| is_written(slot)) {
            Some(entry) => {
                writer.write_u8(1)?;
                entry.write_header(writer)?;
            }
            None => writer.write_u8(0)?,
        }
    }

    for entry in slots.iter().filter(|slot| is_written(slot)).filter_map(Slot::entry) {
        entry.write_payloads(writer)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{required_bytes, BlockCodec};
    use crate::entry::ImageEntry;
    use crate::pixel::PixelBuffer;
    use pretty_assertions::assert_eq;

    fn entry(width: u32, height: u32) -> Slot {
        let image = PixelBuffer::from_raw(width, height, [9, 9, 9, 255].repeat((width * height) as usize)).unwrap();
        Slot::Present(ImageEntry::encode_from_images(&BlockCodec::default(), Some(image), None, None).unwrap())
    }

    #[test]
    fn test_header_size_counts_written_slots_only() {
        let slots = vec![
            entry(4, 4),
            Slot::Absent,
            Slot::Present(ImageEntry::default()),
            entry(8, 8),
        ];
        assert_eq!(header_size(&slots), 4 + 4 + 2 * ENTRY_HEADER_SIZE);
    }

    #[test]
    fn test_positions_are_contiguous() {
        let mut slots = vec![entry(4, 4), Slot::Absent, entry(8, 8), entry(4, 8)];
        let total = assign_positions(&mut slots).unwrap();

        let first = (header_size(&slots) + 4) as i32;
        let positions: Vec<i32> = slots.iter().filter_map(Slot::entry).map(ImageEntry::position).collect();
        assert_eq!(
            positions,
            vec![
                first,
                first + required_bytes(4, 4) as i32,
                first + (required_bytes(4, 4) + required_bytes(8, 8)) as i32,
            ]
        );
        assert_eq!(total, first as usize + 8 + 32 + 16);
    }

    #[test]
    fn test_written_bytes_match_assigned_size() {
        let mut slots = vec![Slot::Absent, entry(12, 4), Slot::Present(ImageEntry::default())];
        let total = assign_positions(&mut slots).unwrap();

        let mut bytes = Vec::new();
        write_library(&mut bytes, &slots).unwrap();
        assert_eq!(bytes.len(), total);

        // Absent, present + header, empty entry written as absent
        assert_eq!(&bytes[4..8], &3i32.to_le_bytes());
        assert_eq!(bytes[8], 0);
        assert_eq!(bytes[9], 1);
        assert_eq!(bytes[10 + ENTRY_HEADER_SIZE], 0);
    }
}
