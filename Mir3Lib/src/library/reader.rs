//! SPDX-FileCopyrightText: 2025 Zircon Library Editor contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Library header table reader

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Cursor, Read, Seek, SeekFrom};

use super::{Slot, COUNT_FIELD_SIZE, LENGTH_PREFIX_SIZE};
use crate::entry::ImageEntry;
use crate::error::{Error, Result};

/// Trait for types that can Read and Seek
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Map running out of header bytes to a malformed-header error
fn header_eof(context: &str) -> impl FnOnce(Error) -> Error + '_ {
    move |err| match err {
        Error::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            Error::malformed(format!("header block ends inside {context}"))
        }
        other => other,
    }
}

/// Read the length-prefixed header block and build one slot per entry
///
/// Only metadata is read; payloads stay on disk.
///
/// # Errors
/// Returns [`Error::MalformedHeader`] if the declared sizes do not fit the
/// stream or the table ends early.
pub(crate) fn read_slots<R: Read + Seek + ?Sized>(reader: &mut R, validate: bool) -> Result<Vec<Slot>> {
    let stream_len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;

    if stream_len < LENGTH_PREFIX_SIZE as u64 {
        return Err(Error::malformed(format!(
            "stream is {stream_len} bytes, too short for the length prefix"
        )));
    }

    let header_len = reader.read_i32::<LittleEndian>()?;
    let header_len = usize::try_from(header_len)
        .ok()
        .filter(|&len| len >= COUNT_FIELD_SIZE)
        .ok_or_else(|| Error::malformed(format!("invalid header length {header_len}")))?;

    if validate && header_len as u64 > stream_len - LENGTH_PREFIX_SIZE as u64 {
        return Err(Error::malformed(format!(
            "header length {header_len} exceeds remaining stream length {}",
            stream_len - LENGTH_PREFIX_SIZE as u64
        )));
    }

    let mut block = vec![0u8; header_len];
    reader
        .read_exact(&mut block)
        .map_err(|e| header_eof("the length prefix's span")(e.into()))?;

    parse_header_block(&block)
}

/// Parse `slotCount` followed by one presence byte per slot, each present
/// flag immediately followed by that slot's entry header
fn parse_header_block(block: &[u8]) -> Result<Vec<Slot>> {
    let mut cursor = Cursor::new(block);

    let count = cursor.read_i32::<LittleEndian>()?;
    let count = usize::try_from(count)
        .map_err(|_| Error::malformed(format!("negative slot count {count}")))?;

    // Every slot needs at least its presence byte
    if count > block.len() - COUNT_FIELD_SIZE {
        return Err(Error::malformed(format!(
            "slot count {count} does not fit a {}-byte header block",
            block.len()
        )));
    }

    let mut slots = Vec::with_capacity(count);
    for index in 0..count {
        let present = cursor
            .read_u8()
            .map_err(|e| header_eof("a presence flag")(e.into()))?;

        if present == 0 {
            slots.push(Slot::Absent);
            continue;
        }

        let entry = ImageEntry::read_header(&mut cursor).map_err(header_eof("an entry header"))?;
        tracing::debug!(
            "Slot {}: {}x{} at position {}",
            index,
            entry.width(),
            entry.height(),
            entry.position()
        );
        slots.push(Slot::Present(entry));
    }

    let trailing = block.len() as u64 - cursor.position();
    if trailing > 0 {
        tracing::debug!("Ignoring {} trailing header bytes", trailing);
    }

    Ok(slots)
}
