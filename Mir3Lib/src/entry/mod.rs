//! Library entries
//!
//! An [`ImageEntry`] bundles an image layer with optional shadow and overlay
//! layers. On disk the three compressed payloads are packed back to back
//! starting at the entry's position: image first, then shadow, then overlay.
//!
//! SPDX-FileCopyrightText: 2025 Zircon Library Editor contributors
//!
//! SPDX-License-Identifier: MIT

mod header;
mod layer;

use std::io::{Read, Seek, SeekFrom, Write};

use image::RgbaImage;

use crate::codec::{required_bytes, BlockCodec};
use crate::error::{Error, Result};
use crate::pixel::{padded_dimension, render_thumbnail, thumbnail, PixelBuffer};

pub use header::{EntryHeader, ENTRY_HEADER_SIZE, UNPLACED_POSITION};
pub use layer::{LayerKind, LayerState};

/// One slot's worth of sprite data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageEntry {
    header: EntryHeader,
    image: LayerState,
    shadow: LayerState,
    overlay: LayerState,
    disposed: bool,
}

impl ImageEntry {
    /// Build an entry from header metadata; no payload is read
    #[must_use]
    pub fn from_header(header: EntryHeader) -> Self {
        let mut entry = Self {
            header,
            ..Self::default()
        };
        for kind in LayerKind::ALL {
            let (width, height) = entry.padded_dimensions(kind);
            if header.position > 0 && width != 0 && height != 0 {
                *entry.layer_mut(kind) = LayerState::Unloaded;
            }
        }
        entry
    }

    /// Read an entry header from a stream
    ///
    /// # Errors
    /// See [`EntryHeader::read`].
    pub fn read_header<R: Read>(reader: &mut R) -> Result<Self> {
        EntryHeader::read(reader).map(Self::from_header)
    }

    /// Compress caller-supplied layers into a new, unplaced entry
    ///
    /// Each buffer (surface order) is consumed: it is padded to 4-aligned
    /// dimensions and kept as the layer's decoded pixels alongside the
    /// compressed payload. The reported dimensions are the unpadded ones.
    /// Without an image the entry is empty and shadow/overlay are ignored.
    ///
    /// # Errors
    /// Returns [`Error::ImageTooLarge`] if a layer does not fit the header's
    /// 16-bit fields, or a codec error.
    pub fn encode_from_images(
        codec: &BlockCodec,
        image: Option<PixelBuffer>,
        shadow: Option<PixelBuffer>,
        overlay: Option<PixelBuffer>,
    ) -> Result<Self> {
        let Some(image) = image else {
            return Ok(Self::default());
        };

        let mut entry = Self::default();
        entry.header.position = UNPLACED_POSITION;

        for (kind, buffer) in [
            (LayerKind::Image, Some(image)),
            (LayerKind::Shadow, shadow),
            (LayerKind::Overlay, overlay),
        ] {
            if let Some(buffer) = buffer {
                entry.encode_layer(codec, kind, buffer)?;
            }
        }

        Ok(entry)
    }

    fn encode_layer(&mut self, codec: &BlockCodec, kind: LayerKind, buffer: PixelBuffer) -> Result<()> {
        let (width, height) = (buffer.width(), buffer.height());
        let (Ok(w), Ok(h)) = (i16::try_from(width), i16::try_from(height)) else {
            return Err(Error::ImageTooLarge { width, height });
        };
        self.header.set_dimensions(kind, w, h);

        if width == 0 || height == 0 {
            *self.layer_mut(kind) = LayerState::Empty;
            return Ok(());
        }

        let pixels = buffer.pad_to_4();
        let mut swizzled = pixels.clone();
        swizzled.swizzle_and_key_transparent();
        let payload = codec.compress(&swizzled)?;

        tracing::debug!(
            "Encoded {} layer {}x{} -> {} bytes",
            kind.as_str(),
            width,
            height,
            payload.len()
        );

        *self.layer_mut(kind) = LayerState::Both { pixels, payload };
        Ok(())
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    #[must_use]
    pub fn header(&self) -> &EntryHeader {
        &self.header
    }

    #[must_use]
    pub fn position(&self) -> i32 {
        self.header.position
    }

    pub(crate) fn set_position(&mut self, position: i32) {
        self.header.position = position;
    }

    #[must_use]
    pub fn width(&self) -> i16 {
        self.header.width
    }

    #[must_use]
    pub fn height(&self) -> i16 {
        self.header.height
    }

    #[must_use]
    pub fn offset(&self) -> (i16, i16) {
        (self.header.offset_x, self.header.offset_y)
    }

    /// Set the image placement offset
    pub fn set_offset(&mut self, offset_x: i16, offset_y: i16) {
        self.header.offset_x = offset_x;
        self.header.offset_y = offset_y;
    }

    #[must_use]
    pub fn shadow_type(&self) -> u8 {
        self.header.shadow_type
    }

    #[must_use]
    pub fn shadow_offset(&self) -> (i16, i16) {
        (self.header.shadow_offset_x, self.header.shadow_offset_y)
    }

    /// Set the shadow placement offset and renderer-defined shadow type
    pub fn set_shadow_placement(&mut self, offset_x: i16, offset_y: i16, shadow_type: u8) {
        self.header.shadow_offset_x = offset_x;
        self.header.shadow_offset_y = offset_y;
        self.header.shadow_type = shadow_type;
    }

    /// Reported (unpadded) dimensions of a layer
    #[must_use]
    pub fn dimensions(&self, kind: LayerKind) -> (u32, u32) {
        let (width, height) = self.header.raw_dimensions(kind);
        (width.max(0) as u32, height.max(0) as u32)
    }

    /// Dimensions rounded up to whole 4x4 blocks
    #[must_use]
    pub fn padded_dimensions(&self, kind: LayerKind) -> (u32, u32) {
        let (width, height) = self.dimensions(kind);
        (padded_dimension(width), padded_dimension(height))
    }

    /// Bytes the codec needs for a layer
    #[must_use]
    pub fn required_bytes(&self, kind: LayerKind) -> usize {
        let (width, height) = self.padded_dimensions(kind);
        required_bytes(width, height)
    }

    /// Offset of a layer's payload from the entry's position
    ///
    /// Only the dimensions of earlier layers are needed, not their data.
    #[must_use]
    pub fn layer_offset(&self, kind: LayerKind) -> u64 {
        let image = self.required_bytes(LayerKind::Image) as u64;
        match kind {
            LayerKind::Image => 0,
            LayerKind::Shadow => image,
            LayerKind::Overlay => image + self.required_bytes(LayerKind::Shadow) as u64,
        }
    }

    // ========================================================================
    // Layer state
    // ========================================================================

    #[must_use]
    pub fn layer(&self, kind: LayerKind) -> &LayerState {
        match kind {
            LayerKind::Image => &self.image,
            LayerKind::Shadow => &self.shadow,
            LayerKind::Overlay => &self.overlay,
        }
    }

    fn layer_mut(&mut self, kind: LayerKind) -> &mut LayerState {
        match kind {
            LayerKind::Image => &mut self.image,
            LayerKind::Shadow => &mut self.shadow,
            LayerKind::Overlay => &mut self.overlay,
        }
    }

    /// Decoded pixels of a layer, if materialized
    #[must_use]
    pub fn pixels(&self, kind: LayerKind) -> Option<&PixelBuffer> {
        self.layer(kind).pixels()
    }

    /// Compressed payload of a layer, if held in memory
    #[must_use]
    pub fn payload(&self, kind: LayerKind) -> Option<&[u8]> {
        self.layer(kind).payload()
    }

    /// Total bytes of compressed payload held in memory
    #[must_use]
    pub fn data_size(&self) -> usize {
        LayerKind::ALL
            .iter()
            .filter_map(|&kind| self.payload(kind))
            .map(<[u8]>::len)
            .sum()
    }

    /// True if any layer has data, in memory or on disk
    #[must_use]
    pub fn has_data(&self) -> bool {
        LayerKind::ALL.iter().any(|&kind| match self.layer(kind) {
            LayerState::Empty => false,
            LayerState::Unloaded => true,
            state => state.payload().is_none_or(|p| !p.is_empty()),
        })
    }

    /// True once [`ImageEntry::reset`] has been called
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ========================================================================
    // Materialization
    // ========================================================================

    /// Decode a layer, reading its payload from `source` if needed
    ///
    /// Returns `Ok(None)` for layers without data. Cached pixels are returned
    /// as-is; a cached payload is decoded without touching `source`. Pass
    /// `None` once the backing stream is closed.
    ///
    /// # Errors
    /// Returns [`Error::StreamClosed`] if the payload is still on disk and
    /// `source` is `None`, [`Error::TruncatedPayload`] if the stream ends
    /// early (the layer stays unloaded), or an IO error.
    pub fn materialize<R: Read + Seek + ?Sized>(
        &mut self,
        kind: LayerKind,
        source: Option<&mut R>,
    ) -> Result<Option<&PixelBuffer>> {
        match self.layer(kind) {
            LayerState::Empty => return Ok(None),
            LayerState::Unloaded => {
                if !self.fetch_payload(kind, source)? {
                    return Ok(None);
                }
            }
            LayerState::Decoded(_) | LayerState::Both { .. } | LayerState::Encoded(_) => {}
        }

        if !self.layer(kind).is_decoded() {
            let (width, height) = self.padded_dimensions(kind);
            let payload = self.layer(kind).payload().unwrap_or_default();
            let mut pixels = BlockCodec::decompress(payload, width, height)?;
            pixels.swizzle();

            tracing::debug!(
                "Materialized {} layer at position {} ({}x{})",
                kind.as_str(),
                self.header.position,
                width,
                height
            );
            self.layer_mut(kind).attach_pixels(pixels);
        }

        Ok(self.pixels(kind))
    }

    /// Read every unloaded layer's compressed payload without decoding
    ///
    /// # Errors
    /// Same as [`ImageEntry::materialize`].
    pub fn load_payloads<R: Read + Seek + ?Sized>(&mut self, mut source: Option<&mut R>) -> Result<()> {
        for kind in LayerKind::ALL {
            if matches!(self.layer(kind), LayerState::Unloaded) {
                self.fetch_payload(kind, source.as_deref_mut())?;
            }
        }
        Ok(())
    }

    /// Move an unloaded layer to `Encoded`; false if there is nothing on disk
    fn fetch_payload<R: Read + Seek + ?Sized>(
        &mut self,
        kind: LayerKind,
        source: Option<&mut R>,
    ) -> Result<bool> {
        if self.header.position <= 0 {
            return Ok(false);
        }
        let reader = source.ok_or(Error::StreamClosed)?;

        let expected = self.required_bytes(kind);
        let offset = self.header.position as u64 + self.layer_offset(kind);
        reader.seek(SeekFrom::Start(offset))?;

        let mut payload = Vec::with_capacity(expected);
        (&mut *reader).take(expected as u64).read_to_end(&mut payload)?;

        if payload.len() < expected {
            tracing::warn!(
                "Truncated {} payload at offset {}: expected {} bytes, got {}",
                kind.as_str(),
                offset,
                expected,
                payload.len()
            );
            return Err(Error::TruncatedPayload {
                expected,
                actual: payload.len(),
            });
        }

        *self.layer_mut(kind) = LayerState::Encoded(payload);
        Ok(true)
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Layer pixels cropped to the reported dimensions, as an RGBA image
    ///
    /// # Errors
    /// Returns [`Error::ImageBufferFailed`] if the conversion fails.
    pub fn layer_image(&self, kind: LayerKind) -> Result<Option<RgbaImage>> {
        let Some(pixels) = self.pixels(kind) else {
            return Ok(None);
        };
        let (width, height) = self.dimensions(kind);
        pixels.crop(width, height).to_rgba_image().map(Some)
    }

    /// `size x size` preview of a materialized layer, or the 1x1 placeholder
    #[must_use]
    pub fn thumbnail(&self, kind: LayerKind, size: u32) -> PixelBuffer {
        match self.pixels(kind) {
            Some(pixels) => {
                let (width, height) = self.dimensions(kind);
                render_thumbnail(pixels, width, height, size)
            }
            None => thumbnail::placeholder(),
        }
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Write the 25-byte header
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_header<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.header.write(writer)
    }

    /// Write the in-memory payloads in image, shadow, overlay order
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_payloads<W: Write>(&self, writer: &mut W) -> Result<()> {
        for kind in LayerKind::ALL {
            if let Some(payload) = self.payload(kind) {
                writer.write_all(payload)?;
            }
        }
        Ok(())
    }

    /// Clear all metadata and cached data; the entry can no longer be
    /// materialized
    pub fn reset(&mut self) {
        *self = Self {
            disposed: true,
            ..Self::default()
        };
    }
}
