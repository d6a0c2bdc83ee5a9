//! In-memory pixel grids
//!
//! A [`PixelBuffer`] is a row-major grid of 4-byte pixels. Buffers handed to
//! and returned from the editor are in *surface order* (B, G, R, A, the byte
//! layout of 32-bit ARGB surfaces). The DXT1 codec works in *codec order*
//! (R, G, B, A); [`PixelBuffer::swizzle_and_key_transparent`] and
//! [`PixelBuffer::swizzle`] move a buffer between the two.
//!
//! SPDX-FileCopyrightText: 2025 Zircon Library Editor contributors
//!
//! SPDX-License-Identifier: MIT

pub mod thumbnail;

use crate::error::{Error, Result};
use image::{ImageBuffer, RgbaImage};
use std::path::Path;

pub use thumbnail::render_thumbnail;

/// Bytes per pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// Round a dimension up to the next multiple of 4
#[must_use]
pub const fn padded_dimension(value: u32) -> u32 {
    value.div_ceil(4) * 4
}

/// A width x height grid of 4-byte pixels
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl PixelBuffer {
    /// Create a fully transparent buffer
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * BYTES_PER_PIXEL],
        }
    }

    /// Wrap raw pixel bytes
    ///
    /// # Errors
    /// Returns [`Error::ImageBufferFailed`] if `data` is not exactly
    /// `width * height * 4` bytes.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if data.len() != width as usize * height as usize * BYTES_PER_PIXEL {
            return Err(Error::ImageBufferFailed);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixel bytes, row-major
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Get the pixel at `(x, y)`, or `None` outside the grid
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[idx..idx + BYTES_PER_PIXEL]);
        Some(px)
    }

    /// Overwrite the pixel at `(x, y)`; out-of-range writes are ignored
    pub fn put_pixel(&mut self, x: u32, y: u32, px: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        self.data[idx..idx + BYTES_PER_PIXEL].copy_from_slice(&px);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }

    /// True if both dimensions are multiples of 4
    #[must_use]
    pub fn is_block_aligned(&self) -> bool {
        self.width % 4 == 0 && self.height % 4 == 0
    }

    /// Pad to 4-aligned dimensions
    ///
    /// The original pixels land in the top-left corner of a transparent
    /// canvas. Aligned buffers are returned unchanged.
    #[must_use]
    pub fn pad_to_4(self) -> Self {
        if self.is_block_aligned() {
            return self;
        }

        let mut padded = Self::new(padded_dimension(self.width), padded_dimension(self.height));
        padded.blit(&self, 0, 0);
        padded
    }

    /// Copy `source` into this buffer with its top-left corner at `(x, y)`,
    /// clipping at the edges
    pub fn blit(&mut self, source: &PixelBuffer, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let copy_w = source.width.min(self.width - x) as usize;
        let copy_h = source.height.min(self.height - y);
        let row_bytes = copy_w * BYTES_PER_PIXEL;

        for row in 0..copy_h {
            let src = source.index(0, row);
            let dst = self.index(x, y + row);
            self.data[dst..dst + row_bytes].copy_from_slice(&source.data[src..src + row_bytes]);
        }
    }

    /// Copy out the top-left `width x height` region (clipped to the grid)
    #[must_use]
    pub fn crop(&self, width: u32, height: u32) -> Self {
        let width = width.min(self.width);
        let height = height.min(self.height);
        if width == self.width && height == self.height {
            return self.clone();
        }

        let mut cropped = Self::new(width, height);
        let row_bytes = width as usize * BYTES_PER_PIXEL;
        for row in 0..height {
            let src = self.index(0, row);
            let dst = cropped.index(0, row);
            cropped.data[dst..dst + row_bytes].copy_from_slice(&self.data[src..src + row_bytes]);
        }
        cropped
    }

    /// Exchange the first and third channel of every pixel
    pub fn swizzle(&mut self) {
        for chunk in self.data.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.swap(0, 2);
        }
    }

    /// Swizzle to codec order, then make every black pixel fully transparent
    ///
    /// DXT1 has no alpha channel beyond a punch-through "transparent black"
    /// index, so pure black is the library's transparency key. A pixel that
    /// is merely near-black keeps its alpha.
    pub fn swizzle_and_key_transparent(&mut self) {
        for chunk in self.data.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.swap(0, 2);
            if chunk[0] == 0 && chunk[1] == 0 && chunk[2] == 0 {
                chunk[3] = 0;
            }
        }
    }

    // ========================================================================
    // image crate interop
    // ========================================================================

    /// Build a surface-order buffer from an RGBA image
    #[must_use]
    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let mut buffer = Self {
            width,
            height,
            data: image.into_raw(),
        };
        buffer.swizzle();
        buffer
    }

    /// Take over an image's pixels as-is, without reordering channels
    pub(crate) fn from_image_buffer(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }

    /// Convert this surface-order buffer to an RGBA image
    ///
    /// # Errors
    /// Returns [`Error::ImageBufferFailed`] if the buffer is inconsistent.
    pub fn to_rgba_image(&self) -> Result<RgbaImage> {
        let mut rgba = self.data.clone();
        for chunk in rgba.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.swap(0, 2);
        }
        ImageBuffer::from_raw(self.width, self.height, rgba).ok_or(Error::ImageBufferFailed)
    }

    /// Load a PNG file into a surface-order buffer
    ///
    /// # Errors
    /// Returns [`Error::PngOpenFailed`] if the file cannot be opened or decoded.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|e| Error::PngOpenFailed {
            message: e.to_string(),
        })?;
        Ok(Self::from_rgba_image(img.to_rgba8()))
    }

    /// Encode this buffer as PNG bytes
    ///
    /// # Errors
    /// Returns [`Error::PngEncodeFailed`] if encoding fails.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let img = self.to_rgba_image()?;
        let mut png_data = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut png_data);
        img.write_with_encoder(encoder)
            .map_err(|e| Error::PngEncodeFailed {
                message: e.to_string(),
            })?;
        Ok(png_data)
    }

    /// Write this buffer to a PNG file
    ///
    /// # Errors
    /// Returns an error if encoding or writing fails.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let png_data = self.to_png_bytes()?;
        std::fs::write(path.as_ref(), png_data)?;
        Ok(())
    }
}
