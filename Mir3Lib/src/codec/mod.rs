//! DXT1 (BC1) block codec
//!
//! Layers are stored as a stream of 8-byte blocks, each covering 4x4 pixels,
//! in row-major block order. Buffers going in and out of the codec are in
//! codec order (R, G, B, A).
//!
//! SPDX-FileCopyrightText: 2025 Zircon Library Editor contributors
//!
//! SPDX-License-Identifier: MIT

mod decode;
mod encode;

use crate::error::{Error, Result};
use crate::options::CompressionQuality;
use crate::pixel::PixelBuffer;

/// Edge length of a compression block, in pixels
pub const BLOCK_DIM: u32 = 4;

/// Bytes per compressed 4x4 block
pub const BLOCK_BYTES: usize = 8;

/// Storage required for a `width x height` layer
///
/// Partial blocks count as whole blocks, so this equals `width * height / 2`
/// for 4-aligned dimensions.
#[must_use]
pub const fn required_bytes(width: u32, height: u32) -> usize {
    width.div_ceil(BLOCK_DIM) as usize * height.div_ceil(BLOCK_DIM) as usize * BLOCK_BYTES
}

/// Stateless DXT1 compressor/decompressor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockCodec {
    quality: CompressionQuality,
}

impl BlockCodec {
    #[must_use]
    pub fn new(quality: CompressionQuality) -> Self {
        Self { quality }
    }

    #[must_use]
    pub fn quality(&self) -> CompressionQuality {
        self.quality
    }

    /// Compress a 4-aligned, codec-order buffer
    ///
    /// # Errors
    /// Returns [`Error::InvalidDimension`] if the buffer was not padded first.
    pub fn compress(&self, pixels: &PixelBuffer) -> Result<Vec<u8>> {
        let (width, height) = (pixels.width(), pixels.height());
        if !pixels.is_block_aligned() {
            return Err(Error::InvalidDimension { width, height });
        }

        Ok(encode::encode_bc1(pixels.as_raw(), width, height, self.quality))
    }

    /// Decompress a block stream into a `width x height` codec-order buffer
    ///
    /// Decoding does not depend on the encoder settings.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDimension`] for unaligned dimensions and
    /// [`Error::TruncatedPayload`] if `data` is shorter than
    /// [`required_bytes`].
    pub fn decompress(data: &[u8], width: u32, height: u32) -> Result<PixelBuffer> {
        if width % BLOCK_DIM != 0 || height % BLOCK_DIM != 0 {
            return Err(Error::InvalidDimension { width, height });
        }

        let expected = required_bytes(width, height);
        if data.len() < expected {
            return Err(Error::TruncatedPayload {
                expected,
                actual: data.len(),
            });
        }

        let rgba = decode::decode_bc1(&data[..expected], width as usize, height as usize);
        PixelBuffer::from_raw(width, height, rgba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut buffer = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let r = (x * 255 / width.max(1)) as u8;
                let g = (y * 255 / height.max(1)) as u8;
                buffer.put_pixel(x, y, [r, g, 128, 255]);
            }
        }
        buffer
    }

    #[test]
    fn test_required_bytes() {
        assert_eq!(required_bytes(0, 0), 0);
        assert_eq!(required_bytes(4, 4), 8);
        assert_eq!(required_bytes(64, 64), 64 * 64 / 2);
        // Partial blocks round up
        assert_eq!(required_bytes(5, 3), 16);
    }

    #[test]
    fn test_compress_rejects_unaligned() {
        let codec = BlockCodec::default();
        let err = codec.compress(&PixelBuffer::new(6, 4)).unwrap_err();
        assert!(matches!(err, Error::InvalidDimension { width: 6, height: 4 }));
    }

    #[test]
    fn test_decompress_rejects_unaligned() {
        let data = vec![0u8; 64];
        let err = BlockCodec::decompress(&data, 5, 8).unwrap_err();
        assert!(matches!(err, Error::InvalidDimension { width: 5, height: 8 }));
        let err = BlockCodec::decompress(&data, 8, 2).unwrap_err();
        assert!(matches!(err, Error::InvalidDimension { width: 8, height: 2 }));
    }

    #[test]
    fn test_compress_output_size() {
        let codec = BlockCodec::default();
        let data = codec.compress(&gradient(16, 8)).unwrap();
        assert_eq!(data.len(), required_bytes(16, 8));
    }

    #[test]
    fn test_decompress_truncated() {
        let err = BlockCodec::decompress(&[0u8; 7], 4, 4).unwrap_err();
        assert!(matches!(
            err,
            Error::TruncatedPayload {
                expected: 8,
                actual: 7
            }
        ));
    }

    #[test]
    fn test_codec_stays_within_tolerance() {
        let codec = BlockCodec::new(CompressionQuality::Balanced);
        let source = gradient(32, 32);
        let data = codec.compress(&source).unwrap();
        let decoded = BlockCodec::decompress(&data, 32, 32).unwrap();

        assert_eq!((decoded.width(), decoded.height()), (32, 32));

        // Compare per-block average colour
        for by in 0..8 {
            for bx in 0..8 {
                let mut diff = [0i64; 3];
                for py in 0..4 {
                    for px in 0..4 {
                        let a = source.pixel(bx * 4 + px, by * 4 + py).unwrap();
                        let b = decoded.pixel(bx * 4 + px, by * 4 + py).unwrap();
                        for c in 0..3 {
                            diff[c] += i64::from(a[c]) - i64::from(b[c]);
                        }
                    }
                }
                for d in diff {
                    assert!((d / 16).abs() <= 12, "block ({bx}, {by}) drifted by {d}");
                }
            }
        }
    }

    #[test]
    fn test_transparent_pixels_survive() {
        let codec = BlockCodec::default();
        let mut source = gradient(8, 8);
        source.put_pixel(1, 1, [0, 0, 0, 0]);

        let data = codec.compress(&source).unwrap();
        let decoded = BlockCodec::decompress(&data, 8, 8).unwrap();

        assert_eq!(decoded.pixel(1, 1).unwrap()[3], 0);
        assert_eq!(decoded.pixel(5, 5).unwrap()[3], 255);
    }
}
