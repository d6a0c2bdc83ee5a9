//! BC1 (DXT1) encoding
//!
//! Pixels with alpha below 128 are encoded with the punch-through
//! transparent index; everything else is treated as opaque.

use squish::{Format, Params};

use crate::options::CompressionQuality;

/// Encode codec-order RGBA pixels to a BC1 block stream
pub(super) fn encode_bc1(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: CompressionQuality,
) -> Vec<u8> {
    let (width, height) = (width as usize, height as usize);
    let mut output = vec![0u8; Format::Bc1.compressed_size(width, height)];
    if output.is_empty() {
        return output;
    }

    let params = Params {
        algorithm: quality.algorithm(),
        ..Params::default()
    };
    Format::Bc1.compress(pixels, width, height, params, &mut output);

    output
}
