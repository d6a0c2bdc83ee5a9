//! BC1 (DXT1) decoding using `bcdec_rs`

use super::{BLOCK_BYTES, BLOCK_DIM};

/// Decode a BC1 block stream to codec-order RGBA pixels
///
/// `data` must hold at least `blocks_x * blocks_y` blocks.
pub(super) fn decode_bc1(data: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut rgba = vec![0u8; width * height * 4];
    let block_dim = BLOCK_DIM as usize;
    let blocks_x = width.div_ceil(block_dim);
    let blocks_y = height.div_ceil(block_dim);

    // Temporary buffer for a single 4x4 block (16 pixels * 4 bytes = 64 bytes)
    // Pitch is 4 pixels * 4 bytes per pixel = 16 bytes per row
    let mut block_rgba = [0u8; 64];
    let block_pitch = 16;

    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let block_idx = (by * blocks_x + bx) * BLOCK_BYTES;
            let block = &data[block_idx..block_idx + BLOCK_BYTES];

            bcdec_rs::bc1(block, &mut block_rgba, block_pitch);

            // Copy decoded rows to output
            for py in 0..block_dim {
                let fy = by * block_dim + py;
                if fy >= height {
                    break;
                }
                let fx = bx * block_dim;
                let row_px = block_dim.min(width - fx);
                let src_idx = py * block_pitch;
                let dst_idx = (fy * width + fx) * 4;
                rgba[dst_idx..dst_idx + row_px * 4]
                    .copy_from_slice(&block_rgba[src_idx..src_idx + row_px * 4]);
            }
        }
    }

    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_solid_red_block() {
        // c0 = pure red (0xF800), c1 = black, all indices 0
        let block = [0x00, 0xF8, 0x00, 0x00, 0, 0, 0, 0];
        let rgba = decode_bc1(&block, 4, 4);
        for px in rgba.chunks_exact(4) {
            assert_eq!(px, [255, 0, 0, 255]);
        }
    }

    #[test]
    fn test_decode_transparent_index() {
        // c0 <= c1 selects 3-colour mode; index 3 is transparent black
        let block = [0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let rgba = decode_bc1(&block, 4, 4);
        for px in rgba.chunks_exact(4) {
            assert_eq!(px, [0, 0, 0, 0]);
        }
    }
}
