//! Fixed-size thumbnail rendering
//!
//! A thumbnail is a `size x size` transparent canvas with the layer centered
//! on it. Layers that fit are copied 1:1; larger layers are squeezed per axis
//! with nearest-neighbor sampling.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use super::PixelBuffer;

/// The 1x1 transparent image returned when a layer has nothing to show
#[must_use]
pub fn placeholder() -> PixelBuffer {
    PixelBuffer::new(1, 1)
}

/// Render `source` into a `size x size` thumbnail
///
/// `width` and `height` are the layer's reported (unpadded) dimensions; the
/// source rectangle is `(0, 0, width, height)` and the destination rectangle
/// is `((size - w) / 2, (size - h) / 2, w, h)` with `w = min(width, size)`.
/// An axis longer than `size` is scaled down on its own rather than cropped,
/// so oversized layers lose their aspect ratio.
///
/// Channel order is irrelevant here; the result keeps the source's order.
#[must_use]
pub fn render_thumbnail(source: &PixelBuffer, width: u32, height: u32, size: u32) -> PixelBuffer {
    let mut canvas = RgbaImage::new(size, size);

    let src_w = width.min(source.width());
    let src_h = height.min(source.height());
    let image = RgbaImage::from_raw(source.width(), source.height(), source.as_raw().to_vec());

    if let Some(image) = image.filter(|_| src_w > 0 && src_h > 0 && size > 0) {
        let dst_w = src_w.min(size);
        let dst_h = src_h.min(size);

        let cropped = imageops::crop_imm(&image, 0, 0, src_w, src_h).to_image();
        let scaled = imageops::resize(&cropped, dst_w, dst_h, FilterType::Nearest);
        imageops::replace(
            &mut canvas,
            &scaled,
            i64::from((size - dst_w) / 2),
            i64::from((size - dst_h) / 2),
        );
    }

    PixelBuffer::from_image_buffer(canvas)
}
