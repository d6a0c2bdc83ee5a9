//! Layer identity and materialization state

use crate::pixel::PixelBuffer;

/// One of the three independently compressed layers of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Image,
    Shadow,
    Overlay,
}

impl LayerKind {
    /// All layers, in payload order
    pub const ALL: [LayerKind; 3] = [LayerKind::Image, LayerKind::Shadow, LayerKind::Overlay];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Shadow => "shadow",
            Self::Overlay => "overlay",
        }
    }
}

/// What is currently held in memory for a layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LayerState {
    /// The layer carries no data (zero-sized, or the entry has no position)
    #[default]
    Empty,
    /// Data exists on disk but nothing has been read yet
    Unloaded,
    /// Decoded pixels only
    Decoded(PixelBuffer),
    /// Compressed payload only
    Encoded(Vec<u8>),
    /// Decoded pixels with the payload they came from
    Both {
        pixels: PixelBuffer,
        payload: Vec<u8>,
    },
}

impl LayerState {
    /// Decoded pixels (surface order, padded dimensions)
    #[must_use]
    pub fn pixels(&self) -> Option<&PixelBuffer> {
        match self {
            Self::Decoded(pixels) | Self::Both { pixels, .. } => Some(pixels),
            _ => None,
        }
    }

    /// Compressed payload
    #[must_use]
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Self::Encoded(payload) | Self::Both { payload, .. } => Some(payload),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_decoded(&self) -> bool {
        self.pixels().is_some()
    }

    /// Keep any cached payload and add decoded pixels
    pub(crate) fn attach_pixels(&mut self, pixels: PixelBuffer) {
        *self = match std::mem::take(self) {
            Self::Encoded(payload) | Self::Both { payload, .. } => Self::Both { pixels, payload },
            _ => Self::Decoded(pixels),
        };
    }
}
