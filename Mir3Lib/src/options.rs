//! Configuration types for library containers
//!
//! SPDX-FileCopyrightText: 2025 Zircon Library Editor contributors
//!
//! SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// Default edge length of generated thumbnails, in pixels.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 64;

/// Largest thumbnail edge a container will render
pub const MAX_THUMBNAIL_SIZE: u32 = 1024;

/// Encoder effort used when compressing layers to DXT1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionQuality {
    /// Range fit - fastest, lowest quality
    Fast,
    /// Cluster fit - the classic library editor setting
    #[default]
    Balanced,
    /// Iterative cluster fit - slowest, highest quality
    Best,
}

impl CompressionQuality {
    pub(crate) fn algorithm(self) -> squish::Algorithm {
        match self {
            Self::Fast => squish::Algorithm::RangeFit,
            Self::Balanced => squish::Algorithm::ClusterFit,
            Self::Best => squish::Algorithm::IterativeClusterFit,
        }
    }

    /// Get a human-readable name for this setting
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Best => "best",
        }
    }
}

/// Options applied by a [`LibraryContainer`](crate::library::LibraryContainer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryOptions {
    /// Encoder effort for new entries
    pub compression: CompressionQuality,
    /// Edge length of thumbnails returned by `thumbnail`
    pub thumbnail_size: u32,
    /// Check declared header sizes against the stream length on load
    pub validate_header: bool,
}

impl Default for LibraryOptions {
    fn default() -> Self {
        Self {
            compression: CompressionQuality::default(),
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            validate_header: true,
        }
    }
}

impl LibraryOptions {
    /// Set the encoder effort
    #[must_use]
    pub fn with_compression(mut self, compression: CompressionQuality) -> Self {
        self.compression = compression;
        self
    }

    /// Set the thumbnail edge length (clamped to `1..=MAX_THUMBNAIL_SIZE`)
    #[must_use]
    pub fn with_thumbnail_size(mut self, size: u32) -> Self {
        self.thumbnail_size = size.clamp(1, MAX_THUMBNAIL_SIZE);
        self
    }

    /// Thumbnail edge actually rendered
    ///
    /// The field is public and deserialized as-is, so out-of-range values
    /// are clamped here.
    #[must_use]
    pub fn thumbnail_edge(&self) -> u32 {
        self.thumbnail_size.clamp(1, MAX_THUMBNAIL_SIZE)
    }

    /// Enable or disable header validation on load
    #[must_use]
    pub fn with_header_validation(mut self, validate: bool) -> Self {
        self.validate_header = validate;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_options_fill_defaults() {
        let options: LibraryOptions = serde_json::from_str(r#"{"compression":"best"}"#).unwrap();
        assert_eq!(options.compression, CompressionQuality::Best);
        assert_eq!(options.thumbnail_size, DEFAULT_THUMBNAIL_SIZE);
        assert!(options.validate_header);
    }

    #[test]
    fn test_thumbnail_size_clamped() {
        let options = LibraryOptions::default().with_thumbnail_size(0);
        assert_eq!(options.thumbnail_size, 1);
        let options = LibraryOptions::default().with_thumbnail_size(u32::MAX);
        assert_eq!(options.thumbnail_size, MAX_THUMBNAIL_SIZE);
    }

    #[test]
    fn test_deserialized_thumbnail_size_clamped_on_use() {
        let options: LibraryOptions = serde_json::from_str(r#"{"thumbnail_size":0}"#).unwrap();
        assert_eq!(options.thumbnail_edge(), 1);

        let options: LibraryOptions = serde_json::from_str(r#"{"thumbnail_size":4000000000}"#).unwrap();
        assert_eq!(options.thumbnail_edge(), MAX_THUMBNAIL_SIZE);
    }
}
