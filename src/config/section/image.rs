//! `[image]` section configuration.

use serde::{Deserialize, Serialize};

/// Image compression settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// JPEG re-encode quality, 1-100.
    pub jpeg_quality: u8,
    /// Re-encode PNGs with maximum compression.
    pub optimize_png: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 82,
            optimize_png: true,
        }
    }
}
