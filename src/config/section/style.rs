//! `[style]` section configuration.
//!
//! ```toml
//! [style]
//! source_maps = true          # only honored in development mode
//! targets = { safari = "12", chrome = "80" }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Browsers the vendor-prefix stage accepts as target names.
pub const KNOWN_BROWSERS: &[&str] = &[
    "android", "chrome", "edge", "firefox", "ie", "ios_saf", "opera", "safari", "samsung",
];

/// Stylesheet compilation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Emit `<name>.css.map` in development mode.
    pub source_maps: bool,
    /// Minify the compiled stylesheet.
    pub minify: bool,
    /// Minimum browser versions (`major[.minor]`) used for vendor prefixes.
    pub targets: BTreeMap<String, String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        let targets = [
            ("chrome", "80"),
            ("edge", "88"),
            ("firefox", "78"),
            ("ios_saf", "12"),
            ("safari", "12"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            source_maps: false,
            minify: true,
            targets,
        }
    }
}

/// Encode `major[.minor[.patch]]` the way browser targets expect:
/// `major << 16 | minor << 8 | patch`.
pub fn parse_browser_version(version: &str) -> Option<u32> {
    let mut parts = version.trim().split('.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    let patch: u32 = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    if parts.next().is_some() || major > 0xff || minor > 0xff || patch > 0xff {
        return None;
    }
    Some((major << 16) | (minor << 8) | patch)
}
