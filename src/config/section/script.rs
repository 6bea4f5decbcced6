//! `[script]` section configuration.

use serde::{Deserialize, Serialize};

/// Script bundling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Minify the bundled entry point.
    pub minify: bool,
    /// Rename local identifiers while minifying.
    pub mangle: bool,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            minify: true,
            mangle: true,
        }
    }
}
