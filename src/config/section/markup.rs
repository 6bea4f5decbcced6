//! `[markup]` section configuration.

use serde::{Deserialize, Serialize};

/// Page template settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Normalize whitespace of rendered pages.
    pub pretty: bool,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}
