//! Asset kinds and the step each one drives.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical asset kind. Each kind owns exactly one transform step.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum AssetKind {
    /// Page templates rendered to HTML.
    Markup,
    /// Script entry points with include directives.
    Script,
    /// SCSS entry points.
    Style,
    /// Raster and vector images.
    Image,
    /// Icons packed into a sprite sheet.
    #[value(name = "sprite")]
    #[serde(rename = "sprite")]
    SpriteIcon,
    /// Font files, copied as-is.
    Font,
}

impl AssetKind {
    pub const ALL: [Self; 6] = [
        Self::Markup,
        Self::Script,
        Self::Style,
        Self::Image,
        Self::SpriteIcon,
        Self::Font,
    ];

    /// Step name used in logs, CLI and reload messages.
    pub const fn step_name(self) -> &'static str {
        match self {
            Self::Markup => "markup",
            Self::Script => "script",
            Self::Style => "style",
            Self::Image => "image",
            Self::SpriteIcon => "sprite",
            Self::Font => "font",
        }
    }

    /// Whether the step writes into the source tree instead of the build root.
    pub const fn writes_sources(self) -> bool {
        matches!(self, Self::SpriteIcon)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.step_name())
    }
}
