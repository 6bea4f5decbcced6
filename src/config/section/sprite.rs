//! `[sprite]` section configuration.
//!
//! The sprite image lands in `[paths.sprite] output` (default `src/img`),
//! the generated partial in `stylesheet_dir`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How icons are laid out on the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpriteAlgorithm {
    /// One column, icons stacked vertically.
    #[default]
    TopDown,
    /// One row, icons side by side.
    LeftRight,
}

/// Sprite sheet settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    pub image_name: String,
    pub stylesheet_name: String,
    /// Where the generated SCSS partial is written.
    pub stylesheet_dir: PathBuf,
    /// Image URL as seen from the compiled stylesheet.
    pub image_url: String,
    pub algorithm: SpriteAlgorithm,
    /// Gap between icons, in pixels.
    pub padding: u32,
    /// Prepended to every icon name (`$s-home`).
    pub prefix: String,
    /// Custom minijinja template for the stylesheet.
    pub template: Option<PathBuf>,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            image_name: "sprite.png".into(),
            stylesheet_name: "sprite.scss".into(),
            stylesheet_dir: PathBuf::from("src/style/partials"),
            image_url: "../img/sprite.png".into(),
            algorithm: SpriteAlgorithm::TopDown,
            padding: 100,
            prefix: "s-".into(),
            template: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_sprite_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.sprite.algorithm, SpriteAlgorithm::TopDown);
        assert_eq!(config.sprite.padding, 100);
        assert_eq!(config.sprite.prefix, "s-");
        assert_eq!(config.sprite.image_url, "../img/sprite.png");
    }

    #[test]
    fn test_sprite_algorithm_names() {
        let config = test_parse_config("[sprite]\nalgorithm = \"left-right\"\npadding = 4");
        assert_eq!(config.sprite.algorithm, SpriteAlgorithm::LeftRight);
        assert_eq!(config.sprite.padding, 4);
    }
}
