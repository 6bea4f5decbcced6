//! `kiln.toml` sections.
//!
//! | Section    | Purpose                                        |
//! |------------|------------------------------------------------|
//! | `[paths]`  | build root, template root, per-kind globs      |
//! | `[markup]` | page rendering                                 |
//! | `[script]` | script bundling and minification               |
//! | `[style]`  | SCSS, vendor prefixes, source maps             |
//! | `[image]`  | image compression                              |
//! | `[sprite]` | sprite sheet and generated stylesheet          |
//! | `[serve]`  | development server and live reload             |

mod image;
mod markup;
mod paths;
mod script;
mod serve;
mod sprite;
mod style;

pub use image::ImageConfig;
pub use markup::MarkupConfig;
pub use paths::{PathDefaults, PathOverride, PathsConfig};
pub use script::ScriptConfig;
pub use serve::ServeConfig;
pub use sprite::{SpriteAlgorithm, SpriteConfig};
pub use style::{KNOWN_BROWSERS, StyleConfig, parse_browser_version};
