//! `[paths]` section configuration.
//!
//! ```toml
//! [paths]
//! build = "build"
//! templates = "src/templates"
//!
//! [paths.style]
//! source = "src/style/*.scss"     # any field may be omitted
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::AssetKind;

/// Build root, template root and per-kind glob overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Output root; every non-sprite output dir must live under it.
    pub build: PathBuf,
    /// Loader root for page templates (layouts, partials).
    pub templates: PathBuf,
    pub markup: PathOverride,
    pub script: PathOverride,
    pub style: PathOverride,
    pub image: PathOverride,
    pub sprite: PathOverride,
    pub font: PathOverride,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            build: PathBuf::from("build"),
            templates: PathBuf::from("src/templates"),
            markup: PathOverride::default(),
            script: PathOverride::default(),
            style: PathOverride::default(),
            image: PathOverride::default(),
            sprite: PathOverride::default(),
            font: PathOverride::default(),
        }
    }
}

/// Partial override of one kind's globs. Unset fields keep the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathOverride {
    pub source: Option<String>,
    pub watch: Option<String>,
    pub output: Option<PathBuf>,
}

/// Fully resolved (root-relative) globs and output dir for one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDefaults {
    pub source: String,
    pub watch: String,
    pub output: PathBuf,
}

impl PathsConfig {
    pub fn override_for(&self, kind: AssetKind) -> &PathOverride {
        match kind {
            AssetKind::Markup => &self.markup,
            AssetKind::Script => &self.script,
            AssetKind::Style => &self.style,
            AssetKind::Image => &self.image,
            AssetKind::SpriteIcon => &self.sprite,
            AssetKind::Font => &self.font,
        }
    }

    /// Built-in globs and output dir for `kind`.
    pub fn defaults_for(&self, kind: AssetKind) -> PathDefaults {
        let build = &self.build;
        let (source, watch, output) = match kind {
            AssetKind::Markup => (
                "src/templates/pages/*.html",
                "src/templates/**/*.html",
                build.clone(),
            ),
            AssetKind::Script => ("src/js/main.js", "src/js/**/*.js", build.join("js")),
            AssetKind::Style => (
                "src/style/main.scss",
                "src/style/**/*.scss",
                build.join("css"),
            ),
            AssetKind::Image => ("src/img/*.*", "src/img/*.*", build.join("img")),
            AssetKind::SpriteIcon => (
                "src/img/icons/*.*",
                "src/img/icons/*.*",
                PathBuf::from("src/img"),
            ),
            AssetKind::Font => ("src/fonts/**/*.*", "src/fonts/**/*.*", build.join("fonts")),
        };
        PathDefaults {
            source: source.to_string(),
            watch: watch.to_string(),
            output,
        }
    }

    /// Defaults with the user's overrides applied.
    pub fn resolved(&self, kind: AssetKind) -> PathDefaults {
        let defaults = self.defaults_for(kind);
        let over = self.override_for(kind);
        PathDefaults {
            source: over.source.clone().unwrap_or(defaults.source),
            watch: over.watch.clone().unwrap_or(defaults.watch),
            output: over.output.clone().unwrap_or(defaults.output),
        }
    }
}
