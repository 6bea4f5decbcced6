//! Pipeline configuration for `kiln.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # one file per kiln.toml section
//! ├── types/         # ConfigError, diagnostics, field paths
//! ├── table.rs       # PathTable built from [paths]
//! └── mod.rs         # PipelineConfig (this file)
//! ```
//!
//! The file is optional: every section has defaults, and a missing default
//! `kiln.toml` simply means "use the built-in layout". A config named
//! explicitly with `--config` must exist.

pub mod section;
mod table;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    ImageConfig, MarkupConfig, PathsConfig, ScriptConfig, ServeConfig, SpriteAlgorithm,
    SpriteConfig, StyleConfig,
};
pub use table::{MATCH_OPTIONS, PathSpec, PathTable, glob_base, lexical_normalize};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::Cli,
    core::{AssetKind, BuildMode},
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name, looked up from the working directory upward.
pub const DEFAULT_CONFIG: &str = "kiln.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing kiln.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Absolute path of the loaded config file, if there was one.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Absolute project root; every glob is relative to it.
    #[serde(skip)]
    pub root: PathBuf,

    /// Resolved from `--mode` / `KILN_ENV`.
    #[serde(skip)]
    pub mode: BuildMode,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub markup: MarkupConfig,

    #[serde(default)]
    pub script: ScriptConfig,

    #[serde(default)]
    pub style: StyleConfig,

    #[serde(default)]
    pub image: ImageConfig,

    #[serde(default)]
    pub sprite: SpriteConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

impl PipelineConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from `--root` (or cwd) for the config file. The
    /// project root is `--root` when given, else the config file's parent,
    /// else the current directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let start = cli
            .root
            .as_ref()
            .map_or_else(|| cwd.clone(), |root| cwd.join(root));

        let mut config = match find_config_file(&cli.config, &start) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = Some(crate::utils::path::normalize_path(&path));
                config
            }
            None if cli.config == Path::new(DEFAULT_CONFIG) => Self::default(),
            None => return Err(ConfigError::NotFound(cli.config.clone()).into()),
        };

        let root = match (&cli.root, &config.config_path) {
            (Some(_), _) => start,
            (None, Some(path)) => path.parent().map_or(cwd, Path::to_path_buf),
            (None, None) => cwd,
        };
        config.root = crate::utils::path::normalize_path(&root);
        config.apply_cli(cli);

        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the file values.
    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(mode) = cli.mode {
            self.mode = mode;
        }
        if let Some(args) = cli.serve_args() {
            Self::update_option(&mut self.serve.host, args.host.as_ref());
            Self::update_option(&mut self.serve.port, args.port.as_ref());
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Absolute build root.
    pub fn build_root(&self) -> PathBuf {
        lexical_normalize(&self.root_join(&self.paths.build))
    }

    /// Build the immutable path table for this config.
    pub fn path_table(&self) -> Result<PathTable, ConfigError> {
        PathTable::new(&self.root, &self.paths).map_err(|e| {
            let mut diag = ConfigDiagnostics::new();
            diag.error(FieldPath::new("paths"), e.to_string());
            ConfigError::Diagnostics(diag)
        })
    }

    /// Whether the style step writes source maps.
    pub fn source_maps_enabled(&self) -> bool {
        self.mode.is_dev() && self.style.source_maps
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate the whole configuration, collecting every error at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        self.validate_paths(&mut diag);
        self.validate_style(&mut diag);
        self.validate_image(&mut diag);
        self.validate_sprite(&mut diag);
        self.validate_serve(&mut diag);

        diag.into_result()
    }

    fn validate_paths(&self, diag: &mut ConfigDiagnostics) {
        let root = lexical_normalize(&self.root);
        let build = self.build_root();

        if build == root || !build.starts_with(&root) {
            diag.error_with_hint(
                FieldPath::new("paths.build"),
                format!("build root `{}` must be a subdirectory of the project", self.paths.build.display()),
                "use a dedicated directory such as \"build\"",
            );
        }

        for kind in AssetKind::ALL {
            let field = paths_field(kind);
            let resolved = self.paths.resolved(kind);

            for (what, pattern) in [("source", &resolved.source), ("watch", &resolved.watch)] {
                if let Err(e) = glob::Pattern::new(pattern) {
                    diag.error(field, format!("invalid {what} glob `{pattern}`: {e}"));
                } else if Path::new(pattern).is_absolute() {
                    diag.error(field, format!("{what} glob `{pattern}` must be relative to the project root"));
                }
            }

            let output = lexical_normalize(&self.root_join(&resolved.output));
            if !kind.writes_sources() && !output.starts_with(&build) {
                diag.error_with_hint(
                    field,
                    format!("output `{}` is outside the build root", resolved.output.display()),
                    format!("place it under \"{}\"", self.paths.build.display()),
                );
            }
        }
    }

    fn validate_style(&self, diag: &mut ConfigDiagnostics) {
        for (browser, version) in &self.style.targets {
            if !section::KNOWN_BROWSERS.contains(&browser.as_str()) {
                diag.error_with_hint(
                    FieldPath::new("style.targets"),
                    format!("unknown browser `{browser}`"),
                    format!("known browsers: {}", section::KNOWN_BROWSERS.join(", ")),
                );
            } else if section::parse_browser_version(version).is_none() {
                diag.error(
                    FieldPath::new("style.targets"),
                    format!("`{browser} = \"{version}\"` is not a `major[.minor]` version"),
                );
            }
        }
    }

    fn validate_image(&self, diag: &mut ConfigDiagnostics) {
        if !(1..=100).contains(&self.image.jpeg_quality) {
            diag.error(
                FieldPath::new("image.jpeg_quality"),
                format!("quality {} is outside 1..=100", self.image.jpeg_quality),
            );
        }
    }

    fn validate_sprite(&self, diag: &mut ConfigDiagnostics) {
        if let Some(template) = &self.sprite.template
            && !self.root_join(template).is_file()
        {
            diag.error(
                FieldPath::new("sprite.template"),
                format!("template `{}` not found", template.display()),
            );
        }
        if self.sprite.image_name.is_empty() || self.sprite.stylesheet_name.is_empty() {
            diag.error(
                FieldPath::new("sprite"),
                "`image_name` and `stylesheet_name` must not be empty",
            );
        }
    }

    fn validate_serve(&self, diag: &mut ConfigDiagnostics) {
        for (field, port) in [
            (FieldPath::new("serve.port"), self.serve.port),
            (FieldPath::new("serve.reload_port"), self.serve.reload_port),
        ] {
            if port == 0 {
                diag.error_with_hint(field, "port must not be 0", "pick a free port such as 3000");
            }
        }
    }
}

const fn paths_field(kind: AssetKind) -> FieldPath {
    FieldPath::new(match kind {
        AssetKind::Markup => "paths.markup",
        AssetKind::Script => "paths.script",
        AssetKind::Style => "paths.style",
        AssetKind::Image => "paths.image",
        AssetKind::SpriteIcon => "paths.sprite",
        AssetKind::Font => "paths.font",
    })
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config text. Panics on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PipelineConfig {
    let (parsed, ignored) = PipelineConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Parsed config rooted at `root`.
#[cfg(test)]
pub fn test_config_at(root: &Path, content: &str) -> PipelineConfig {
    let mut config = test_parse_config(content);
    config.root = root.to_path_buf();
    config
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(err: ConfigError) -> Vec<&'static str> {
        match err {
            ConfigError::Diagnostics(diag) => diag.fields().collect(),
            other => panic!("expected diagnostics, got {other}"),
        }
    }

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(PipelineConfig::from_str("[paths\nbuild = \"x\"").is_err());
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = test_config_at(Path::new("/site"), "");
        assert!(config.validate().is_ok());
        assert_eq!(config.build_root(), PathBuf::from("/site/build"));
    }

    #[test]
    fn test_unknown_fields_detected() {
        let (_, ignored) =
            PipelineConfig::parse_with_ignored("[unknown_section]\nfield = 1").unwrap();
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_build_root_must_not_be_project_root() {
        let config = test_config_at(Path::new("/site"), "[paths]\nbuild = \".\"");
        assert!(fields(config.validate().unwrap_err()).contains(&"paths.build"));
    }

    #[test]
    fn test_build_root_outside_project() {
        let config = test_config_at(Path::new("/site"), "[paths]\nbuild = \"../elsewhere\"");
        assert!(fields(config.validate().unwrap_err()).contains(&"paths.build"));
    }

    #[test]
    fn test_output_outside_build_root() {
        let config = test_config_at(Path::new("/site"), "[paths.font]\noutput = \"public/fonts\"");
        assert_eq!(fields(config.validate().unwrap_err()), vec!["paths.font"]);
    }

    #[test]
    fn test_sprite_output_may_be_in_sources() {
        let config = test_config_at(Path::new("/site"), "[paths.sprite]\noutput = \"assets/img\"");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_glob() {
        let config = test_config_at(Path::new("/site"), "[paths.style]\nsource = \"src/[style\"");
        assert_eq!(fields(config.validate().unwrap_err()), vec!["paths.style"]);
    }

    #[test]
    fn test_collects_every_error() {
        let config = test_config_at(
            Path::new("/site"),
            "[serve]\nport = 0\n[image]\njpeg_quality = 0\n[style]\ntargets = { netscape = \"4\" }",
        );
        let found = fields(config.validate().unwrap_err());
        assert!(found.contains(&"serve.port"));
        assert!(found.contains(&"image.jpeg_quality"));
        assert!(found.contains(&"style.targets"));
    }

    #[test]
    fn test_missing_sprite_template() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = test_config_at(temp.path(), "[sprite]\ntemplate = \"missing.jinja\"");
        assert_eq!(fields(config.validate().unwrap_err()), vec!["sprite.template"]);
    }

    #[test]
    fn test_source_maps_only_in_development() {
        let mut config = test_parse_config("[style]\nsource_maps = true");
        assert!(config.source_maps_enabled());
        config.mode = BuildMode::Production;
        assert!(!config.source_maps_enabled());
    }
}
