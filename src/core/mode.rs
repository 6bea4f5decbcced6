//! Build mode: development vs production.

use std::fmt;

/// Build mode, selected by `--mode` or the `KILN_ENV` variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BuildMode {
    /// Local work: honors `style.source_maps`.
    #[default]
    Development,
    /// Deployable output, never emits source maps.
    Production,
}

impl BuildMode {
    #[inline]
    pub const fn is_dev(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
        })
    }
}
