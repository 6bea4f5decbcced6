//! `kiln clean`: remove the build root.

use std::fs;
use std::io;
use std::path::Path;

use crate::config::{ConfigDiagnostics, ConfigError, FieldPath, PipelineConfig, lexical_normalize};
use crate::log;

/// Recursively delete the build root.
///
/// Returns `Ok(false)` when there was nothing to delete. Refuses to touch
/// the project root or anything outside it.
pub fn clean_build_root(config: &PipelineConfig) -> Result<bool, ConfigError> {
    let root = lexical_normalize(&config.root);
    let build = config.build_root();
    ensure_removable(&root, &build)?;

    match fs::remove_dir_all(&build) {
        Ok(()) => {
            log!("clean"; "removed {}", build.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ConfigError::Io(build, e)),
    }
}

fn ensure_removable(root: &Path, build: &Path) -> Result<(), ConfigError> {
    if build != root && build.starts_with(root) {
        return Ok(());
    }
    let mut diag = ConfigDiagnostics::new();
    diag.error_with_hint(
        FieldPath::new("paths.build"),
        format!("refusing to delete `{}`", build.display()),
        "the build root must be a subdirectory of the project",
    );
    Err(ConfigError::Diagnostics(diag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use tempfile::TempDir;

    #[test]
    fn test_clean_twice_is_noop() {
        let temp = TempDir::new().unwrap();
        let config = test_config_at(temp.path(), "");
        fs::create_dir_all(temp.path().join("build/css")).unwrap();
        fs::write(temp.path().join("build/css/main.css"), "a{}").unwrap();

        assert!(clean_build_root(&config).unwrap());
        assert!(!temp.path().join("build").exists());
        assert!(!clean_build_root(&config).unwrap());
    }

    #[test]
    fn test_clean_keeps_sources() {
        let temp = TempDir::new().unwrap();
        let config = test_config_at(temp.path(), "");
        fs::create_dir_all(temp.path().join("src/img")).unwrap();
        fs::write(temp.path().join("src/img/sprite.png"), "png").unwrap();

        clean_build_root(&config).unwrap();
        assert!(temp.path().join("src/img/sprite.png").exists());
    }

    #[test]
    fn test_refuses_project_root() {
        let temp = TempDir::new().unwrap();
        let config = test_config_at(temp.path(), "[paths]\nbuild = \".\"");
        assert!(matches!(
            clean_build_root(&config),
            Err(ConfigError::Diagnostics(_))
        ));
        assert!(temp.path().exists());
    }

    #[test]
    fn test_refuses_outside_root() {
        assert!(ensure_removable(Path::new("/site"), Path::new("/elsewhere")).is_err());
        assert!(ensure_removable(Path::new("/site"), Path::new("/site/build")).is_ok());
    }
}
