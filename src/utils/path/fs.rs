//! Path normalization utilities.

use std::path::{Path, PathBuf};

/// Suffix of the staging files written next to their destination.
pub const TEMP_SUFFIX: &str = ".kiln-tmp";

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Staging path for an atomic write of `target`: `dir/.name.kiln-tmp`.
pub fn temp_path_for(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}{TEMP_SUFFIX}"))
}

/// Editor swap files, backups and our own staging files.
pub fn is_temp_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(TEMP_SUFFIX)
        || name.ends_with('~')
        || name.ends_with(".swp")
        || name.ends_with(".swx")
        || name.ends_with(".tmp")
        || name.starts_with(".#")
        || (name.starts_with('#') && name.ends_with('#'))
        || name == "4913"
        || name == ".DS_Store"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        assert!(normalize_path(path).is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        assert!(normalize_path(path).is_absolute());
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let temp = temp_path_for(Path::new("/site/build/css/main.css"));
        assert_eq!(temp, PathBuf::from("/site/build/css/.main.css.kiln-tmp"));
        assert!(is_temp_file(&temp));
    }

    #[test]
    fn test_editor_temp_files() {
        assert!(is_temp_file(Path::new("src/js/main.js~")));
        assert!(is_temp_file(Path::new("src/js/.main.js.swp")));
        assert!(is_temp_file(Path::new("src/js/4913")));
        assert!(is_temp_file(Path::new("src/js/#main.js#")));
        assert!(!is_temp_file(Path::new("src/js/main.js")));
    }
}
