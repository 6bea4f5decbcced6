//! The path table: per-kind source glob, watch glob and output dir.
//!
//! Built once from `[paths]` at startup and shared read-only. Patterns are
//! root-relative; `*` never crosses a path separator, `**` does.

use std::io;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};

use super::section::PathsConfig;
use crate::core::AssetKind;
use crate::utils::path::is_temp_file;

/// Glob semantics for every pattern in the table.
///
/// Wildcards never match a leading dot, so hidden files and the writer's
/// `.name.kiln-tmp` staging files are neither sources nor watch hits.
pub const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Resolved globs and output dir for one asset kind.
#[derive(Debug, Clone)]
pub struct PathSpec {
    pub kind: AssetKind,
    /// Root-relative source glob.
    pub source_glob: String,
    /// Root-relative watch glob.
    pub watch_glob: String,
    /// Absolute output directory.
    pub output_dir: PathBuf,
    /// Absolute directory the source glob's relative paths are taken from.
    pub source_base: PathBuf,
    watch: Pattern,
}

impl PathSpec {
    /// Whether a root-relative path matches this spec's watch glob.
    pub fn watches(&self, relative: &Path) -> bool {
        self.watch.matches_path_with(relative, MATCH_OPTIONS)
    }
}

/// Immutable mapping from asset kind to its paths.
#[derive(Debug, Clone)]
pub struct PathTable {
    root: PathBuf,
    build_root: PathBuf,
    specs: Vec<PathSpec>,
}

impl PathTable {
    /// Build the table for `root`. Fails on the first unparsable glob.
    pub fn new(root: &Path, paths: &PathsConfig) -> Result<Self, glob::PatternError> {
        let mut specs = Vec::with_capacity(AssetKind::ALL.len());
        for kind in AssetKind::ALL {
            let resolved = paths.resolved(kind);
            Pattern::new(&resolved.source)?;
            let watch = Pattern::new(&resolved.watch)?;
            specs.push(PathSpec {
                kind,
                source_base: root.join(glob_base(&resolved.source)),
                source_glob: resolved.source,
                watch_glob: resolved.watch,
                output_dir: root.join(&resolved.output),
                watch,
            });
        }

        Ok(Self {
            root: root.to_path_buf(),
            build_root: root.join(&paths.build),
            specs,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn build_root(&self) -> &Path {
        &self.build_root
    }

    pub fn spec(&self, kind: AssetKind) -> &PathSpec {
        // specs are pushed in AssetKind::ALL order
        let index = AssetKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or_default();
        &self.specs[index]
    }

    pub fn specs(&self) -> &[PathSpec] {
        &self.specs
    }

    /// Files currently matching `kind`'s source glob, sorted.
    pub fn sources(&self, kind: AssetKind) -> io::Result<Vec<PathBuf>> {
        let spec = self.spec(kind);
        let pattern = format!(
            "{}/{}",
            Pattern::escape(&self.root.to_string_lossy()),
            spec.source_glob
        );
        let entries = glob::glob_with(&pattern, MATCH_OPTIONS)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(glob::GlobError::into_error)?;
            if path.is_file() && !is_temp_file(&path) && !self.is_hidden(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Whether any root-relative component of `path` starts with a dot.
    fn is_hidden(&self, path: &Path) -> bool {
        path.strip_prefix(&self.root).is_ok_and(|relative| {
            relative
                .components()
                .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
        })
    }

    /// Path of `source` relative to its kind's glob base.
    ///
    /// `src/fonts/a/b.woff` under `src/fonts/**/*.*` gives `a/b.woff`.
    pub fn relative_source(&self, kind: AssetKind, source: &Path) -> PathBuf {
        let spec = self.spec(kind);
        source
            .strip_prefix(&spec.source_base)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(source.file_name().unwrap_or_default()))
    }

    /// Kinds whose watch glob matches `path` (absolute or root-relative).
    pub fn kinds_watching(&self, path: &Path) -> Vec<AssetKind> {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.specs
            .iter()
            .filter(|spec| spec.watches(relative))
            .map(|spec| spec.kind)
            .collect()
    }

    /// Directories to subscribe to, without nested duplicates.
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .specs
            .iter()
            .map(|spec| self.root.join(glob_base(&spec.watch_glob)))
            .collect();
        roots.sort();
        roots.dedup();

        let mut kept: Vec<PathBuf> = Vec::new();
        for root in roots {
            if !kept.iter().any(|k| root.starts_with(k)) {
                kept.push(root);
            }
        }
        kept
    }

    /// Whether `path` lies inside the build root.
    pub fn is_build_output(&self, path: &Path) -> bool {
        path.starts_with(&self.build_root)
    }
}

/// Literal directory prefix of a glob.
///
/// - `src/img/*.*` → `src/img`
/// - `src/fonts/**/*.*` → `src/fonts`
/// - `src/js/main.js` → `src/js`
pub fn glob_base(pattern: &str) -> PathBuf {
    let path = Path::new(pattern);
    let mut base = PathBuf::new();
    let mut saw_meta = false;
    for component in path.components() {
        let part = component.as_os_str().to_string_lossy();
        if part.contains(GLOB_META) {
            saw_meta = true;
            break;
        }
        base.push(component);
    }
    if !saw_meta {
        base.pop();
    }
    base
}

/// Lexically normalize `.` and `..` without touching the filesystem.
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::section::PathsConfig;

    fn table() -> PathTable {
        PathTable::new(Path::new("/site"), &PathsConfig::default()).unwrap()
    }

    #[test]
    fn test_glob_base() {
        assert_eq!(glob_base("src/img/*.*"), PathBuf::from("src/img"));
        assert_eq!(glob_base("src/fonts/**/*.*"), PathBuf::from("src/fonts"));
        assert_eq!(glob_base("src/js/main.js"), PathBuf::from("src/js"));
        assert_eq!(glob_base("*.html"), PathBuf::new());
    }

    #[test]
    fn test_watch_routing_is_exclusive() {
        let table = table();
        assert_eq!(
            table.kinds_watching(Path::new("/site/src/img/logo.png")),
            vec![AssetKind::Image]
        );
        assert_eq!(
            table.kinds_watching(Path::new("/site/src/img/icons/home.png")),
            vec![AssetKind::SpriteIcon]
        );
        assert_eq!(
            table.kinds_watching(Path::new("src/style/partials/_base.scss")),
            vec![AssetKind::Style]
        );
        assert_eq!(
            table.kinds_watching(Path::new("/site/src/templates/layouts/base.html")),
            vec![AssetKind::Markup]
        );
        assert!(table.kinds_watching(Path::new("/site/README.md")).is_empty());
    }

    #[test]
    fn test_watch_roots_collapse_nested() {
        let roots = table().watch_roots();
        assert!(roots.contains(&PathBuf::from("/site/src/img")));
        assert!(!roots.contains(&PathBuf::from("/site/src/img/icons")));
        assert!(roots.contains(&PathBuf::from("/site/src/js")));
    }

    #[test]
    fn test_relative_source_keeps_subdirs() {
        let table = table();
        assert_eq!(
            table.relative_source(AssetKind::Font, Path::new("/site/src/fonts/a/b.woff")),
            PathBuf::from("a/b.woff")
        );
        assert_eq!(
            table.relative_source(AssetKind::Script, Path::new("/site/src/js/main.js")),
            PathBuf::from("main.js")
        );
    }

    #[test]
    fn test_sources_expansion() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path();
        std::fs::create_dir_all(root.join("src/img/icons")).unwrap();
        std::fs::write(root.join("src/img/a.png"), b"a").unwrap();
        std::fs::write(root.join("src/img/b.jpg"), b"b").unwrap();
        std::fs::write(root.join("src/img/icons/c.png"), b"c").unwrap();

        let table = PathTable::new(root, &PathsConfig::default()).unwrap();
        let images = table.sources(AssetKind::Image).unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.jpg"]);
    }

    #[test]
    fn test_sources_skip_hidden_and_staging_files() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path();
        std::fs::create_dir_all(root.join("src/img")).unwrap();
        std::fs::create_dir_all(root.join("src/fonts/.cache")).unwrap();
        std::fs::write(root.join("src/img/logo.png"), b"a").unwrap();
        std::fs::write(root.join("src/img/.DS_Store"), b"x").unwrap();
        std::fs::write(root.join("src/img/.sprite.png.kiln-tmp"), b"x").unwrap();
        std::fs::write(root.join("src/img/logo.png~"), b"x").unwrap();
        std::fs::write(root.join("src/fonts/a.woff2"), b"f").unwrap();
        std::fs::write(root.join("src/fonts/.cache/b.woff2"), b"f").unwrap();

        let table = PathTable::new(root, &PathsConfig::default()).unwrap();
        let names = |kind| -> Vec<String> {
            table
                .sources(kind)
                .unwrap()
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        };
        assert_eq!(names(AssetKind::Image), vec!["logo.png"]);
        assert_eq!(names(AssetKind::Font), vec!["a.woff2"]);
    }

    #[test]
    fn test_hidden_files_are_not_watched() {
        let table = table();
        assert!(table.kinds_watching(Path::new("/site/src/img/icons/.DS_Store")).is_empty());
        assert!(table.kinds_watching(Path::new("/site/src/img/.sprite.png.kiln-tmp")).is_empty());
    }

    #[test]
    fn test_lexical_normalize() {
        assert_eq!(
            lexical_normalize(Path::new("/site/./build/../build/css")),
            PathBuf::from("/site/build/css")
        );
    }
}
