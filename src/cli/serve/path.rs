//! URL to filesystem path resolution.

use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Where a request URL points.
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup {
    File(PathBuf),
    /// Escapes the serve root.
    Forbidden,
    Missing,
}

/// Resolve `url` under `serve_root`, mapping directories to `index.html`.
pub fn resolve_path(url: &str, serve_root: &Path) -> Lookup {
    let decoded = decode(url_path(url));
    let relative = Path::new(decoded.trim_start_matches('/'));

    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Lookup::Forbidden;
    }

    let Ok(root) = serve_root.canonicalize() else {
        return Lookup::Missing;
    };
    let Ok(canonical) = root.join(relative).canonicalize() else {
        return Lookup::Missing;
    };
    // symlinks pointing out of the root
    if !canonical.starts_with(&root) {
        return Lookup::Forbidden;
    }

    if canonical.is_file() {
        return Lookup::File(canonical);
    }
    let index = canonical.join("index.html");
    if canonical.is_dir() && index.is_file() {
        return Lookup::File(index);
    }
    Lookup::Missing
}

/// Path part of a request target, without query or fragment.
pub fn url_path(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

fn decode(path: &str) -> String {
    percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| path.to_string())
}
