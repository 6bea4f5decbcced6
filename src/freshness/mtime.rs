//! Mtime-based freshness detection.
//!
//! Backs the image step's `newer` filter: a source is only reprocessed when
//! its output counterpart is missing or older.

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Check if `output` is at least as new as `source`.
///
/// Returns `false` when either file is missing or its mtime is unreadable,
/// so the source gets processed.
pub fn is_output_fresh(source: &Path, output: &Path) -> bool {
    let (Some(source_time), Some(output_time)) = (get_mtime(source), get_mtime(output)) else {
        return false;
    };
    output_time >= source_time
}

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Set `output`'s mtime to now, so it counts as fresh again.
pub fn mark_fresh(output: &Path) -> io::Result<()> {
    File::options()
        .write(true)
        .open(output)?
        .set_modified(SystemTime::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::Duration;
    use tempfile::TempDir;

    fn set_mtime(path: &Path, time: SystemTime) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    #[test]
    fn test_missing_output_is_stale() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.png");
        fs::write(&source, b"png").unwrap();
        assert!(!is_output_fresh(&source, &dir.path().join("out.png")));
    }

    #[test]
    fn test_output_newer_than_source() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.png");
        let output = dir.path().join("out.png");
        fs::write(&source, b"png").unwrap();
        fs::write(&output, b"png").unwrap();

        let now = SystemTime::now();
        set_mtime(&source, now - Duration::from_secs(60));
        set_mtime(&output, now);
        assert!(is_output_fresh(&source, &output));

        set_mtime(&source, now + Duration::from_secs(60));
        assert!(!is_output_fresh(&source, &output));
    }
}
