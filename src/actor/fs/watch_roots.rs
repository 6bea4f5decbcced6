use std::path::PathBuf;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

/// Base directories of the watch globs.
///
/// A root that does not exist yet (no icons directory, say) is attached as
/// soon as it appears; a root that was deleted and recreated is attached
/// again.
pub(super) struct WatchRoots {
    wanted: Vec<PathBuf>,
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    pub(super) fn new(wanted: Vec<PathBuf>) -> Self {
        Self {
            wanted,
            attached: FxHashSet::default(),
        }
    }

    /// Attach every existing root that is not attached yet.
    ///
    /// Returns how many were newly attached.
    pub(super) fn sync(&mut self, watcher: &mut RecommendedWatcher) -> notify::Result<usize> {
        self.attached.retain(|path| path.is_dir());

        let mut added = 0;
        for path in &self.wanted {
            if self.attached.contains(path) || !path.is_dir() {
                continue;
            }
            watcher.watch(path, RecursiveMode::Recursive)?;
            crate::debug!("watch"; "watching {}", path.display());
            self.attached.insert(path.clone());
            added += 1;
        }
        Ok(added)
    }

    #[cfg(test)]
    pub(super) fn is_attached(&self, path: &std::path::Path) -> bool {
        self.attached.contains(path)
    }
}
