use std::path::PathBuf;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::utils::path::{is_temp_file, normalize_path};

/// Quiet window after the last raw event.
pub(super) const DEBOUNCE_MS: u64 = 300;
/// Minimum gap between two dispatched batches.
pub(super) const REBUILD_COOLDOWN_MS: u64 = 800;
/// Wake-up interval while idle, for re-attaching watch roots.
pub(super) const IDLE_POLL_MS: u64 = 1000;

/// Timing and deduplication only; routing happens elsewhere.
pub(super) struct Debouncer {
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
    pub(super) last_dispatch: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
            last_dispatch: None,
        }
    }

    /// Record a notify event.
    ///
    /// Per path:
    /// - removed, then created/modified: keep the later event
    /// - modified, then removed: removed
    /// - created, then removed: forget the path
    /// - anything else: first event wins
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        let Some(kind) = ChangeKind::from_notify(&event.kind) else {
            return;
        };

        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            let path = normalize_path(path);

            match self.changes.get(&path).copied() {
                None => {
                    self.changes.insert(path, kind);
                }
                Some(ChangeKind::Removed) if kind != ChangeKind::Removed => {
                    self.changes.insert(path, kind);
                }
                Some(ChangeKind::Modified) if kind == ChangeKind::Removed => {
                    self.changes.insert(path, ChangeKind::Removed);
                }
                Some(ChangeKind::Created) if kind == ChangeKind::Removed => {
                    crate::debug!("watch"; "discard created+removed: {}", path.display());
                    self.changes.remove(&path);
                }
                Some(_) => continue,
            }
            self.last_event = Some(Instant::now());
        }
    }

    /// Drain the pending changes once debounce and cooldown have elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        if !self.is_ready() {
            return None;
        }

        let changes = std::mem::take(&mut self.changes);
        self.last_event = None;
        self.last_dispatch = Some(Instant::now());
        Some(changes)
    }

    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };

        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return false;
        }

        if let Some(last_dispatch) = self.last_dispatch
            && last_dispatch.elapsed() < Duration::from_millis(REBUILD_COOLDOWN_MS)
        {
            return false;
        }

        !self.changes.is_empty()
    }

    /// Time until the batch could next become ready.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_millis(IDLE_POLL_MS);
        };

        let debounce = Duration::from_millis(DEBOUNCE_MS).saturating_sub(last_event.elapsed());
        let cooldown = self.last_dispatch.map_or(Duration::ZERO, |t| {
            Duration::from_millis(REBUILD_COOLDOWN_MS).saturating_sub(t.elapsed())
        });

        debounce.max(cooldown).max(Duration::from_millis(1))
    }
}
