use std::collections::BTreeMap;
use std::path::PathBuf;

use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use super::types::ChangeKind;
use crate::actor::messages::StepMsg;
use crate::config::PathTable;
use crate::core::AssetKind;

/// Group one debounced batch by the steps whose watch glob matches.
///
/// Every path is matched against every glob; build outputs never trigger
/// anything. Kinds come back in `AssetKind` order, paths sorted.
pub(super) fn route(
    changes: &FxHashMap<PathBuf, ChangeKind>,
    table: &PathTable,
) -> Vec<(AssetKind, Vec<PathBuf>)> {
    let mut routed: BTreeMap<AssetKind, Vec<PathBuf>> = BTreeMap::new();

    for (path, kind) in changes {
        if table.is_build_output(path) {
            continue;
        }
        let kinds = table.kinds_watching(path);
        if kinds.is_empty() {
            crate::debug!("watch"; "unwatched {}: {}", kind.label(), path.display());
            continue;
        }
        crate::debug!("watch"; "{}: {}", kind.label(), path.display());
        for step in kinds {
            routed.entry(step).or_default().push(path.clone());
        }
    }

    routed
        .into_iter()
        .map(|(kind, mut paths)| {
            paths.sort();
            (kind, paths)
        })
        .collect()
}

/// Trigger queues of the step actors.
#[derive(Debug, Clone, Default)]
pub struct StepSenders(FxHashMap<AssetKind, mpsc::UnboundedSender<StepMsg>>);

impl StepSenders {
    pub fn insert(&mut self, kind: AssetKind, tx: mpsc::UnboundedSender<StepMsg>) {
        self.0.insert(kind, tx);
    }

    /// Enqueue each routed step once. `false` once every actor is gone.
    pub(super) fn dispatch(&self, routed: Vec<(AssetKind, Vec<PathBuf>)>) -> bool {
        for (kind, paths) in routed {
            if let Some(tx) = self.0.get(&kind)
                && tx.send(StepMsg::Trigger(paths)).is_err()
            {
                crate::debug!("watch"; "{} actor is gone", kind);
            }
        }
        self.0.values().any(|tx| !tx.is_closed())
    }

    pub fn shutdown(&self) {
        for tx in self.0.values() {
            let _ = tx.send(StepMsg::Shutdown);
        }
    }
}
