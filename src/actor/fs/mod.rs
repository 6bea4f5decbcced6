//! File system actor.
//!
//! Watches the base directory of every watch glob and turns raw notify
//! events into step triggers.
//!
//! ```text
//! notify → Debouncer (timing, dedup) → route (watch globs) → StepMsg::Trigger
//! ```
//!
//! The watcher is created before the initial build runs, so edits made
//! during that build are buffered instead of lost.

use std::sync::Arc;

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use crate::config::PathTable;

mod debouncer;
mod router;
mod types;
mod watch_roots;


use debouncer::Debouncer;
pub use router::StepSenders;
use router::route;
use watch_roots::WatchRoots;

pub struct FsActor {
    /// notify's callback side (sync → async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Dropping the watcher stops the subscription
    watcher: RecommendedWatcher,
    roots: WatchRoots,
    debouncer: Debouncer,
    table: Arc<PathTable>,
    steps: StepSenders,
}

impl FsActor {
    pub fn new(table: Arc<PathTable>, steps: StepSenders) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut roots = WatchRoots::new(table.watch_roots());
        roots.sync(&mut watcher)?;

        Ok(Self {
            notify_rx,
            watcher,
            roots,
            debouncer: Debouncer::new(),
            table,
            steps,
        })
    }

    /// Run the actor event loop until every step actor is gone.
    pub async fn run(self) {
        let Self {
            notify_rx,
            mut watcher,
            mut roots,
            mut debouncer,
            table,
            steps,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    if let Err(e) = roots.sync(&mut watcher) {
                        crate::log!("watch"; "failed to attach watch root: {}", e);
                    }
                    let Some(changes) = debouncer.take_if_ready() else {
                        continue;
                    };
                    let routed = route(&changes, &table);
                    if !routed.is_empty() && !steps.dispatch(routed) {
                        break;
                    }
                }
            }
        }
        crate::debug!("watch"; "stopped");
    }
}
