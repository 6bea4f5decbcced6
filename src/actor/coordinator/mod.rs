//! Actor coordinator: wires up and runs the watch-mode actors.
//!
//! Startup order:
//!
//! 1. live-reload socket (when enabled)
//! 2. file watcher, so edits made during the initial build are buffered
//! 3. initial build over the task graph (when requested)
//! 4. step actors, WsActor and FsActor until shutdown

mod runtime;

use std::net::IpAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::{Receiver, Sender};
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use super::fs::{FsActor, StepSenders};
use super::step::{RunGate, StepActor};
use super::ws::{WsActor, WsNotifier};
use crate::core::AssetKind;
use crate::graph::TaskGraph;
use crate::pipeline::{ConsoleNotifier, Fanout, Notifier, StepContext, TransformStep};
use crate::utils::plural::plural_count;

pub struct Coordinator {
    ctx: StepContext,
    /// Live-reload socket address.
    reload: Option<(IpAddr, u16)>,
    initial_build: bool,
    ready_tx: Option<Sender<()>>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(ctx: StepContext) -> Self {
        Self {
            ctx,
            reload: None,
            initial_build: false,
            ready_tx: None,
            shutdown_rx: None,
        }
    }

    /// Push build events to browsers over a WebSocket on `host:port`.
    pub fn with_live_reload(mut self, host: IpAddr, port: u16) -> Self {
        self.reload = Some((host, port));
        self
    }

    /// Run every step once after the watcher is up.
    pub fn with_initial_build(mut self) -> Self {
        self.initial_build = true;
        self
    }

    /// Signalled once the initial build (if any) is done.
    pub fn with_ready_signal(mut self, tx: Sender<()>) -> Self {
        self.ready_tx = Some(tx);
        self
    }

    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system until shutdown.
    pub async fn run(self) -> Result<()> {
        let graph = TaskGraph::new(&self.ctx.config)?;
        let (ws_tx, ws_rx) = mpsc::unbounded_channel();

        let mut sinks: Vec<Arc<dyn Notifier>> = vec![Arc::new(ConsoleNotifier::watch())];
        let ws_actor = match self.reload {
            Some((host, port)) => match crate::reload::server::start_ws_server(host, port, ws_tx.clone()) {
                Ok(actual) => {
                    crate::cli::serve::set_reload_port(actual);
                    crate::debug!("reload"; "ws://{}:{}", host, actual);
                    sinks.push(Arc::new(WsNotifier::new(ws_tx.clone())));
                    Some(WsActor::new(ws_rx))
                }
                Err(e) => {
                    crate::log!("reload"; "live reload disabled: {:#}", e);
                    None
                }
            },
            None => None,
        };
        let notifier: Arc<dyn Notifier> = Arc::new(Fanout(sinks));

        let (senders, step_actors) = self.step_actors(&graph, &notifier);
        let fs_actor = FsActor::new(Arc::clone(&self.ctx.table), senders.clone())
            .context("failed to start file watcher")?;

        if self.initial_build {
            let ctx = self.ctx.clone();
            let notifier = Arc::clone(&notifier);
            let report = tokio::task::spawn_blocking(move || graph.run_all(&ctx, notifier.as_ref()))
                .await
                .context("initial build panicked")?;
            let failed = report.failed().count();
            if failed > 0 {
                crate::log!("watch"; "initial build: {} failed", plural_count(failed, "step"));
            }
        }
        if let Some(tx) = self.ready_tx {
            let _ = tx.send(());
        }

        crate::log!("watch"; "watching for changes");
        runtime::run_actors(fs_actor, step_actors, ws_actor, senders, ws_tx, self.shutdown_rx).await;
        crate::debug!("actor"; "stopped");
        Ok(())
    }

    /// One actor per step, gated on the run gates of its dependencies.
    fn step_actors(
        &self,
        graph: &TaskGraph,
        notifier: &Arc<dyn Notifier>,
    ) -> (StepSenders, Vec<StepActor>) {
        let gates: FxHashMap<AssetKind, RunGate> = AssetKind::ALL
            .iter()
            .map(|&kind| (kind, RunGate::default()))
            .collect();

        let mut senders = StepSenders::default();
        let mut actors = Vec::with_capacity(AssetKind::ALL.len());
        for kind in AssetKind::ALL {
            let (tx, rx) = mpsc::unbounded_channel();
            senders.insert(kind, tx);
            let upstream = graph
                .dependencies(kind)
                .iter()
                .filter_map(|dep| gates.get(dep).cloned())
                .collect();
            actors.push(StepActor::new(
                TransformStep::for_kind(kind, &self.ctx.config),
                rx,
                self.ctx.clone(),
                Arc::clone(notifier),
                gates[&kind].clone(),
                upstream,
            ));
        }
        (senders, actors)
    }
}
