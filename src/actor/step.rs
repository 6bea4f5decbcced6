//! Step actors.
//!
//! One actor per step consumes that step's triggers in order, so two
//! invocations of the same step never overlap. Triggers queued while a run
//! is in flight collapse into a single follow-up run.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use super::messages::StepMsg;
use crate::core::AssetKind;
use crate::pipeline::{Notifier, StepContext, TransformStep};

/// Held for the whole duration of a step run; dependents lock it first.
pub type RunGate = Arc<Mutex<()>>;

pub struct StepActor {
    step: Arc<TransformStep>,
    rx: mpsc::UnboundedReceiver<StepMsg>,
    ctx: StepContext,
    notifier: Arc<dyn Notifier>,
    gate: RunGate,
    /// Gates of the steps this one depends on.
    upstream: Vec<RunGate>,
}

impl StepActor {
    pub fn new(
        step: TransformStep,
        rx: mpsc::UnboundedReceiver<StepMsg>,
        ctx: StepContext,
        notifier: Arc<dyn Notifier>,
        gate: RunGate,
        upstream: Vec<RunGate>,
    ) -> Self {
        Self {
            step: Arc::new(step),
            rx,
            ctx,
            notifier,
            gate,
            upstream,
        }
    }

    pub fn kind(&self) -> AssetKind {
        self.step.kind()
    }

    /// Run the actor event loop.
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            let StepMsg::Trigger(mut paths) = msg else {
                break;
            };
            let mut shutdown = false;
            while let Ok(queued) = self.rx.try_recv() {
                match queued {
                    StepMsg::Trigger(more) => paths.extend(more),
                    StepMsg::Shutdown => {
                        shutdown = true;
                        break;
                    }
                }
            }
            if shutdown {
                break;
            }
            self.run_once(&paths).await;
        }
        crate::debug!("actor"; "{} stopped", self.step.name());
    }

    async fn run_once(&self, paths: &[PathBuf]) {
        let _running = self.gate.lock().await;
        for gate in &self.upstream {
            drop(gate.lock().await);
        }

        for path in paths {
            crate::debug!("watch"; "{} <- {}", self.step.name(), path.display());
        }

        let step = Arc::clone(&self.step);
        let ctx = self.ctx.clone();
        let notifier = Arc::clone(&self.notifier);
        let result = tokio::task::spawn_blocking(move || step.run(&ctx, notifier.as_ref())).await;
        if let Err(e) = result {
            crate::log!("error"; "{} panicked: {}", self.step.name(), e);
        }
    }
}
