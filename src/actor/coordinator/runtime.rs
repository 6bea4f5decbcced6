use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::actor::fs::{FsActor, StepSenders};
use crate::actor::messages::WsMsg;
use crate::actor::step::StepActor;
use crate::actor::ws::WsActor;

/// Run all actors until shutdown, then stop them in order.
///
/// Step actors finish the run in flight before they exit.
pub(super) async fn run_actors(
    fs: FsActor,
    steps: Vec<StepActor>,
    ws: Option<WsActor>,
    senders: StepSenders,
    ws_tx: mpsc::UnboundedSender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) {
    let step_handles: Vec<JoinHandle<()>> = steps
        .into_iter()
        .map(|actor| tokio::spawn(actor.run()))
        .collect();
    let ws_handle = ws.map(|actor| tokio::spawn(actor.run()));
    let fs_handle = tokio::spawn(fs.run());

    loop {
        if shutdown_requested(shutdown_rx.as_ref()) || fs_handle.is_finished() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    crate::debug!("actor"; "shutting down");

    fs_handle.abort();
    senders.shutdown();
    for handle in step_handles {
        let _ = tokio::time::timeout(Duration::from_secs(2), handle).await;
    }

    let _ = ws_tx.send(WsMsg::Shutdown);
    if let Some(handle) = ws_handle {
        let _ = tokio::time::timeout(Duration::from_millis(500), handle).await;
    }
}

fn shutdown_requested(rx: Option<&Receiver<()>>) -> bool {
    crate::core::is_shutdown() || rx.is_some_and(|rx| rx.try_recv().is_ok())
}
