//! WebSocket actor: live-reload clients and their messages.
//!
//! ```text
//! StepActor --BuildEvent--> WsNotifier --> WsActor --json--> browsers
//! ```
//!
//! Failures show the overlay and never reload. Errors are tracked per step:
//! the overlay is cleared once every failed step has succeeded again, and a
//! client connecting in between is shown the outstanding error right away.

mod client_io;
mod delivery;

use std::collections::BTreeMap;
use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use super::messages::WsMsg;
use crate::core::{AssetKind, BuildEvent, Outcome};
use crate::pipeline::Notifier;
use crate::reload::message::HotReloadMessage;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

pub struct WsActor {
    rx: mpsc::UnboundedReceiver<WsMsg>,
    clients: Clients,
    /// Failed steps and their latest error.
    errors: BTreeMap<AssetKind, String>,
}

impl WsActor {
    pub fn new(rx: mpsc::UnboundedReceiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            errors: BTreeMap::new(),
        }
    }

    /// Run the actor event loop.
    pub async fn run(mut self) {
        let clients = Arc::clone(&self.clients);
        std::thread::spawn(move || Self::client_reader_loop(clients));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Event(event) => {
                    for message in self.messages_for(&event) {
                        self.broadcast(&message);
                    }
                }
                WsMsg::AddClient(stream) => self.add_client(stream),
                WsMsg::Shutdown => break,
            }
        }

        crate::debug!("ws"; "shutting down");
        for mut ws in self.clients.lock().drain(..) {
            let _ = ws.close(None);
        }
    }

    /// Client messages for one build event, updating the error set.
    fn messages_for(&mut self, event: &BuildEvent) -> Vec<HotReloadMessage> {
        match &event.outcome {
            Outcome::Failure { message } => {
                self.errors.insert(event.kind, message.clone());
                vec![HotReloadMessage::error(event.kind, message)]
            }
            Outcome::Success(_) => {
                let mut out = Vec::new();
                if self.errors.remove(&event.kind).is_some() {
                    out.push(self.outstanding_error().unwrap_or_else(HotReloadMessage::clear_error));
                }
                out.extend(HotReloadMessage::for_success(event));
                out
            }
        }
    }

    /// Error overlay for the first step still failing.
    fn outstanding_error(&self) -> Option<HotReloadMessage> {
        self.errors
            .iter()
            .next()
            .map(|(kind, error)| HotReloadMessage::error(*kind, error))
    }
}

/// Forwards build events to the WsActor.
#[derive(Debug, Clone)]
pub struct WsNotifier {
    tx: mpsc::UnboundedSender<WsMsg>,
}

impl WsNotifier {
    pub fn new(tx: mpsc::UnboundedSender<WsMsg>) -> Self {
        Self { tx }
    }
}

impl Notifier for WsNotifier {
    fn notify(&self, event: &BuildEvent) {
        // a closed actor means shutdown is under way
        let _ = self.tx.send(WsMsg::Event(event.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StepStats;

    fn actor() -> WsActor {
        let (_tx, rx) = mpsc::unbounded_channel();
        WsActor::new(rx)
    }

    fn ok(kind: AssetKind) -> BuildEvent {
        BuildEvent::success(kind, StepStats::default(), vec!["/css/main.css".into()])
    }

    #[test]
    fn test_failure_sends_overlay_not_reload() {
        let mut ws = actor();
        let messages = ws.messages_for(&BuildEvent::failure(AssetKind::Markup, "no layout"));
        assert_eq!(
            messages,
            vec![HotReloadMessage::error(AssetKind::Markup, "no layout")]
        );
    }

    #[test]
    fn test_next_success_clears_overlay() {
        let mut ws = actor();
        ws.messages_for(&BuildEvent::failure(AssetKind::Style, "expected ;"));

        let messages = ws.messages_for(&ok(AssetKind::Style));
        assert_eq!(
            messages,
            vec![
                HotReloadMessage::clear_error(),
                HotReloadMessage::css(vec!["/css/main.css".into()]),
            ]
        );
        assert_eq!(ws.messages_for(&ok(AssetKind::Style)).len(), 1);
    }

    #[test]
    fn test_other_failures_stay_visible() {
        let mut ws = actor();
        ws.messages_for(&BuildEvent::failure(AssetKind::Style, "style broke"));
        ws.messages_for(&BuildEvent::failure(AssetKind::Script, "script broke"));

        let messages = ws.messages_for(&ok(AssetKind::Style));
        assert_eq!(
            messages[0],
            HotReloadMessage::error(AssetKind::Script, "script broke")
        );
    }

    #[test]
    fn test_unrelated_success_keeps_overlay() {
        let mut ws = actor();
        ws.messages_for(&BuildEvent::failure(AssetKind::Style, "style broke"));

        let messages = ws.messages_for(&ok(AssetKind::Font));
        assert_eq!(messages, vec![HotReloadMessage::reload(AssetKind::Font)]);
        assert!(ws.outstanding_error().is_some());
    }

    #[tokio::test]
    async fn test_notifier_forwards_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier = WsNotifier::new(tx);
        notifier.notify(&ok(AssetKind::Image));

        match rx.recv().await {
            Some(WsMsg::Event(event)) => assert_eq!(event.kind, AssetKind::Image),
            other => panic!("unexpected {other:?}"),
        }
    }
}
