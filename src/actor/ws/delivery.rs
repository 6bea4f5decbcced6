use tungstenite::protocol::Message;

use super::WsActor;
use crate::reload::message::HotReloadMessage;

impl WsActor {
    /// Send to every client, dropping the ones that went away.
    pub(super) fn broadcast(&self, message: &HotReloadMessage) {
        let text = message.to_json();
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            crate::debug!("ws"; "no clients for {}", text);
            return;
        }

        clients.retain_mut(|ws| match ws.send(Message::Text(text.clone().into())) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("ws"; "client dropped: {}", e);
                false
            }
        });
        crate::debug!("ws"; "{} -> {} client(s)", text, clients.len());
    }
}
