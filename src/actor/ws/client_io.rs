use std::net::TcpStream;
use std::time::Duration;

use tungstenite::protocol::Message;

use super::{Clients, WsActor};
use crate::reload::message::HotReloadMessage;

impl WsActor {
    /// Handshake, greet, and replay the outstanding error if any.
    pub(super) fn add_client(&self, stream: TcpStream) {
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::debug!("ws"; "handshake failed: {}", e);
                return;
            }
        };
        // blocking for the handshake, polled afterwards
        let _ = ws.get_ref().set_nonblocking(true);

        let mut greeting = vec![HotReloadMessage::connected()];
        greeting.extend(self.outstanding_error());
        for message in greeting {
            if let Err(e) = ws.send(Message::Text(message.to_json().into())) {
                crate::debug!("ws"; "client dropped during greeting: {}", e);
                return;
            }
        }

        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("ws"; "client connected (total: {})", clients.len());
    }

    /// Poll clients for close frames so dead sockets are dropped promptly.
    pub(super) fn client_reader_loop(clients: Clients) {
        loop {
            std::thread::sleep(Duration::from_millis(200));

            // the actor owns the only other handle; once it is gone, stop
            if std::sync::Arc::strong_count(&clients) == 1 {
                break;
            }

            clients.lock().retain_mut(|ws| match ws.read() {
                Ok(Message::Close(_)) => false,
                Ok(_) => true,
                Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    true
                }
                Err(_) => false,
            });
        }
    }
}
