//! WebSocket listener for live reload.
//!
//! Accepts TCP connections on a background thread and hands each stream to
//! the WsActor, which performs the handshake.

use std::net::{IpAddr, SocketAddr, TcpListener};

use anyhow::Result;

use crate::actor::messages::WsMsg;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Bind `host:base_port` (or the next free port) and start accepting.
///
/// Returns the port actually bound.
pub fn start_ws_server(
    host: IpAddr,
    base_port: u16,
    ws_tx: tokio::sync::mpsc::UnboundedSender<WsMsg>,
) -> Result<u16> {
    let (listener, port) = try_bind_port(host, base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        loop {
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("reload"; "client connected: {}", addr);
                    let _ = stream.set_nonblocking(false);
                    if ws_tx.send(WsMsg::AddClient(stream)).is_err() {
                        break;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if ws_tx.is_closed() {
                        break;
                    }
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
        }
        crate::debug!("reload"; "listener stopped");
    });

    Ok(port)
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(host: IpAddr, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(SocketAddr::new(host, port)) {
            Ok(listener) => {
                let actual = listener.local_addr()?.port();
                if offset > 0 {
                    crate::log!("reload"; "port {} in use, using {} instead", base_port, actual);
                }
                return Ok((listener, actual));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind live-reload socket after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
