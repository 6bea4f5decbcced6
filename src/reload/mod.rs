//! Live reload over a WebSocket sideband.
//!
//! - `message` - JSON messages understood by the injected client
//! - `server` - TCP listener handing accepted clients to the WsActor

pub mod message;
pub mod server;
