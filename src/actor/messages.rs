//! Actor message definitions.
//!
//! ```text
//! FsActor --Trigger--> StepActor --BuildEvent--> WsActor --json--> browsers
//! ```

use std::net::TcpStream;
use std::path::PathBuf;

use crate::core::BuildEvent;

/// Messages to a step actor.
#[derive(Debug)]
pub enum StepMsg {
    /// Changed paths that matched the step's watch glob.
    Trigger(Vec<PathBuf>),
    Shutdown,
}

/// Messages to the WebSocket actor.
#[derive(Debug)]
pub enum WsMsg {
    /// A step finished; translated into zero or more client messages.
    Event(BuildEvent),
    /// Accepted TCP stream waiting for its handshake.
    AddClient(TcpStream),
    Shutdown,
}
