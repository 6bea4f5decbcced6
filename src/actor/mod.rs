//! Actor system for watch mode.
//!
//! ```text
//! FsActor ──Trigger──▶ StepActor (one per step) ──BuildEvent──▶ WsActor
//! (notify+debounce)      (serialized, gated)                  (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - message types between actors
//! - `fs` - file watcher, debouncing and routing to steps
//! - `step` - per-step actors with coalescing and run gates
//! - `ws` - WebSocket clients and reload messages
//! - `coordinator` - wires up and runs the actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod step;
pub mod ws;

pub use coordinator::Coordinator;
pub use ws::WsNotifier;
