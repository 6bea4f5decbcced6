//! Core types shared across the pipeline.

mod event;
mod kind;
mod mode;
mod state;

pub use event::{BuildEvent, Outcome, StepStats};
pub use kind::AssetKind;
pub use mode::BuildMode;
pub use state::{is_shutdown, register_server, register_shutdown_signal, setup_shutdown_handler};
