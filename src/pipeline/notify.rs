//! Build event sinks.
//!
//! Steps never print or broadcast directly: every invocation ends in exactly
//! one `BuildEvent` handed to the injected [`Notifier`].

use std::sync::Arc;

use crate::core::{BuildEvent, Outcome};
use crate::logger::{status_error, status_success, status_unchanged};
use crate::utils::plural::plural_count;
use crate::{debug, log};

/// Receives the outcome of every step invocation.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &BuildEvent);
}

/// Terminal output.
///
/// One-shot commands log a line per step; watch mode rewrites a single
/// status block instead.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleNotifier {
    watch: bool,
}

impl ConsoleNotifier {
    pub const fn build() -> Self {
        Self { watch: false }
    }

    pub const fn watch() -> Self {
        Self { watch: true }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, event: &BuildEvent) {
        let step = event.kind.step_name();
        match &event.outcome {
            Outcome::Success(stats) if self.watch => {
                if stats.touched() {
                    status_success(&format!("{step}: {}", plural_count(stats.written, "file")));
                } else {
                    status_unchanged(&format!("{step}: unchanged"));
                }
            }
            Outcome::Success(stats) => {
                log!(step; "{} written, {} unchanged, {} skipped",
                    plural_count(stats.written, "file"), stats.unchanged, stats.skipped);
                for path in &event.written {
                    debug!(step; "wrote {}", path);
                }
            }
            Outcome::Failure { message } if self.watch => {
                status_error(&format!("{step} failed"), message);
            }
            Outcome::Failure { message } => {
                log!("error"; "{step} failed\n{message}");
            }
        }
    }
}

/// Forwards every event to several sinks, in order.
pub struct Fanout(pub Vec<Arc<dyn Notifier>>);

impl Notifier for Fanout {
    fn notify(&self, event: &BuildEvent) {
        for sink in &self.0 {
            sink.notify(event);
        }
    }
}

/// Keeps every event for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: parking_lot::Mutex<Vec<BuildEvent>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BuildEvent> {
        self.events.lock().clone()
    }

    pub fn failures(&self) -> Vec<BuildEvent> {
        self.events().into_iter().filter(|e| !e.is_success()).collect()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&self, event: &BuildEvent) {
        self.events.lock().push(event.clone());
    }
}
