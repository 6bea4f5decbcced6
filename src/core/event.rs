//! Build events: the result of one transform step invocation.

use std::time::SystemTime;

use super::AssetKind;

/// Outcome of one step invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(StepStats),
    Failure { message: String },
}

/// File counters for a successful invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Outputs whose bytes changed on disk.
    pub written: usize,
    /// Outputs identical to what was already on disk.
    pub unchanged: usize,
    /// Sources skipped by the step's freshness filter.
    pub skipped: usize,
}

impl StepStats {
    pub const fn touched(&self) -> bool {
        self.written > 0
    }
}

/// One completed step invocation. Transient, never persisted.
#[derive(Debug, Clone)]
pub struct BuildEvent {
    pub kind: AssetKind,
    pub at: SystemTime,
    pub outcome: Outcome,
    /// Output paths written, relative to the build root when possible.
    pub written: Vec<String>,
}

impl BuildEvent {
    pub fn success(kind: AssetKind, stats: StepStats, written: Vec<String>) -> Self {
        Self {
            kind,
            at: SystemTime::now(),
            outcome: Outcome::Success(stats),
            written,
        }
    }

    pub fn failure(kind: AssetKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            at: SystemTime::now(),
            outcome: Outcome::Failure {
                message: message.into(),
            },
            written: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    pub fn stats(&self) -> Option<StepStats> {
        match self.outcome {
            Outcome::Success(stats) => Some(stats),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failure { message } => Some(message),
            Outcome::Success(_) => None,
        }
    }
}
