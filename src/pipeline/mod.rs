//! Transform steps: glob → ordered stages → atomic writes.
//!
//! # Architecture
//!
//! ```text
//! sources (PathTable glob)
//!    │  filter (newer, partials)
//!    ▼
//! Vec<Asset> ──stage──▶ Vec<Asset> ──stage──▶ … ──▶ writer (two-phase commit)
//!                                                      │
//!                                                      ▼
//!                                               BuildEvent → Notifier
//! ```
//!
//! A step invocation is all-or-nothing: the first failing stage aborts the
//! invocation before anything is written.

mod error;
mod notify;
mod step;
pub mod transform;
mod writer;

use std::path::PathBuf;
use std::sync::Arc;

pub use error::{StepError, TransformError};
#[cfg(test)]
pub use notify::RecordingNotifier;
pub use notify::{ConsoleNotifier, Fanout, Notifier};
pub use step::{SourceFilter, TransformStep};
pub use writer::{CommitReport, commit};

use crate::config::{PathTable, PipelineConfig};

/// A file in flight between stages.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Absolute source path (for sprite outputs, the icon directory).
    pub source: PathBuf,
    /// Absolute destination path.
    pub dest: PathBuf,
    pub contents: Vec<u8>,
}

impl Asset {
    pub fn new(source: PathBuf, dest: PathBuf, contents: Vec<u8>) -> Self {
        Self {
            source,
            dest,
            contents,
        }
    }

    /// Contents as UTF-8 text, or a stage error naming `stage`.
    pub fn text(&self, stage: &'static str) -> Result<&str, TransformError> {
        std::str::from_utf8(&self.contents)
            .map_err(|e| TransformError::new(stage, &self.source, format!("not valid UTF-8: {e}")))
    }
}

/// One transformation in a step's pipeline.
///
/// Stages see the whole batch so that N:1 stages (sprite packing) and 1:N
/// stages (CSS + source map) share one shape. Most stages map each asset
/// independently via [`each`].
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, batch: Vec<Asset>, ctx: &StepContext) -> Result<Vec<Asset>, TransformError>;
}

/// Apply `f` to every asset in order, stopping at the first error.
pub fn each<F>(batch: Vec<Asset>, mut f: F) -> Result<Vec<Asset>, TransformError>
where
    F: FnMut(Asset) -> Result<Vec<Asset>, TransformError>,
{
    let mut out = Vec::with_capacity(batch.len());
    for asset in batch {
        out.extend(f(asset)?);
    }
    Ok(out)
}

/// Shared, read-only inputs of every step invocation.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub config: Arc<PipelineConfig>,
    pub table: Arc<PathTable>,
}

impl StepContext {
    pub fn new(config: Arc<PipelineConfig>, table: Arc<PathTable>) -> Self {
        Self { config, table }
    }
}

#[cfg(test)]
mod tests;
