//! Step and stage errors.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// One stage failed on one file.
#[derive(Debug, Clone, Error)]
#[error("{stage}: {}\n{message}", path.display())]
pub struct TransformError {
    pub stage: &'static str,
    pub path: PathBuf,
    pub message: String,
}

impl TransformError {
    pub fn new(stage: &'static str, path: &Path, message: impl Into<String>) -> Self {
        Self {
            stage,
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Why a step invocation produced no output.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("{}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StepError {
    pub fn fs(path: &Path, source: io::Error) -> Self {
        Self::FileSystem {
            path: path.to_path_buf(),
            source,
        }
    }
}
