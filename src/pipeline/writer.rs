//! Atomic output writes.
//!
//! Two-phase commit over a step's whole batch:
//! 1. Drop outputs whose bytes already match the file on disk
//! 2. Write every remaining output to a hidden sibling temp file
//! 3. Rename each temp file over its destination
//!
//! If any write in phase 2 fails, every temp file is removed and no
//! destination is touched. `rename()` within one directory is atomic, so
//! readers never observe a truncated output.

use std::fs;
use std::path::PathBuf;

use super::{Asset, StepError};
use crate::utils::path::fs::temp_path_for;

/// What a commit did.
#[derive(Debug, Default)]
pub struct CommitReport {
    /// Destinations whose contents changed.
    pub written: Vec<PathBuf>,
    /// Destinations left alone because their bytes were identical.
    pub unchanged: Vec<PathBuf>,
}

/// Write `assets` atomically, skipping identical outputs.
pub fn commit(assets: &[Asset]) -> Result<CommitReport, StepError> {
    let mut report = CommitReport::default();
    let mut pending = Vec::with_capacity(assets.len());

    for asset in assets {
        match fs::read(&asset.dest) {
            Ok(existing) if existing == asset.contents => report.unchanged.push(asset.dest.clone()),
            _ => pending.push(asset),
        }
    }

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(pending.len());
    for asset in pending {
        if let Some(parent) = asset.dest.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            cleanup(&staged);
            return Err(StepError::fs(parent, e));
        }

        let temp = temp_path_for(&asset.dest);
        if let Err(e) = fs::write(&temp, &asset.contents) {
            let _ = fs::remove_file(&temp);
            cleanup(&staged);
            return Err(StepError::fs(&asset.dest, e));
        }
        staged.push((temp, asset.dest.clone()));
    }

    for (index, (temp, dest)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(temp, dest) {
            cleanup(&staged[index..]);
            return Err(StepError::fs(dest, e));
        }
        report.written.push(dest.clone());
    }

    Ok(report)
}

fn cleanup(staged: &[(PathBuf, PathBuf)]) {
    for (temp, _) in staged {
        let _ = fs::remove_file(temp);
    }
}
