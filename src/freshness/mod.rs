//! Freshness detection: mtime comparison between a source and its output.

pub mod mtime;

pub use mtime::{get_mtime, is_output_fresh, mark_fresh};
