//! Path utilities.
//!
//! Pure functions for path manipulation.
//!
//! - [`fs`]: filesystem path normalization (`normalize_path`, `is_temp_file`)

pub mod fs;

pub use fs::{is_temp_file, normalize_path};
