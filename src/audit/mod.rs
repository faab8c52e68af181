//! Run auditing for lamp noise analysis.
//!
//! Tracks which files were used or skipped and how many intervals each
//! channel produced.

pub mod log;

// Re-export commonly used types
pub use log::{FileWarning, RunLog};
