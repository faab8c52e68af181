//! Data file loading for lamp noise analysis.
//!
//! Reads tab-delimited measurement files and stitches them into one
//! continuous Main/Reference timeline.

pub mod reader;
pub mod stitcher;
pub mod types;

// Re-export commonly used types
pub use reader::{parse_data, read_data_file, FileData, LoadError};
pub use stitcher::{IntervalContext, LoadedFile, Stitcher};
pub use types::{Channel, ChannelLabel, FileSpan, Sample};
