//! Core noise analysis.
//!
//! This module contains:
//! - The hull-width noise metric
//! - Per-file segmentation into fixed-duration subsets
//! - Interval aggregation across stitched files
//! - Windowed channel statistics and high-noise selection

pub mod aggregator;
pub mod hull;
pub mod selector;
pub mod statistics;
pub mod windowing;

// Re-export commonly used types
pub use aggregator::{AggregationRun, IntervalAggregator, IntervalRecord};
pub use hull::{convex_hull, noise_metric};
pub use selector::{
    group_records, select_records, HighNoiseSelector, IntervalGroup, SelectionMode,
};
pub use statistics::{
    channel_statistic, per_file_summary, ChannelStatistics, FileNoiseSummary, NoiseStatistic,
};
pub use windowing::{subset_size, Subset, WindowSegmenter};
