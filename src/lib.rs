//! Lamp Noise - drift-independent noise analysis for lamp stability data.
//!
//! This library scores short windows of lamp intensity data with a convex
//! hull width metric and summarizes the scores over a fixed analysis window
//! spanning one or more consecutive data files.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Lamp Noise                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐         │
//! │  │   Loader    │──▶│  Windowing  │──▶│ Hull metric │         │
//! │  │ (stitching) │   │ (30s chunks)│   │  (per chunk)│         │
//! │  └─────────────┘   └─────────────┘   └─────────────┘         │
//! │         │                                    │                │
//! │         ▼                                    ▼                │
//! │  ┌─────────────┐                     ┌─────────────┐         │
//! │  │  Run audit  │                     │ Statistics/ │         │
//! │  │    log      │                     │  Selector   │         │
//! │  └─────────────┘                     └─────────────┘         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use lamp_noise::{ChannelStatistics, Config, IntervalAggregator};
//!
//! let config = Config::default();
//! let run = IntervalAggregator::new(&config).run(&["day1.txt", "day2.txt"]);
//! let stats = ChannelStatistics::compute(&run, &config.window);
//!
//! if let Some(main) = stats.main {
//!     println!("Main: mean {:.3}, max {:.3}", main.mean, main.max);
//! }
//! ```

pub mod audit;
pub mod config;
pub mod core;
pub mod loader;
pub mod report;

// Re-export key types at crate root for convenience
pub use audit::{FileWarning, RunLog};
pub use config::{AnalysisWindow, ChannelConfig, Config, ConfigError, TimeRange};
pub use core::{
    noise_metric, per_file_summary, AggregationRun, ChannelStatistics, HighNoiseSelector,
    IntervalAggregator, IntervalGroup, IntervalRecord, NoiseStatistic, SelectionMode,
    WindowSegmenter,
};
pub use loader::{Channel, ChannelLabel, FileSpan, LoadError, Sample, Stitcher};
pub use report::{ChannelSummary, NoiseReport, ReportBuilder};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
