//! Report builder for analysis results.
//!
//! Produces the minimal summary contract consumed by external exporters:
//! per-channel mean and max over the analysis window, plus run metadata and,
//! optionally, the grouped high-noise intervals.

use crate::audit::FileWarning;
use crate::config::AnalysisWindow;
use crate::core::aggregator::AggregationRun;
use crate::core::selector::{IntervalGroup, SelectionMode};
use crate::core::statistics::ChannelStatistics;
use crate::loader::types::ChannelLabel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current report format version.
pub const REPORT_VERSION: &str = "1.0";

/// The name of this producer.
pub const PRODUCER_NAME: &str = "lamp-noise";

/// Producer metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    /// Name of the producing software
    pub name: String,
    /// Version of the producing software
    pub version: String,
    /// Unique instance identifier (UUID)
    pub instance_id: String,
}

/// Summary of one channel over the analysis window.
///
/// `mean` and `max` are `None` when no interval fell inside the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub channel: ChannelLabel,
    pub mean: Option<f64>,
    pub max: Option<f64>,
    pub count: usize,
}

impl ChannelSummary {
    pub fn has_data(&self) -> bool {
        self.count > 0
    }
}

/// High-noise section of a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighNoiseSection {
    pub selection: SelectionMode,
    pub groups: Vec<IntervalGroup>,
}

/// Complete result of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseReport {
    /// Report format version
    pub report_version: String,
    /// When the analysis run started
    pub started_at: DateTime<Utc>,
    /// When this report was computed
    pub generated_at: DateTime<Utc>,
    /// Producer metadata
    pub producer: ReportProducer,
    /// Window the summaries cover
    pub window: AnalysisWindow,
    /// Files read and stitched
    pub files_processed: Vec<String>,
    /// Files that were skipped
    pub files_skipped: Vec<FileWarning>,
    /// Whether remaining input files were left unread
    pub stopped_early: bool,
    /// Per-channel summaries, Main first
    pub channels: Vec<ChannelSummary>,
    /// High-noise intervals, if requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_noise: Option<HighNoiseSection>,
}

impl NoiseReport {
    pub fn channel(&self, label: ChannelLabel) -> Option<&ChannelSummary> {
        self.channels.iter().find(|c| c.channel == label)
    }
}

/// Builder for analysis reports.
pub struct ReportBuilder {
    instance_id: Uuid,
}

impl ReportBuilder {
    /// Create a new report builder with a unique instance ID.
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4(),
        }
    }

    /// Get the instance ID.
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Build a report for `run` over `window`.
    pub fn build(
        &self,
        run: &AggregationRun,
        window: &AnalysisWindow,
        channels: &[ChannelLabel],
    ) -> NoiseReport {
        let stats = ChannelStatistics::compute(run, window);
        let summaries = channels
            .iter()
            .map(|&label| {
                let stat = stats.get(label);
                ChannelSummary {
                    channel: label,
                    mean: stat.map(|s| s.mean),
                    max: stat.map(|s| s.max),
                    count: stat.map(|s| s.count).unwrap_or(0),
                }
            })
            .collect();

        NoiseReport {
            report_version: REPORT_VERSION.to_string(),
            started_at: run.log.started_at(),
            generated_at: Utc::now(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: crate::VERSION.to_string(),
                instance_id: self.instance_id.to_string(),
            },
            window: *window,
            files_processed: run.spans().iter().map(|s| s.filename.clone()).collect(),
            files_skipped: run.warnings().to_vec(),
            stopped_early: run.stopped_early,
            channels: summaries,
            high_noise: None,
        }
    }

    /// Build a report that also lists high-noise groups.
    pub fn build_with_groups(
        &self,
        run: &AggregationRun,
        window: &AnalysisWindow,
        channels: &[ChannelLabel],
        selection: SelectionMode,
        groups: Vec<IntervalGroup>,
    ) -> NoiseReport {
        let mut report = self.build(run, window, channels);
        report.high_noise = Some(HighNoiseSection { selection, groups });
        report
    }

    /// Build a report and serialize it to pretty JSON.
    pub fn build_json(
        &self,
        run: &AggregationRun,
        window: &AnalysisWindow,
        channels: &[ChannelLabel],
    ) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.build(run, window, channels))
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}
