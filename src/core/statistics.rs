//! Per-channel noise statistics over the analysis window.
//!
//! Records are filtered to the window by start time and truncated to the
//! configured count in their original order. An empty selection has no
//! statistic (`None`), which is not an error.

use crate::config::AnalysisWindow;
use crate::core::aggregator::{AggregationRun, IntervalRecord};
use crate::loader::types::ChannelLabel;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Mean and maximum noise over a set of intervals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseStatistic {
    pub mean: f64,
    pub max: f64,
    pub count: usize,
}

impl NoiseStatistic {
    /// Statistic over `values`, or `None` if there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self {
            mean: values.mean(),
            max: Statistics::max(values),
            count: values.len(),
        })
    }
}

/// Records counted toward the window, in chronological order.
pub fn windowed_records<'a>(
    records: &'a [IntervalRecord],
    window: &AnalysisWindow,
) -> Vec<&'a IntervalRecord> {
    records
        .iter()
        .filter(|r| window.contains(r.start_time))
        .take(window.max_intervals)
        .collect()
}

/// Statistic for one channel's records over `window`.
pub fn channel_statistic(
    records: &[IntervalRecord],
    window: &AnalysisWindow,
) -> Option<NoiseStatistic> {
    let values: Vec<f64> = windowed_records(records, window)
        .into_iter()
        .map(|r| r.noise_value)
        .collect();
    NoiseStatistic::from_values(&values)
}

/// Statistics for both channels of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStatistics {
    pub main: Option<NoiseStatistic>,
    pub reference: Option<NoiseStatistic>,
}

impl ChannelStatistics {
    /// Derive statistics from a run's records.
    pub fn compute(run: &AggregationRun, window: &AnalysisWindow) -> Self {
        Self {
            main: channel_statistic(run.records(ChannelLabel::Main), window),
            reference: channel_statistic(run.records(ChannelLabel::Reference), window),
        }
    }

    pub fn get(&self, channel: ChannelLabel) -> Option<NoiseStatistic> {
        match channel {
            ChannelLabel::Main => self.main,
            ChannelLabel::Reference => self.reference,
        }
    }
}

/// Untruncated statistics for one input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNoiseSummary {
    pub file_index: usize,
    pub filename: String,
    pub main: Option<NoiseStatistic>,
    pub reference: Option<NoiseStatistic>,
}

/// Mean/max of every interval of each processed file, ignoring the window.
pub fn per_file_summary(run: &AggregationRun) -> Vec<FileNoiseSummary> {
    run.spans()
        .iter()
        .map(|span| {
            let for_channel = |channel: ChannelLabel| {
                let values: Vec<f64> = run
                    .records(channel)
                    .iter()
                    .filter(|r| r.file_index == span.index)
                    .map(|r| r.noise_value)
                    .collect();
                NoiseStatistic::from_values(&values)
            };
            FileNoiseSummary {
                file_index: span.index,
                filename: span.filename.clone(),
                main: for_channel(ChannelLabel::Main),
                reference: for_channel(ChannelLabel::Reference),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(start: f64, noise: f64) -> IntervalRecord {
        IntervalRecord {
            start_time: start,
            end_time: start + 29.0,
            noise_value: noise,
            file_index: 0,
            channel: ChannelLabel::Main,
            filename: "a.txt".to_string(),
        }
    }

    fn window(warmup: f64, length: f64, max: usize) -> AnalysisWindow {
        AnalysisWindow {
            warmup_secs: warmup,
            length_secs: length,
            max_intervals: max,
        }
    }

    #[test]
    fn test_statistic_over_window() {
        let records = vec![
            record(0.0, 100.0),
            record(30.0, 4.0),
            record(60.0, 8.0),
            record(90.0, 100.0),
        ];
        let stat = channel_statistic(&records, &window(30.0, 30.0, 120)).unwrap();
        assert_eq!(stat.count, 2);
        assert_relative_eq!(stat.mean, 6.0);
        assert_eq!(stat.max, 8.0);
    }

    #[test]
    fn test_truncation_keeps_first_in_order() {
        let records = vec![record(0.0, 1.0), record(30.0, 50.0), record(60.0, 3.0)];
        let stat = channel_statistic(&records, &window(0.0, 3600.0, 2)).unwrap();
        assert_eq!(stat.count, 2);
        assert_relative_eq!(stat.mean, 25.5);
        assert_eq!(stat.max, 50.0);
    }

    #[test]
    fn test_empty_window_is_no_data() {
        let records = vec![record(0.0, 1.0)];
        assert!(channel_statistic(&records, &window(1800.0, 3600.0, 120)).is_none());
        assert!(channel_statistic(&[], &AnalysisWindow::default()).is_none());
    }

    #[test]
    fn test_zero_max_intervals_is_no_data() {
        let records = vec![record(0.0, 1.0)];
        assert!(channel_statistic(&records, &window(0.0, 3600.0, 0)).is_none());
    }
}
