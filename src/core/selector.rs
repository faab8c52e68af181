//! Ranking of high-noise intervals across both channels.
//!
//! Selection runs in two stages. `select_records` keeps records by threshold
//! or top-K. `group_records` merges the kept Main and Reference records that
//! cover the same slice and orders the groups by their larger noise value.
//! The final order comes from the second stage only.

use crate::config::{AnalysisWindow, TimeRange};
use crate::core::aggregator::IntervalRecord;
use crate::loader::types::ChannelLabel;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Number of intervals listed when no explicit selection is given.
pub const DEFAULT_TOP_K: i64 = 5;

/// How high-noise records are picked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "value")]
pub enum SelectionMode {
    /// Every record with noise at or above the threshold
    Threshold(f64),
    /// The K noisiest records; K <= 0 selects nothing
    TopK(i64),
}

impl Default for SelectionMode {
    fn default() -> Self {
        SelectionMode::TopK(DEFAULT_TOP_K)
    }
}

impl SelectionMode {
    /// Pick a mode from optional CLI values; a threshold takes precedence.
    pub fn from_options(threshold: Option<f64>, top: Option<i64>) -> Self {
        match (threshold, top) {
            (Some(t), _) => SelectionMode::Threshold(t),
            (None, Some(k)) => SelectionMode::TopK(k),
            (None, None) => SelectionMode::default(),
        }
    }
}

/// Main and Reference noise for one time slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalGroup {
    pub start_time: f64,
    pub end_time: f64,
    pub file_index: usize,
    pub filename: String,
    pub main_noise: Option<f64>,
    pub reference_noise: Option<f64>,
}

impl IntervalGroup {
    fn from_record(record: &IntervalRecord) -> Self {
        let mut group = Self {
            start_time: record.start_time,
            end_time: record.end_time,
            file_index: record.file_index,
            filename: record.filename.clone(),
            main_noise: None,
            reference_noise: None,
        };
        group.set(record);
        group
    }

    fn set(&mut self, record: &IntervalRecord) {
        match record.channel {
            ChannelLabel::Main => self.main_noise = Some(record.noise_value),
            ChannelLabel::Reference => self.reference_noise = Some(record.noise_value),
        }
    }

    /// Larger of the two channel values (0.0 if neither is present).
    pub fn max_noise(&self) -> f64 {
        self.main_noise
            .into_iter()
            .chain(self.reference_noise)
            .fold(0.0, f64::max)
    }

    pub fn noise(&self, channel: ChannelLabel) -> Option<f64> {
        match channel {
            ChannelLabel::Main => self.main_noise,
            ChannelLabel::Reference => self.reference_noise,
        }
    }
}

/// Records whose start time lies in `range`.
pub fn filter_window<'a, I>(records: I, range: TimeRange) -> Vec<&'a IntervalRecord>
where
    I: IntoIterator<Item = &'a IntervalRecord>,
{
    records
        .into_iter()
        .filter(|r| range.contains(r.start_time))
        .collect()
}

/// First stage: keep records by threshold or top-K, noisiest first.
pub fn select_records(
    mut candidates: Vec<&IntervalRecord>,
    mode: SelectionMode,
) -> Vec<&IntervalRecord> {
    match mode {
        SelectionMode::Threshold(threshold) => {
            candidates.retain(|r| r.noise_value >= threshold);
            candidates.sort_by(|a, b| descending(a.noise_value, b.noise_value));
            candidates
        }
        SelectionMode::TopK(k) if k <= 0 => Vec::new(),
        SelectionMode::TopK(k) => {
            candidates.sort_by(|a, b| descending(a.noise_value, b.noise_value));
            candidates.truncate(usize::try_from(k).unwrap_or(usize::MAX));
            candidates
        }
    }
}

/// Second stage: merge records by `(start_time, file_index)` and order the
/// groups by their maximum noise, descending.
pub fn group_records(selected: &[&IntervalRecord]) -> Vec<IntervalGroup> {
    let mut groups: Vec<IntervalGroup> = Vec::new();
    let mut positions: HashMap<(u64, usize), usize> = HashMap::new();

    for record in selected {
        let key = (record.start_time.to_bits(), record.file_index);
        match positions.get(&key) {
            Some(&pos) => groups[pos].set(record),
            None => {
                positions.insert(key, groups.len());
                groups.push(IntervalGroup::from_record(record));
            }
        }
    }

    groups.sort_by(|a, b| descending(a.max_noise(), b.max_noise()));
    groups
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Picks and groups high-noise intervals within a time range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighNoiseSelector {
    range: TimeRange,
    mode: SelectionMode,
}

impl HighNoiseSelector {
    /// Selector over the analysis window.
    pub fn new(window: &AnalysisWindow, mode: SelectionMode) -> Self {
        Self {
            range: window.range(),
            mode,
        }
    }

    /// Selector over an explicit time range.
    pub fn with_range(range: TimeRange, mode: SelectionMode) -> Self {
        Self { range, mode }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    /// Grouped high-noise intervals; empty when nothing qualifies.
    pub fn select<'a, I>(&self, records: I) -> Vec<IntervalGroup>
    where
        I: IntoIterator<Item = &'a IntervalRecord>,
    {
        let candidates = filter_window(records, self.range);
        let selected = select_records(candidates, self.mode);
        group_records(&selected)
    }
}
