//! Per-run record of what was read, skipped and produced.
//!
//! A run never aborts on a bad file; the file is skipped and the reason is
//! kept here so the caller can surface it.

use crate::loader::types::ChannelLabel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file that could not be used, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileWarning {
    /// Position of the file in the input list
    pub file_index: usize,
    /// File name without directory
    pub filename: String,
    /// Human-readable failure reason
    pub reason: String,
}

/// Counters and warnings for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
    files_read: u64,
    files_skipped: u64,
    main_intervals: u64,
    reference_intervals: u64,
    warnings: Vec<FileWarning>,
    started_at: DateTime<Utc>,
}

impl RunLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            files_read: 0,
            files_skipped: 0,
            main_intervals: 0,
            reference_intervals: 0,
            warnings: Vec::new(),
            started_at: Utc::now(),
        }
    }

    /// Record a file that was read and stitched.
    pub fn record_file_read(&mut self) {
        self.files_read += 1;
    }

    /// Record a skipped file.
    pub fn record_file_skipped(&mut self, warning: FileWarning) {
        self.files_skipped += 1;
        self.warnings.push(warning);
    }

    /// Record intervals emitted for a channel.
    pub fn record_intervals(&mut self, channel: ChannelLabel, count: usize) {
        match channel {
            ChannelLabel::Main => self.main_intervals += count as u64,
            ChannelLabel::Reference => self.reference_intervals += count as u64,
        }
    }

    pub fn files_read(&self) -> u64 {
        self.files_read
    }

    pub fn files_skipped(&self) -> u64 {
        self.files_skipped
    }

    pub fn intervals(&self, channel: ChannelLabel) -> u64 {
        match channel {
            ChannelLabel::Main => self.main_intervals,
            ChannelLabel::Reference => self.reference_intervals,
        }
    }

    pub fn warnings(&self) -> &[FileWarning] {
        &self.warnings
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Data collection complete:\n\
             - Main channel: {} intervals collected\n\
             - Reference channel: {} intervals collected\n\
             - Files processed: {}\n\
             - Files skipped: {}",
            self.main_intervals, self.reference_intervals, self.files_read, self.files_skipped
        );
        for warning in &self.warnings {
            out.push_str(&format!(
                "\n  ! file {} ({}): {}",
                warning.file_index + 1,
                warning.filename,
                warning.reason
            ));
        }
        out
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_log_counting() {
        let mut log = RunLog::new();
        log.record_file_read();
        log.record_file_read();
        log.record_intervals(ChannelLabel::Main, 3);
        log.record_intervals(ChannelLabel::Reference, 2);
        log.record_intervals(ChannelLabel::Main, 1);

        assert_eq!(log.files_read(), 2);
        assert_eq!(log.intervals(ChannelLabel::Main), 4);
        assert_eq!(log.intervals(ChannelLabel::Reference), 2);
    }

    #[test]
    fn test_summary_lists_warnings() {
        let mut log = RunLog::new();
        log.record_file_skipped(FileWarning {
            file_index: 1,
            filename: "broken.txt".to_string(),
            reason: "no data rows after header".to_string(),
        });

        let summary = log.summary();
        assert_eq!(log.files_skipped(), 1);
        assert!(summary.contains("Files skipped: 1"));
        assert!(summary.contains("file 2 (broken.txt): no data rows"));
    }
}
