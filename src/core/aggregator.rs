//! Interval aggregation across a sequence of data files.
//!
//! Files are read in the given order and stitched onto one timeline. Each
//! enabled channel of each file is segmented and scored, producing one
//! `IntervalRecord` per full subset. Once every enabled channel has a full
//! analysis window, remaining files are not read.

use crate::audit::{FileWarning, RunLog};
use crate::config::{AnalysisWindow, ChannelConfig, Config};
use crate::core::hull::noise_metric;
use crate::core::windowing::WindowSegmenter;
use crate::loader::reader::FileData;
use crate::loader::stitcher::{LoadedFile, Stitcher};
use crate::loader::types::{ChannelLabel, FileSpan};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Noise score of one subset, placed on the stitched timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalRecord {
    /// Stitched time of the subset's first (rounded) sample
    pub start_time: f64,
    /// Stitched time of the subset's last (rounded) sample
    pub end_time: f64,
    /// Hull-width noise of the subset
    pub noise_value: f64,
    /// Position of the source file in the input list
    pub file_index: usize,
    /// Channel the subset was taken from
    pub channel: ChannelLabel,
    /// Source file name
    pub filename: String,
}

/// Everything produced by one aggregation pass.
#[derive(Debug, Clone)]
pub struct AggregationRun {
    /// Stitched raw channels and file placements
    pub stitcher: Stitcher,
    /// Main channel intervals in chronological order
    pub main: Vec<IntervalRecord>,
    /// Reference channel intervals in chronological order
    pub reference: Vec<IntervalRecord>,
    /// Files read, skipped and intervals emitted
    pub log: RunLog,
    /// Whether remaining files were left unread
    pub stopped_early: bool,
}

impl AggregationRun {
    fn new() -> Self {
        Self {
            stitcher: Stitcher::new(),
            main: Vec::new(),
            reference: Vec::new(),
            log: RunLog::new(),
            stopped_early: false,
        }
    }

    /// Records for one channel.
    pub fn records(&self, channel: ChannelLabel) -> &[IntervalRecord] {
        match channel {
            ChannelLabel::Main => &self.main,
            ChannelLabel::Reference => &self.reference,
        }
    }

    /// Main records followed by Reference records.
    pub fn all_records(&self) -> impl Iterator<Item = &IntervalRecord> {
        self.main.iter().chain(self.reference.iter())
    }

    /// Files that were read and stitched.
    pub fn spans(&self) -> &[FileSpan] {
        self.stitcher.spans()
    }

    pub fn warnings(&self) -> &[FileWarning] {
        self.log.warnings()
    }

    fn records_mut(&mut self, channel: ChannelLabel) -> &mut Vec<IntervalRecord> {
        match channel {
            ChannelLabel::Main => &mut self.main,
            ChannelLabel::Reference => &mut self.reference,
        }
    }
}

/// Drives segmentation and scoring over an ordered list of files.
#[derive(Debug, Clone)]
pub struct IntervalAggregator {
    subset_duration_secs: f64,
    window: AnalysisWindow,
    channels: ChannelConfig,
    early_stop: bool,
}

impl IntervalAggregator {
    pub fn new(config: &Config) -> Self {
        Self {
            subset_duration_secs: config.subset_duration_secs,
            window: config.window,
            channels: config.channels,
            early_stop: config.early_stop,
        }
    }

    /// Read, stitch and score `paths` in order.
    ///
    /// Unreadable or malformed files are skipped and reported in the run log.
    pub fn run<P: AsRef<Path>>(&self, paths: &[P]) -> AggregationRun {
        let mut run = AggregationRun::new();
        let mut counter = WindowCounter::default();

        for (index, path) in paths.iter().enumerate() {
            if self.should_stop(&counter) {
                tracing::info!(
                    "Target of {} intervals reached for all channels, stopping at file {}",
                    self.window.max_intervals,
                    index + 1
                );
                run.stopped_early = true;
                break;
            }

            let path = path.as_ref();
            match run.stitcher.load(index, path) {
                Ok(loaded) => self.process(&mut run, &mut counter, &loaded),
                Err(e) => {
                    let filename = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    tracing::warn!("Skipping file {} ({}): {}", index + 1, filename, e);
                    run.log.record_file_skipped(FileWarning {
                        file_index: index,
                        filename,
                        reason: e.to_string(),
                    });
                }
            }
        }

        run
    }

    /// Stitch and score already-parsed files, in order.
    pub fn run_data<I>(&self, files: I) -> AggregationRun
    where
        I: IntoIterator<Item = (String, FileData)>,
    {
        let mut run = AggregationRun::new();
        let mut counter = WindowCounter::default();

        for (index, (filename, data)) in files.into_iter().enumerate() {
            if self.should_stop(&counter) {
                run.stopped_early = true;
                break;
            }
            let span = run.stitcher.push(index, filename, &data);
            let loaded = LoadedFile { span, data };
            self.process(&mut run, &mut counter, &loaded);
        }

        run
    }

    /// Score one channel of one file.
    pub fn score_file(&self, file: &LoadedFile, channel: ChannelLabel) -> Vec<IntervalRecord> {
        let values = match channel {
            ChannelLabel::Main => &file.data.main,
            ChannelLabel::Reference => &file.data.reference,
        };
        let segmenter = WindowSegmenter::for_file(&file.data.times, self.subset_duration_secs);
        let offset = file.span.time_offset;
        tracing::debug!(
            "File {} {}: subset size {}, {} full subsets",
            file.span.index + 1,
            channel,
            segmenter.subset_size(),
            segmenter.subset_count(values.len())
        );

        segmenter
            .segments(&file.data.times, values)
            .map(|subset| IntervalRecord {
                start_time: subset.start_time() + offset,
                end_time: subset.end_time() + offset,
                noise_value: noise_metric(&subset.points),
                file_index: file.span.index,
                channel,
                filename: file.span.filename.clone(),
            })
            .collect()
    }

    fn process(&self, run: &mut AggregationRun, counter: &mut WindowCounter, file: &LoadedFile) {
        run.log.record_file_read();
        tracing::debug!(
            "File {} ({}): {} samples, offset {:.2}s",
            file.span.index + 1,
            file.span.filename,
            file.span.sample_count,
            file.span.time_offset
        );

        let mut emitted = Vec::with_capacity(2);
        for channel in self.channels.enabled() {
            let records = self.score_file(file, channel);
            let in_window = records
                .iter()
                .filter(|r| self.window.contains(r.start_time))
                .count();
            counter.add(channel, in_window);
            run.log.record_intervals(channel, records.len());
            emitted.push(format!("{}: {}", channel, records.len()));
            run.records_mut(channel).extend(records);
        }

        tracing::info!(
            "Processed file {}: {} ({} intervals)",
            file.span.index + 1,
            file.span.filename,
            emitted.join(", ")
        );
    }

    fn should_stop(&self, counter: &WindowCounter) -> bool {
        self.early_stop
            && self
                .channels
                .enabled()
                .into_iter()
                .all(|channel| counter.get(channel) >= self.window.max_intervals)
    }
}

/// Running count of in-window records per channel.
#[derive(Debug, Default)]
struct WindowCounter {
    main: usize,
    reference: usize,
}

impl WindowCounter {
    fn add(&mut self, channel: ChannelLabel, count: usize) {
        match channel {
            ChannelLabel::Main => self.main += count,
            ChannelLabel::Reference => self.reference += count,
        }
    }

    fn get(&self, channel: ChannelLabel) -> usize {
        match channel {
            ChannelLabel::Main => self.main,
            ChannelLabel::Reference => self.reference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::statistics::ChannelStatistics;

    /// File with `count` samples at `spacing` seconds, alternating values.
    fn file(count: usize, spacing: f64) -> FileData {
        FileData {
            times: (0..count).map(|i| i as f64 * spacing).collect(),
            main: (0..count).map(|i| if i % 2 == 0 { 10.0 } else { 12.0 }).collect(),
            reference: (0..count).map(|i| if i % 3 == 0 { 5.0 } else { 4.0 }).collect(),
        }
    }

    fn config(warmup: f64, max_intervals: usize) -> Config {
        let mut config = Config::default();
        config.window.warmup_secs = warmup;
        config.window.max_intervals = max_intervals;
        config
    }

    #[test]
    fn test_exact_multiple_emits_contiguous_intervals() {
        let aggregator = IntervalAggregator::new(&config(0.0, 120));
        let run = aggregator.run_data(vec![("a.txt".to_string(), file(90, 1.0))]);

        for channel in ChannelLabel::ALL {
            let records = run.records(channel);
            assert_eq!(records.len(), 3);
            for pair in records.windows(2) {
                assert!(pair[0].end_time < pair[1].start_time);
            }
            assert!(records.iter().all(|r| r.end_time >= r.start_time));
        }
        assert_eq!(run.main[1].start_time, 30.0);
        assert_eq!(run.main[1].end_time, 59.0);
        assert_eq!(run.main[0].noise_value, 2.0);
    }

    #[test]
    fn test_short_file_emits_nothing() {
        let aggregator = IntervalAggregator::new(&config(0.0, 120));
        let run = aggregator.run_data(vec![("a.txt".to_string(), file(200, 0.1))]);
        assert!(run.main.is_empty());
        assert!(run.reference.is_empty());
        assert_eq!(run.spans().len(), 1);
    }

    #[test]
    fn test_second_file_intervals_are_offset() {
        let aggregator = IntervalAggregator::new(&config(0.0, 120));
        let run = aggregator.run_data(vec![
            ("a.txt".to_string(), file(30, 1.0)),
            ("b.txt".to_string(), file(30, 1.0)),
        ]);

        assert_eq!(run.main.len(), 2);
        assert_eq!(run.main[1].start_time, 29.0);
        assert_eq!(run.main[1].end_time, 58.0);
        assert_eq!(run.main[1].file_index, 1);
        assert_eq!(run.main[1].filename, "b.txt");
    }

    #[test]
    fn test_early_stop_skips_remaining_files() {
        let aggregator = IntervalAggregator::new(&config(0.0, 2));
        let files: Vec<(String, FileData)> = (0..4)
            .map(|i| (format!("f{i}.txt"), file(60, 1.0)))
            .collect();
        let run = aggregator.run_data(files);

        assert!(run.stopped_early);
        assert_eq!(run.spans().len(), 1);
        assert_eq!(run.main.len(), 2);
    }

    #[test]
    fn test_early_stop_can_be_disabled() {
        let mut cfg = config(0.0, 2);
        cfg.early_stop = false;
        let aggregator = IntervalAggregator::new(&cfg);
        let files: Vec<(String, FileData)> = (0..4)
            .map(|i| (format!("f{i}.txt"), file(60, 1.0)))
            .collect();
        let run = aggregator.run_data(files);

        assert!(!run.stopped_early);
        assert_eq!(run.main.len(), 8);
    }

    /// Like `file`, with the main channel swinging by `amplitude`.
    fn scaled_file(count: usize, amplitude: f64) -> FileData {
        let mut data = file(count, 1.0);
        data.main = (0..count)
            .map(|i| if i % 2 == 0 { 10.0 } else { 10.0 + amplitude })
            .collect();
        data
    }

    #[test]
    fn test_early_stop_does_not_change_statistics() {
        // With a 30s warm-up the window fills on the second file's first
        // interval; its second interval is read but falls outside the window.
        let files: Vec<(String, FileData)> = (0..4)
            .map(|i| (format!("f{i}.txt"), scaled_file(60, 1.0 + i as f64)))
            .collect();

        let stopping = config(30.0, 2);
        let mut exhaustive = stopping.clone();
        exhaustive.early_stop = false;

        let stopped = IntervalAggregator::new(&stopping).run_data(files.clone());
        let full = IntervalAggregator::new(&exhaustive).run_data(files);
        assert!(stopped.stopped_early);
        assert_eq!(stopped.spans().len(), 2);
        assert_eq!(full.spans().len(), 4);

        let window = stopping.window;
        let expected = ChannelStatistics::compute(&full, &window);
        assert_eq!(ChannelStatistics::compute(&stopped, &window), expected);

        let main = expected.main.unwrap();
        assert_eq!(main.count, 2);
        assert_eq!(main.mean, 1.5);
        assert_eq!(main.max, 2.0);
    }

    #[test]
    fn test_warmup_intervals_do_not_count_toward_stop() {
        let aggregator = IntervalAggregator::new(&config(1800.0, 1));
        let files: Vec<(String, FileData)> = (0..3)
            .map(|i| (format!("f{i}.txt"), file(60, 1.0)))
            .collect();
        let run = aggregator.run_data(files);

        assert!(!run.stopped_early);
        assert_eq!(run.spans().len(), 3);
    }

    #[test]
    fn test_disabled_channel_is_ignored() {
        let mut cfg = config(0.0, 1);
        cfg.channels = ChannelConfig::from_csv("main");
        let aggregator = IntervalAggregator::new(&cfg);
        let run = aggregator.run_data(vec![
            ("a.txt".to_string(), file(30, 1.0)),
            ("b.txt".to_string(), file(30, 1.0)),
        ]);

        assert!(run.reference.is_empty());
        assert!(run.stopped_early);
        assert_eq!(run.main.len(), 1);
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let aggregator = IntervalAggregator::new(&config(0.0, 120));
        let run = aggregator.run(&["/nonexistent/one.txt", "/nonexistent/two.txt"]);

        assert!(run.main.is_empty());
        assert_eq!(run.warnings().len(), 2);
        assert_eq!(run.warnings()[1].filename, "two.txt");
        assert_eq!(run.log.files_skipped(), 2);
    }
}
