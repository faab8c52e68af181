//! Builds one continuous two-channel timeline from consecutive data files.
//!
//! Each file's local time axis is shifted by the stitched time of the previous
//! file's last sample, so file B's first sample lands at `tA_last + tB_first`.

use crate::core::selector::IntervalGroup;
use crate::loader::reader::{read_data_file, FileData, LoadError};
use crate::loader::types::{Channel, ChannelLabel, FileSpan, Sample};
use std::path::Path;

/// Raw samples surrounding a high-noise interval group.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalContext {
    pub start: f64,
    pub end: f64,
    pub main: Vec<Sample>,
    pub reference: Vec<Sample>,
}

/// A file that has been read and placed on the stitched timeline.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub span: FileSpan,
    /// Local (unshifted) columns, used for per-file segmentation.
    pub data: FileData,
}

/// Owns the stitched channels and the running time offset for one run.
#[derive(Debug, Clone, Default)]
pub struct Stitcher {
    main: Channel,
    reference: Channel,
    spans: Vec<FileSpan>,
    time_offset: f64,
}

impl Stitcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `path` and append it to the timeline.
    ///
    /// On failure nothing is appended and the offset is unchanged.
    pub fn load(&mut self, index: usize, path: &Path) -> Result<LoadedFile, LoadError> {
        let data = read_data_file(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let span = self.push(index, filename, &data);
        Ok(LoadedFile { span, data })
    }

    /// Append already-parsed file data to the timeline.
    pub fn push(&mut self, index: usize, filename: String, data: &FileData) -> FileSpan {
        let offset = self.time_offset;
        let offset_times: Vec<f64> = data.times.iter().map(|t| t + offset).collect();

        self.main.extend(
            offset_times
                .iter()
                .zip(&data.main)
                .map(|(&t, &v)| Sample::new(t, v)),
        );
        self.reference.extend(
            offset_times
                .iter()
                .zip(&data.reference)
                .map(|(&t, &v)| Sample::new(t, v)),
        );

        if let Some(&last) = offset_times.last() {
            self.time_offset = last;
        }

        let span = FileSpan {
            filename,
            index,
            time_offset: offset,
            sample_count: data.len(),
        };
        self.spans.push(span.clone());
        span
    }

    /// Current offset that the next file's local times will be shifted by.
    pub fn time_offset(&self) -> f64 {
        self.time_offset
    }

    pub fn channel(&self, label: ChannelLabel) -> &Channel {
        match label {
            ChannelLabel::Main => &self.main,
            ChannelLabel::Reference => &self.reference,
        }
    }

    pub fn spans(&self) -> &[FileSpan] {
        &self.spans
    }

    /// Stitched samples around `group`, widened by `padding` seconds each side.
    pub fn context_for(&self, group: &IntervalGroup, padding: f64) -> IntervalContext {
        let start = group.start_time - padding;
        let end = group.end_time + padding;
        IntervalContext {
            start,
            end,
            main: self.main.slice(start, end),
            reference: self.reference.slice(start, end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(times: &[f64]) -> FileData {
        FileData {
            times: times.to_vec(),
            main: times.iter().map(|t| t * 10.0).collect(),
            reference: times.iter().map(|t| t * 20.0).collect(),
        }
    }

    #[test]
    fn test_second_file_starts_after_first() {
        let mut stitcher = Stitcher::new();
        let a = stitcher.push(0, "a.txt".into(), &file(&[0.0, 1.0, 2.5]));
        let b = stitcher.push(1, "b.txt".into(), &file(&[0.5, 1.5]));

        assert_eq!(a.time_offset, 0.0);
        assert_eq!(b.time_offset, 2.5);

        let main = stitcher.channel(ChannelLabel::Main);
        assert_eq!(main.len(), 5);
        assert_eq!(main.samples[3].time, 2.5 + 0.5);
        assert_eq!(main.samples[3].value, 5.0);
        assert_eq!(stitcher.time_offset(), 4.0);
    }

    #[test]
    fn test_channels_share_time_axis() {
        let mut stitcher = Stitcher::new();
        stitcher.push(0, "a.txt".into(), &file(&[0.0, 1.0]));
        let main = stitcher.channel(ChannelLabel::Main);
        let reference = stitcher.channel(ChannelLabel::Reference);
        assert_eq!(main.samples[1].time, reference.samples[1].time);
        assert_eq!(reference.samples[1].value, 20.0);
    }

    #[test]
    fn test_failed_load_leaves_offset() {
        let mut stitcher = Stitcher::new();
        stitcher.push(0, "a.txt".into(), &file(&[0.0, 3.0]));
        assert!(stitcher
            .load(1, Path::new("/nonexistent/missing.txt"))
            .is_err());
        assert_eq!(stitcher.time_offset(), 3.0);
        assert_eq!(stitcher.spans().len(), 1);
    }
}
