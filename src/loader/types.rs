//! Sample and channel types shared by the loader and the aggregation pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which intensity column a channel was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChannelLabel {
    /// Column 2 of the data file
    Main,
    /// Column 4 of the data file
    Reference,
}

impl ChannelLabel {
    /// Both channels in reporting order.
    pub const ALL: [ChannelLabel; 2] = [ChannelLabel::Main, ChannelLabel::Reference];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelLabel::Main => "Main",
            ChannelLabel::Reference => "Reference",
        }
    }
}

impl fmt::Display for ChannelLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single intensity reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Time in seconds
    pub time: f64,
    /// Measured intensity
    pub value: f64,
}

impl Sample {
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// An ordered sequence of samples for one channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub samples: Vec<Sample>,
}

impl Channel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append samples at the end of the channel.
    pub fn extend(&mut self, samples: impl IntoIterator<Item = Sample>) {
        self.samples.extend(samples);
    }

    /// Samples with `start <= time <= end`.
    ///
    /// The stitched timeline is only piecewise increasing, so this scans rather
    /// than bisects.
    pub fn slice(&self, start: f64, end: f64) -> Vec<Sample> {
        self.samples
            .iter()
            .filter(|s| s.time >= start && s.time <= end)
            .copied()
            .collect()
    }
}

/// Placement of one input file on the stitched timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSpan {
    /// File name without directory
    pub filename: String,
    /// Position of the file in the input list
    pub index: usize,
    /// Offset added to the file's local times
    pub time_offset: f64,
    /// Number of data rows read from the file
    pub sample_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_label_display() {
        assert_eq!(ChannelLabel::Main.to_string(), "Main");
        assert_eq!(ChannelLabel::Reference.to_string(), "Reference");
    }

    #[test]
    fn test_channel_slice_is_inclusive() {
        let mut channel = Channel::new();
        channel.extend((0..10).map(|i| Sample::new(i as f64, i as f64 * 2.0)));

        let slice = channel.slice(2.0, 4.0);
        assert_eq!(slice.len(), 3);
        assert_eq!(slice[0], Sample::new(2.0, 4.0));
        assert_eq!(slice[2], Sample::new(4.0, 8.0));
    }
}
