//! Partitioning of one file's samples into fixed-duration subsets.
//!
//! Subsets are sized from the file's own sample spacing so that each covers
//! roughly the configured duration. Sampling rates can differ between files,
//! so a segmenter is built per file and never reused across files.

use crate::loader::types::Sample;
use serde::{Deserialize, Serialize};

/// Subset size used when a file has too few samples to measure spacing.
pub const SMALL_FILE_SUBSET_SIZE: usize = 100;

/// Smallest subset that can form a hull.
pub const MIN_SUBSET_SIZE: usize = 3;

/// Spacing below this is treated as unmeasurable.
const MIN_SAMPLE_SPACING: f64 = 1e-9;

/// Spacing assumed when the measured one is unusable.
const FALLBACK_SAMPLE_SPACING: f64 = 0.15;

/// Round to two decimal places, ties to even.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

/// Number of samples per subset for a file with local times `times`.
pub fn subset_size(times: &[f64], subset_duration_secs: f64) -> usize {
    if times.len() < 2 {
        return SMALL_FILE_SUBSET_SIZE;
    }

    let spacing = (times[1] - times[0]).abs();
    let spacing = if spacing < MIN_SAMPLE_SPACING {
        FALLBACK_SAMPLE_SPACING
    } else {
        spacing
    };

    let size = (subset_duration_secs / spacing).floor();
    if size.is_finite() && size > MIN_SUBSET_SIZE as f64 {
        size as usize
    } else {
        MIN_SUBSET_SIZE
    }
}

/// One full-length subset of a file, coordinates rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subset {
    /// Position of the subset within its file
    pub index: usize,
    /// Rounded (local time, value) points
    pub points: Vec<Sample>,
}

impl Subset {
    /// Local time of the first point.
    pub fn start_time(&self) -> f64 {
        self.points.first().map(|p| p.time).unwrap_or(0.0)
    }

    /// Local time of the last point.
    pub fn end_time(&self) -> f64 {
        self.points.last().map(|p| p.time).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Splits one file's channel into contiguous subsets of equal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSegmenter {
    subset_size: usize,
}

impl WindowSegmenter {
    /// Create a segmenter sized for a file with local times `times`.
    pub fn for_file(times: &[f64], subset_duration_secs: f64) -> Self {
        Self {
            subset_size: subset_size(times, subset_duration_secs),
        }
    }

    /// Create a segmenter with an explicit subset size.
    pub fn with_size(subset_size: usize) -> Self {
        Self {
            subset_size: subset_size.max(1),
        }
    }

    pub fn subset_size(&self) -> usize {
        self.subset_size
    }

    /// Number of full subsets available in `len` samples.
    pub fn subset_count(&self, len: usize) -> usize {
        len / self.subset_size
    }

    /// Full-length subsets of `(times, values)`; a short trailing chunk is dropped.
    pub fn segments<'a>(
        &self,
        times: &'a [f64],
        values: &'a [f64],
    ) -> impl Iterator<Item = Subset> + 'a {
        let size = self.subset_size;
        times
            .chunks_exact(size)
            .zip(values.chunks_exact(size))
            .enumerate()
            .map(|(index, (ts, vs))| Subset {
                index,
                points: ts
                    .iter()
                    .zip(vs)
                    .map(|(&t, &v)| Sample::new(round2(t), round2(v)))
                    .collect(),
            })
    }
}
