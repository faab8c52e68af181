//! Property tests for interval selection and the hull metric

use lamp_noise::core::windowing::round2;
use lamp_noise::core::{group_records, select_records};
use lamp_noise::{noise_metric, ChannelLabel, IntervalRecord, Sample, SelectionMode};
use proptest::prelude::*;

fn records(noise: &[f64]) -> Vec<IntervalRecord> {
    noise
        .iter()
        .enumerate()
        .map(|(i, &n)| IntervalRecord {
            start_time: i as f64 * 30.0,
            end_time: i as f64 * 30.0 + 29.0,
            noise_value: n,
            file_index: 0,
            channel: if i % 2 == 0 {
                ChannelLabel::Main
            } else {
                ChannelLabel::Reference
            },
            filename: "a.txt".to_string(),
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_raising_threshold_never_adds_records(
        noise in prop::collection::vec(0.0f64..5000.0, 0..60),
        low in 0.0f64..5000.0,
        delta in 0.0f64..5000.0,
    ) {
        let records = records(&noise);
        let candidates: Vec<&IntervalRecord> = records.iter().collect();
        let loose = select_records(candidates.clone(), SelectionMode::Threshold(low));
        let strict = select_records(candidates, SelectionMode::Threshold(low + delta));

        prop_assert!(strict.len() <= loose.len());
        for r in &strict {
            prop_assert!(loose.iter().any(|l| std::ptr::eq(*l, *r)));
        }
    }

    #[test]
    fn prop_top_k_returns_min_of_k_and_candidates(
        noise in prop::collection::vec(0.0f64..5000.0, 0..60),
        k in -5i64..80,
    ) {
        let records = records(&noise);
        let candidates: Vec<&IntervalRecord> = records.iter().collect();
        let selected = select_records(candidates, SelectionMode::TopK(k));

        let expected = if k <= 0 { 0 } else { (k as usize).min(noise.len()) };
        prop_assert_eq!(selected.len(), expected);
        for pair in selected.windows(2) {
            prop_assert!(pair[0].noise_value >= pair[1].noise_value);
        }
    }

    #[test]
    fn prop_groups_are_sorted_by_max_noise(
        noise in prop::collection::vec(0.0f64..5000.0, 0..60),
    ) {
        let records = records(&noise);
        let candidates: Vec<&IntervalRecord> = records.iter().collect();
        let selected = select_records(candidates, SelectionMode::Threshold(0.0));
        let groups = group_records(&selected);

        prop_assert_eq!(groups.len(), noise.len());
        for pair in groups.windows(2) {
            prop_assert!(pair[0].max_noise() >= pair[1].max_noise());
        }
    }

    #[test]
    fn prop_noise_metric_is_nonnegative(
        points in prop::collection::vec((0.0f64..100.0, -1000.0f64..1000.0), 0..40),
    ) {
        let samples: Vec<Sample> = points.iter().map(|&(t, v)| Sample::new(t, v)).collect();
        let noise = noise_metric(&samples);
        prop_assert!(noise >= 0.0);
        prop_assert!(noise.is_finite());
    }

    #[test]
    fn prop_rounded_straight_line_has_zero_noise(
        slope_centi in -5000i64..5000,
        intercept_centi in -100_000i64..100_000,
        count in 3usize..40,
    ) {
        let samples: Vec<Sample> = (0..count as i64)
            .map(|i| {
                let t = round2(0.1 * i as f64);
                let v = round2((slope_centi * i + intercept_centi) as f64 / 100.0);
                Sample::new(t, v)
            })
            .collect();
        prop_assert_eq!(noise_metric(&samples), 0.0);
    }
}

#[test]
fn test_top_zero_selects_nothing() {
    let records = records(&[5.0, 9.0, 1.0]);
    let candidates: Vec<&IntervalRecord> = records.iter().collect();
    assert!(select_records(candidates, SelectionMode::TopK(0)).is_empty());
}

#[test]
fn test_negative_threshold_keeps_everything() {
    let records = records(&[5.0, 0.0, 1.0]);
    let candidates: Vec<&IntervalRecord> = records.iter().collect();
    let selected = select_records(candidates, SelectionMode::Threshold(-1.0));
    assert_eq!(selected.len(), 3);
    assert_eq!(selected[0].noise_value, 5.0);
}
