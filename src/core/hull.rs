//! Drift-independent noise metric based on convex hull width.
//!
//! The noise of a subset is the thickness of the thinnest band, measured along
//! the intensity axis, that encloses all of its points. Each hull edge is tried
//! as the band direction (rotating calipers) and the smallest vertical extent
//! wins, so a linear trend in the data does not inflate the result.

use crate::loader::types::Sample;

/// Edges shorter than this use a scaled direction instead of a unit vector.
const MIN_EDGE_LENGTH: f64 = 1e-13;

/// Scale applied to degenerate edge directions.
const DEGENERATE_SCALE: f64 = 1e13;

/// Candidate width used when an edge is (nearly) vertical.
const VERTICAL_EDGE_WIDTH: f64 = 1e13;

/// Grid steps per unit used for orientation tests. Subsets are rounded to
/// hundredths before scoring, so this grid represents them exactly.
const GRID_SCALE: f64 = 100.0;

/// A sample together with its position on the hundredths grid.
type GridSample = ((i64, i64), Sample);

fn to_grid(p: Sample) -> GridSample {
    let t = (p.time * GRID_SCALE).round() as i64;
    let v = (p.value * GRID_SCALE).round() as i64;
    ((t, v), p)
}

/// Convex hull of `points` in counter-clockwise order.
///
/// Starts at the point with the smallest time (then smallest value). Turns are
/// decided in integer hundredths, so points that are collinear after rounding
/// to two decimals are never hull vertices. Returns fewer than three vertices
/// when all points are collinear.
pub fn convex_hull(points: &[Sample]) -> Vec<Sample> {
    let mut pts: Vec<GridSample> = points.iter().map(|&p| to_grid(p)).collect();
    pts.sort_by_key(|&(key, _)| key);
    pts.dedup_by_key(|&mut (key, _)| key);

    if pts.len() < 3 {
        return pts.into_iter().map(|(_, p)| p).collect();
    }

    let mut lower: Vec<GridSample> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2 && !turns_left(&lower, p) {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<GridSample> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && !turns_left(&upper, p) {
            upper.pop();
        }
        upper.push(p);
    }

    // Each chain ends where the other begins.
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower.into_iter().map(|(_, p)| p).collect()
}

/// Compute the noise value of a point subset.
///
/// Returns `0.0` for fewer than three points or when the hull is degenerate.
/// The closing edge from the last hull vertex back to the first is not
/// evaluated.
///
/// Each edge is rotated by `-theta` onto the time axis before the vertical
/// extent is measured. Older tooling rotated by `+theta`, so results can differ
/// from its numbers when a hull edge is sloped.
pub fn noise_metric(points: &[Sample]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let hull = convex_hull(points);
    if hull.len() < 3 {
        return 0.0;
    }

    hull.windows(2)
        .map(|edge| edge_width(&hull, edge[0], edge[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Vertical band width of `hull` when aligned with the edge `from -> to`.
fn edge_width(hull: &[Sample], from: Sample, to: Sample) -> f64 {
    let dx = to.time - from.time;
    let dy = to.value - from.value;
    let length = dx.hypot(dy);

    let (cos, sin) = if length < MIN_EDGE_LENGTH {
        (dx * DEGENERATE_SCALE, dy * DEGENERATE_SCALE)
    } else {
        (dx / length, dy / length)
    };

    // Rotate by -theta so the edge lies along the time axis.
    let (min_y, max_y) = hull
        .iter()
        .map(|p| -sin * p.time + cos * p.value)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
            (lo.min(y), hi.max(y))
        });
    let extent = max_y - min_y;

    let width = if cos.abs() > MIN_EDGE_LENGTH {
        extent / cos
    } else {
        VERTICAL_EDGE_WIDTH
    };
    width.abs()
}

/// Whether `p` makes a strict counter-clockwise turn after the last two
/// vertices of `chain`.
fn turns_left(chain: &[GridSample], p: GridSample) -> bool {
    let n = chain.len();
    cross(chain[n - 2].0, chain[n - 1].0, p.0) > 0
}

/// Z component of `(a - o) x (b - o)` on the grid; positive for a
/// counter-clockwise turn.
fn cross(o: (i64, i64), a: (i64, i64), b: (i64, i64)) -> i128 {
    let (ax, ay) = (a.0 as i128 - o.0 as i128, a.1 as i128 - o.1 as i128);
    let (bx, by) = (b.0 as i128 - o.0 as i128, b.1 as i128 - o.1 as i128);
    ax.saturating_mul(by).saturating_sub(ay.saturating_mul(bx))
}
