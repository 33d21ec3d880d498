//! core/extrapolate.rs — Synthetic edge support for the scalp interpolant.
//!
//! Rings the measured electrodes with `n` points on a circle outside the scalp disk,
//! each carrying the mean of its `k` nearest measured neighbours. Without them the
//! triangulation hull stops at the outermost electrodes and the field is undefined
//! (or wildly extrapolated) near the rim.

use std::f64::consts::TAU;

use super::field::SamplePoint;

pub const DEFAULT_BOUNDARY_POINTS: usize = 8;
pub const DEFAULT_BOUNDARY_RADIUS: f64 = 1.2;
pub const DEFAULT_NEAREST_K: usize = 4;

/// Position of the `i`-th of `n` synthetic points on a circle of `radius`.
/// Angle 0 is the +x axis; angles grow counter-clockwise in steps of `2π/n`.
#[inline]
pub fn ring_position(i: usize, n: usize, radius: f64) -> (f64, f64) {
    let theta = TAU * i as f64 / n as f64;
    (radius * theta.cos(), radius * theta.sin())
}

/// Mean value of the `k` points nearest to `(x, y)`.
///
/// Points are ranked by a stable sort on Euclidean distance, so ties keep input
/// order; `min(k, points.len())` entries are averaged. `None` for empty input.
pub fn nearest_k_mean(points: &[SamplePoint], x: f64, y: f64, k: usize) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    let mut ranked: Vec<(f64, f64)> = points
        .iter()
        .map(|p| ((p.x - x).hypot(p.y - y), p.value))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

    let take = k.max(1).min(ranked.len());
    let sum: f64 = ranked[..take].iter().map(|&(_, v)| v).sum();
    Some(sum / take as f64)
}

/// Append `n` boundary points on a circle of `radius` to `points`.
///
/// Returns the input points (in order) followed by the synthetic ones.
/// Empty input has nothing to average, so it comes back empty.
pub fn extrapolate_boundary(
    points: &[SamplePoint],
    n: usize,
    radius: f64,
    k: usize,
) -> Vec<SamplePoint> {
    let mut out = Vec::with_capacity(points.len() + n);
    out.extend_from_slice(points);
    if points.is_empty() {
        return out;
    }

    for i in 0..n {
        let (x, y) = ring_position(i, n, radius);
        if let Some(value) = nearest_k_mean(points, x, y, k) {
            out.push(SamplePoint { x, y, value });
        }
    }
    out
}

/// [`extrapolate_boundary`] with 8 points at radius 1.2 and k = 4.
pub fn extrapolate_boundary_default(points: &[SamplePoint]) -> Vec<SamplePoint> {
    extrapolate_boundary(
        points,
        DEFAULT_BOUNDARY_POINTS,
        DEFAULT_BOUNDARY_RADIUS,
        DEFAULT_NEAREST_K,
    )
}
