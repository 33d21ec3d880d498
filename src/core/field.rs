//! core/field.rs — Scattered samples → regular grid, plus the scalp mask.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::triangulation::SiteTriangulation;
use crate::error::{TopoError, TopoResult};

/// One scattered sample (electrode or synthetic boundary point).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// Square sampling region centred on the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub half_width: f64,
}

impl Region {
    pub fn new(half_width: f64) -> Self {
        Self { half_width }
    }

    /// Sample coordinates along one axis, both edges included.
    pub fn axis(&self, resolution: usize) -> Vec<f64> {
        let lo = -self.half_width;
        let step = 2.0 * self.half_width / (resolution - 1) as f64;
        (0..resolution).map(|i| lo + i as f64 * step).collect()
    }
}

impl Default for Region {
    fn default() -> Self {
        Self { half_width: 1.0 }
    }
}

/// Regular grid of samples; `values[row * xs.len() + col]` lives at `(xs[col], ys[row])`.
/// `None` marks an undefined sample (outside the hull or masked).
#[derive(Clone, Debug)]
pub struct FieldGrid {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub values: Vec<Option<f64>>,
}

impl FieldGrid {
    pub fn empty(region: Region, resolution: usize) -> Self {
        let xs = region.axis(resolution);
        let ys = xs.clone();
        Self {
            values: vec![None; xs.len() * ys.len()],
            xs,
            ys,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.xs.len()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.ys.len()
    }

    #[inline]
    pub fn get(&self, col: usize, row: usize) -> Option<f64> {
        self.values[row * self.xs.len() + col]
    }

    /// Iterate `(x, y, value)` over every sample.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64, Option<f64>)> + '_ {
        let w = self.xs.len();
        self.values
            .iter()
            .enumerate()
            .map(move |(i, v)| (self.xs[i % w], self.ys[i / w], *v))
    }

    /// Min and max over defined samples.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Set every sample farther than `radius` from the origin to `None`.
    pub fn mask_outside(&mut self, radius: f64) {
        let w = self.xs.len();
        for (i, v) in self.values.iter_mut().enumerate() {
            let x = self.xs[i % w];
            let y = self.ys[i / w];
            if x.hypot(y) > radius {
                *v = None;
            }
        }
    }
}

/// Scattered-data interpolation backend.
///
/// Input: irregular samples, a square region and a per-axis resolution.
/// Output: a grid covering the region; values must reproduce the inputs at the
/// sample sites. Samples the method cannot reach are `None`.
pub trait ScatteredInterpolator {
    fn interpolate(
        &self,
        points: &[SamplePoint],
        region: Region,
        resolution: usize,
    ) -> TopoResult<FieldGrid>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum InterpolationMethod {
    #[default]
    Linear,
    Nearest,
}

impl InterpolationMethod {
    pub fn interpolator(self) -> Box<dyn ScatteredInterpolator> {
        match self {
            Self::Linear => Box::new(DelaunayLinear),
            Self::Nearest => Box::new(NearestNeighbor),
        }
    }
}

impl<T: ScatteredInterpolator + ?Sized> ScatteredInterpolator for Box<T> {
    fn interpolate(
        &self,
        points: &[SamplePoint],
        region: Region,
        resolution: usize,
    ) -> TopoResult<FieldGrid> {
        (**self).interpolate(points, region, resolution)
    }
}

/// Merge samples sharing a coordinate, averaging their values. First-seen order is kept.
pub fn merge_coincident(points: &[SamplePoint]) -> Vec<SamplePoint> {
    const TOL: f64 = 1e-9;
    let mut merged: Vec<(SamplePoint, usize)> = Vec::with_capacity(points.len());
    for p in points {
        match merged
            .iter_mut()
            .find(|(q, _)| (q.x - p.x).abs() < TOL && (q.y - p.y).abs() < TOL)
        {
            Some((q, count)) => {
                q.value += p.value;
                *count += 1;
            }
            None => merged.push((*p, 1)),
        }
    }
    merged
        .into_iter()
        .map(|(mut q, count)| {
            q.value /= count as f64;
            q
        })
        .collect()
}

fn check_resolution(resolution: usize) -> TopoResult<()> {
    if resolution < 2 {
        return Err(TopoError::InvalidGridSize(resolution));
    }
    Ok(())
}

/// Piecewise-linear interpolation over the Delaunay triangulation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelaunayLinear;

impl ScatteredInterpolator for DelaunayLinear {
    fn interpolate(
        &self,
        points: &[SamplePoint],
        region: Region,
        resolution: usize,
    ) -> TopoResult<FieldGrid> {
        check_resolution(resolution)?;
        let points = merge_coincident(points);
        let tri = SiteTriangulation::new(&points)?;
        debug!(
            n_points = tri.n_vertices(),
            n_triangles = tri.n_triangles(),
            "delaunay triangulation"
        );

        let linear = tri.linear();
        let mut grid = FieldGrid::empty(region, resolution);
        for row in 0..resolution {
            let y = grid.ys[row];
            for col in 0..resolution {
                grid.values[row * resolution + col] = linear(grid.xs[col], y);
            }
        }
        Ok(grid)
    }
}

/// Value of the closest sample; exact at sample sites, piecewise constant elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighbor;

impl ScatteredInterpolator for NearestNeighbor {
    fn interpolate(
        &self,
        points: &[SamplePoint],
        region: Region,
        resolution: usize,
    ) -> TopoResult<FieldGrid> {
        check_resolution(resolution)?;
        if points.is_empty() {
            return Err(TopoError::Interpolation("no samples".into()));
        }
        let points = merge_coincident(points);
        let mut grid = FieldGrid::empty(region, resolution);
        for row in 0..resolution {
            let y = grid.ys[row];
            for col in 0..resolution {
                let x = grid.xs[col];
                let nearest = points
                    .iter()
                    .min_by(|p, q| {
                        let dp = (p.x - x).powi(2) + (p.y - y).powi(2);
                        let dq = (q.x - x).powi(2) + (q.y - y).powi(2);
                        dp.total_cmp(&dq)
                    })
                    .map(|p| p.value);
                grid.values[row * resolution + col] = nearest;
            }
        }
        Ok(grid)
    }
}

/// Interpolate over `region` and mask everything beyond `mask_radius`.
pub fn interpolate_masked<I: ScatteredInterpolator + ?Sized>(
    interpolator: &I,
    points: &[SamplePoint],
    region: Region,
    resolution: usize,
    mask_radius: f64,
) -> TopoResult<FieldGrid> {
    let mut grid = interpolator.interpolate(points, region, resolution)?;
    grid.mask_outside(mask_radius);
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sp(x: f64, y: f64, value: f64) -> SamplePoint {
        SamplePoint { x, y, value }
    }

    fn plane(x: f64, y: f64) -> f64 {
        0.5 + 2.0 * x - 3.0 * y
    }

    fn plane_samples() -> Vec<SamplePoint> {
        let mut pts = vec![sp(0.0, 0.0, plane(0.0, 0.0)), sp(0.3, -0.2, plane(0.3, -0.2))];
        for i in 0..8 {
            let a = std::f64::consts::TAU * i as f64 / 8.0;
            let (x, y) = (1.6 * a.cos(), 1.6 * a.sin());
            pts.push(sp(x, y, plane(x, y)));
        }
        pts
    }

    #[test]
    fn axis_includes_both_edges() {
        let xs = Region::new(1.0).axis(5);
        assert_eq!(xs.len(), 5);
        assert_relative_eq!(xs[0], -1.0);
        assert_relative_eq!(xs[2], 0.0);
        assert_relative_eq!(xs[4], 1.0);
    }

    #[test]
    fn linear_reproduces_a_plane() {
        let grid = DelaunayLinear
            .interpolate(&plane_samples(), Region::default(), 21)
            .unwrap();
        for (x, y, v) in grid.samples() {
            let v = v.expect("region lies inside the hull");
            assert_relative_eq!(v, plane(x, y), epsilon = 1e-9);
        }
    }

    #[test]
    fn linear_is_exact_at_sample_sites() {
        // Grid of 5 hits (0, 0) and (0.5, -0.5) exactly.
        let mut pts = plane_samples();
        pts.push(sp(0.5, -0.5, 42.0));
        let grid = DelaunayLinear.interpolate(&pts, Region::default(), 5).unwrap();
        assert_relative_eq!(grid.get(2, 2).unwrap(), plane(0.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(grid.get(3, 1).unwrap(), 42.0, epsilon = 1e-9);
    }

    #[test]
    fn outside_hull_is_undefined() {
        let pts = vec![sp(-0.2, -0.2, 1.0), sp(0.2, -0.2, 2.0), sp(0.0, 0.2, 3.0)];
        let grid = DelaunayLinear.interpolate(&pts, Region::default(), 11).unwrap();
        assert!(grid.get(0, 0).is_none());
        assert!(grid.get(5, 5).is_some());
    }

    #[test]
    fn degenerate_input_is_an_error() {
        let pts = vec![sp(0.0, 0.0, 1.0), sp(1.0, 0.0, 2.0)];
        assert!(matches!(
            DelaunayLinear.interpolate(&pts, Region::default(), 10),
            Err(TopoError::Interpolation(_))
        ));
        assert!(matches!(
            DelaunayLinear.interpolate(&plane_samples(), Region::default(), 1),
            Err(TopoError::InvalidGridSize(1))
        ));
    }

    #[test]
    fn nearest_picks_closest_sample() {
        let pts = vec![sp(-0.5, 0.0, 1.0), sp(0.5, 0.0, 2.0)];
        let grid = NearestNeighbor.interpolate(&pts, Region::default(), 3).unwrap();
        assert_eq!(grid.get(0, 1), Some(1.0));
        assert_eq!(grid.get(2, 1), Some(2.0));
        assert_eq!(grid.defined_count(), 9);
    }

    #[test]
    fn coincident_points_are_averaged() {
        let merged = merge_coincident(&[sp(0.1, 0.1, 1.0), sp(0.5, 0.5, 7.0), sp(0.1, 0.1, 3.0)]);
        assert_eq!(merged.len(), 2);
        assert_relative_eq!(merged[0].value, 2.0);
        assert_relative_eq!(merged[1].value, 7.0);
    }

    #[test]
    fn mask_clears_corners_only() {
        let grid = interpolate_masked(&DelaunayLinear, &plane_samples(), Region::default(), 11, 1.0)
            .unwrap();
        for (x, y, v) in grid.samples() {
            if x.hypot(y) > 1.0 {
                assert!(v.is_none(), "({x}, {y}) should be masked");
            } else {
                assert!(v.is_some(), "({x}, {y}) should carry a value");
            }
        }
        let (lo, hi) = grid.value_range().unwrap();
        assert!(lo < hi);
    }
}
