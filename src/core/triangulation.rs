//! core/triangulation.rs — Delaunay triangulation of the sample sites, backed by spade.

use spade::{DelaunayTriangulation, FloatTriangulation, HasPosition, Point2, Triangulation};

use super::field::SamplePoint;
use crate::error::{TopoError, TopoResult};

/// A sample as a triangulation vertex.
#[derive(Clone, Copy, Debug)]
pub struct Site(pub SamplePoint);

impl HasPosition for Site {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        Point2::new(self.0.x, self.0.y)
    }
}

pub struct SiteTriangulation {
    inner: DelaunayTriangulation<Site>,
}

impl SiteTriangulation {
    /// Triangulate `points`. Fails on non-finite coordinates and when no triangle
    /// exists (fewer than three points, or all collinear).
    ///
    /// Duplicate coordinates should be merged by the caller; spade keeps one of them.
    pub fn new(points: &[SamplePoint]) -> TopoResult<Self> {
        let sites: Vec<Site> = points.iter().map(|&p| Site(p)).collect();
        let inner = DelaunayTriangulation::<Site>::bulk_load(sites)
            .map_err(|e| TopoError::Interpolation(format!("triangulation failed: {e:?}")))?;
        if inner.num_inner_faces() == 0 {
            return Err(TopoError::Interpolation(format!(
                "cannot triangulate {} points (need 3 non-collinear)",
                points.len()
            )));
        }
        Ok(Self { inner })
    }

    pub fn n_vertices(&self) -> usize {
        self.inner.num_vertices()
    }

    pub fn n_triangles(&self) -> usize {
        self.inner.num_inner_faces()
    }

    /// Piecewise-linear interpolant of the sample values; `None` outside the hull.
    pub fn linear(&self) -> impl Fn(f64, f64) -> Option<f64> + '_ {
        let barycentric = self.inner.barycentric();
        move |x, y| barycentric.interpolate(|v| v.data().0.value, Point2::new(x, y))
    }
}
