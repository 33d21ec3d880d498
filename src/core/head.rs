//! core/head.rs — Cosmetic head geometry: outline, nose, ears.

use std::f64::consts::{FRAC_PI_2, TAU};

pub const DEFAULT_NOSE_ANGLE_DEG: f64 = 10.0;
pub const DEFAULT_NOSE_TIP_FACTOR: f64 = 1.1;
pub const DEFAULT_EAR_POINTS: usize = 100;
pub const DEFAULT_EAR_WIDTH: f64 = 0.08;
pub const DEFAULT_EAR_HEIGHT: f64 = 0.2;

/// Closed circle of `radius`, `n_points` distinct vertices plus the repeated start.
pub fn head_outline(radius: f64, n_points: usize) -> Vec<(f64, f64)> {
    let n = n_points.max(3);
    (0..=n)
        .map(|i| {
            let theta = TAU * i as f64 / n as f64;
            (radius * theta.cos(), radius * theta.sin())
        })
        .collect()
}

/// One side of the nose: `[base, tip]`.
///
/// The base sits on the head circle at `90° + angle_offset_deg` (so ±10° gives the
/// right and left sides); the tip is on the midline at `radius * tip_factor`.
pub fn nose_side(angle_offset_deg: f64, radius: f64, tip_factor: f64) -> [(f64, f64); 2] {
    let theta = FRAC_PI_2 + angle_offset_deg.to_radians();
    [
        (radius * theta.cos(), radius * theta.sin()),
        (0.0, radius * tip_factor),
    ]
}

/// Ear outline: an ellipse centred at `(focus_x, 0)` with semi-axes `width` (x) and
/// `height` (y), sampled at `n_points`. Points inside the head circle are `None`, so
/// only the arc bulging outward is drawn.
pub fn ear_contour(
    focus_x: f64,
    radius: f64,
    n_points: usize,
    width: f64,
    height: f64,
) -> Vec<Option<(f64, f64)>> {
    if n_points == 0 {
        return Vec::new();
    }
    let denom = (n_points.max(2) - 1) as f64;
    (0..n_points)
        .map(|i| {
            let theta = TAU * i as f64 / denom;
            let x = focus_x + width * theta.cos();
            let y = height * theta.sin();
            if x.hypot(y) < radius {
                None
            } else {
                Some((x, y))
            }
        })
        .collect()
}

/// Split a gapped polyline into its contiguous pieces (pieces of one point are dropped).
pub fn polyline_pieces(points: &[Option<(f64, f64)>]) -> Vec<Vec<(f64, f64)>> {
    let mut pieces = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for p in points {
        match p {
            Some(p) => current.push(*p),
            None => {
                if current.len() > 1 {
                    pieces.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
        }
    }
    if current.len() > 1 {
        pieces.push(current);
    }
    pieces
}

/// Everything drawn around the field for one head radius.
#[derive(Clone, Debug)]
pub struct HeadGeometry {
    pub radius: f64,
    pub outline: Vec<(f64, f64)>,
    pub nose: [[(f64, f64); 2]; 2],
    pub left_ear: Vec<Option<(f64, f64)>>,
    pub right_ear: Vec<Option<(f64, f64)>>,
}

#[derive(Clone, Copy, Debug)]
pub struct HeadParams {
    pub nose_angle_deg: f64,
    pub nose_tip_factor: f64,
    pub ear_points: usize,
    /// Relative to the head radius.
    pub ear_width: f64,
    /// Relative to the head radius.
    pub ear_height: f64,
    pub outline_points: usize,
}

impl Default for HeadParams {
    fn default() -> Self {
        Self {
            nose_angle_deg: DEFAULT_NOSE_ANGLE_DEG,
            nose_tip_factor: DEFAULT_NOSE_TIP_FACTOR,
            ear_points: DEFAULT_EAR_POINTS,
            ear_width: DEFAULT_EAR_WIDTH,
            ear_height: DEFAULT_EAR_HEIGHT,
            outline_points: 360,
        }
    }
}

impl HeadGeometry {
    pub fn new(radius: f64, params: &HeadParams) -> Self {
        let ear = |focus_x: f64| {
            ear_contour(
                focus_x,
                radius,
                params.ear_points,
                params.ear_width * radius,
                params.ear_height * radius,
            )
        };
        Self {
            radius,
            outline: head_outline(radius, params.outline_points),
            nose: [
                nose_side(params.nose_angle_deg, radius, params.nose_tip_factor),
                nose_side(-params.nose_angle_deg, radius, params.nose_tip_factor),
            ],
            left_ear: ear(-radius),
            right_ear: ear(radius),
        }
    }
}
