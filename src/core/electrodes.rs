//! core/electrodes.rs — Standard 10-10 electrode positions in the plane.
//!
//! Positions come from an ideal spherical head (10-10 arc construction) projected
//! azimuthally from Cz. The Fpz–T7–Oz circumference lands on the unit circle; the
//! lower ring (Nz, T9, T10, Iz, ...) sits at radius 1.25.
//! Axes: +x toward the right ear, +y toward the nose.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::error::{TopoError, TopoResult};

/// Planar electrode coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// (label, x, y). T3/T4/T5/T6 are the legacy 10-20 names of T7/T8/P7/P8.
pub static ELECTRODES: &[(&str, f64, f64)] = &[
    ("Nz", 0.0000, 1.2500),
    ("Fp1", -0.3090, 0.9511),
    ("Fpz", 0.0000, 1.0000),
    ("Fp2", 0.3090, 0.9511),
    ("AF9", -0.7347, 1.0113),
    ("AF7", -0.5878, 0.8090),
    ("AF5", -0.4457, 0.7818),
    ("AF3", -0.2993, 0.7637),
    ("AF1", -0.1503, 0.7534),
    ("AFz", 0.0000, 0.7500),
    ("AF2", 0.1503, 0.7534),
    ("AF4", 0.2993, 0.7637),
    ("AF6", 0.4457, 0.7818),
    ("AF8", 0.5878, 0.8090),
    ("AF10", 0.7347, 1.0113),
    ("F9", -1.0113, 0.7347),
    ("F7", -0.8090, 0.5878),
    ("F5", -0.6129, 0.5460),
    ("F3", -0.4112, 0.5195),
    ("F1", -0.2063, 0.5047),
    ("Fz", 0.0000, 0.5000),
    ("F2", 0.2063, 0.5047),
    ("F4", 0.4112, 0.5195),
    ("F6", 0.6129, 0.5460),
    ("F8", 0.8090, 0.5878),
    ("F10", 1.0113, 0.7347),
    ("FT9", -1.1888, 0.3863),
    ("FT7", -0.9511, 0.3090),
    ("FC5", -0.7155, 0.2803),
    ("FC3", -0.4779, 0.2627),
    ("FC1", -0.2392, 0.2531),
    ("FCz", 0.0000, 0.2500),
    ("FC2", 0.2392, 0.2531),
    ("FC4", 0.4779, 0.2627),
    ("FC6", 0.7155, 0.2803),
    ("FT8", 0.9511, 0.3090),
    ("FT10", 1.1888, 0.3863),
    ("T9", -1.2500, 0.0000),
    ("T7", -1.0000, 0.0000),
    ("C5", -0.7500, 0.0000),
    ("C3", -0.5000, 0.0000),
    ("C1", -0.2500, 0.0000),
    ("Cz", 0.0000, 0.0000),
    ("C2", 0.2500, 0.0000),
    ("C4", 0.5000, 0.0000),
    ("C6", 0.7500, 0.0000),
    ("T8", 1.0000, 0.0000),
    ("T10", 1.2500, 0.0000),
    ("TP9", -1.1888, -0.3863),
    ("TP7", -0.9511, -0.3090),
    ("CP5", -0.7155, -0.2803),
    ("CP3", -0.4779, -0.2627),
    ("CP1", -0.2392, -0.2531),
    ("CPz", 0.0000, -0.2500),
    ("CP2", 0.2392, -0.2531),
    ("CP4", 0.4779, -0.2627),
    ("CP6", 0.7155, -0.2803),
    ("TP8", 0.9511, -0.3090),
    ("TP10", 1.1888, -0.3863),
    ("P9", -1.0113, -0.7347),
    ("P7", -0.8090, -0.5878),
    ("P5", -0.6129, -0.5460),
    ("P3", -0.4112, -0.5195),
    ("P1", -0.2063, -0.5047),
    ("Pz", 0.0000, -0.5000),
    ("P2", 0.2063, -0.5047),
    ("P4", 0.4112, -0.5195),
    ("P6", 0.6129, -0.5460),
    ("P8", 0.8090, -0.5878),
    ("P10", 1.0113, -0.7347),
    ("PO9", -0.7347, -1.0113),
    ("PO7", -0.5878, -0.8090),
    ("PO5", -0.4457, -0.7818),
    ("PO3", -0.2993, -0.7637),
    ("PO1", -0.1503, -0.7534),
    ("POz", 0.0000, -0.7500),
    ("PO2", 0.1503, -0.7534),
    ("PO4", 0.2993, -0.7637),
    ("PO6", 0.4457, -0.7818),
    ("PO8", 0.5878, -0.8090),
    ("PO10", 0.7347, -1.0113),
    ("O1", -0.3090, -0.9511),
    ("Oz", 0.0000, -1.0000),
    ("O2", 0.3090, -0.9511),
    ("I1", -0.3863, -1.1888),
    ("Iz", 0.0000, -1.2500),
    ("I2", 0.3863, -1.1888),
    ("T3", -1.0000, 0.0000),
    ("T4", 1.0000, 0.0000),
    ("T5", -0.8090, -0.5878),
    ("T6", 0.8090, -0.5878),
];

static BY_LABEL: LazyLock<HashMap<&'static str, Position>> = LazyLock::new(|| {
    ELECTRODES
        .iter()
        .map(|&(label, x, y)| (label, Position::new(x, y)))
        .collect()
});

/// Look up a label; exact match first, then ASCII case-insensitive.
pub fn lookup(label: &str) -> Option<Position> {
    if let Some(pos) = BY_LABEL.get(label) {
        return Some(*pos);
    }
    ELECTRODES
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(label))
        .map(|&(_, x, y)| Position::new(x, y))
}

/// Like [`lookup`], but an absent label is an error.
pub fn position(label: &str) -> TopoResult<Position> {
    lookup(label).ok_or_else(|| TopoError::UnknownElectrode(label.to_string()))
}

/// Resolve every label, failing on the first one missing from the table.
pub fn resolve_all<S: AsRef<str>>(labels: &[S]) -> TopoResult<Vec<Position>> {
    labels.iter().map(|l| position(l.as_ref())).collect()
}

/// All known labels in table order.
pub fn labels() -> impl Iterator<Item = &'static str> {
    ELECTRODES.iter().map(|(label, _, _)| *label)
}
