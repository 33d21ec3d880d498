pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod render;

pub use config::TopoConfig;
pub use crate::core::electrodes::{lookup, Position};
pub use crate::core::field::{InterpolationMethod, SamplePoint, ScatteredInterpolator};
pub use error::{TopoError, TopoResult};
pub use render::{render_topography, TopoFigure, Topomap};
