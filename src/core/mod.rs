pub mod contour;
pub mod electrodes;
pub mod extrapolate;
pub mod field;
pub mod head;
pub mod triangulation;
