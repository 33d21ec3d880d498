//! render — The fixed topography recipe: resolve → extrapolate → interpolate → draw.

pub mod colormap;
pub mod surface;

use std::path::{Path, PathBuf};

use plotters::style::RGBColor;
use tracing::debug;

use crate::config::{OutputConfig, StyleConfig, TopoConfig};
use crate::core::contour::{band_runs, contour_levels, march_squares};
use crate::core::electrodes::{self, Position};
use crate::core::extrapolate::extrapolate_boundary;
use crate::core::field::{interpolate_masked, FieldGrid, Region, SamplePoint, ScatteredInterpolator};
use crate::core::head::{polyline_pieces, HeadGeometry};
use crate::error::{TopoError, TopoResult};
use surface::{BitmapSurface, DisplayList, FilledRect, PlotSurface};

/// A resolved input electrode.
#[derive(Clone, Debug, PartialEq)]
pub struct ElectrodeSample {
    pub label: String,
    pub position: Position,
    pub value: f64,
}

/// Everything needed to draw one topography; the in-memory figure handle.
#[derive(Clone, Debug)]
pub struct TopoFigure {
    pub electrodes: Vec<ElectrodeSample>,
    /// Electrodes followed by the synthetic boundary ring.
    pub extended: Vec<SamplePoint>,
    /// Masked field; `None` outside the scalp disk.
    pub field: FieldGrid,
    pub levels: Vec<f64>,
    pub head: HeadGeometry,
    pub style: StyleConfig,
    pub output: OutputConfig,
    /// Where [`Topomap::render`] wrote the image, if it did.
    pub saved_to: Option<PathBuf>,
}

impl TopoFigure {
    pub fn band_colors(&self) -> Vec<RGBColor> {
        self.style
            .colormap
            .band_colors(self.levels.len().saturating_sub(1))
    }

    /// Filled-contour cells, one rectangle per same-band run of grid samples.
    pub fn contour_rects(&self) -> Vec<FilledRect> {
        let colors = self.band_colors();
        let grid = &self.field;
        let half_dx = if grid.width() > 1 {
            0.5 * (grid.xs[1] - grid.xs[0])
        } else {
            0.0
        };
        let half_dy = if grid.height() > 1 {
            0.5 * (grid.ys[1] - grid.ys[0])
        } else {
            0.0
        };
        band_runs(grid, &self.levels)
            .into_iter()
            .map(|run| FilledRect {
                lower_left: (grid.xs[run.col_start] - half_dx, grid.ys[run.row] - half_dy),
                upper_right: (grid.xs[run.col_end] + half_dx, grid.ys[run.row] + half_dy),
                color: colors[run.band],
            })
            .collect()
    }

    /// Issue the drawing sequence against `surface` and finish it.
    pub fn draw<S: PlotSurface + ?Sized>(&self, surface: &mut S) -> TopoResult<()> {
        let style = &self.style;
        surface.filled_contour(&self.contour_rects())?;

        if style.isolines {
            let segments: Vec<_> = self.levels[1..self.levels.len() - 1]
                .iter()
                .flat_map(|&level| march_squares(&self.field, level))
                .collect();
            surface.isolines(&segments)?;
        }

        let positions: Vec<(f64, f64)> = self
            .electrodes
            .iter()
            .map(|e| (e.position.x, e.position.y))
            .collect();
        surface.scatter(&positions, style.marker_size)?;

        if style.draw_labels {
            let labels: Vec<(String, (f64, f64))> = self
                .electrodes
                .iter()
                .map(|e| (e.label.clone(), (e.position.x, e.position.y)))
                .collect();
            surface.text_labels(&labels, style.label_font_size)?;
        }

        surface.polyline(&self.head.outline, style.line_width)?;
        for side in &self.head.nose {
            surface.polyline(side, style.line_width)?;
        }
        for ear in [&self.head.left_ear, &self.head.right_ear] {
            for piece in polyline_pieces(ear) {
                surface.polyline(&piece, style.line_width)?;
            }
        }

        if style.colorbar {
            surface.colorbar(&self.levels, &self.band_colors())?;
        }
        surface.finish()
    }

    /// Record the drawing sequence without rasterizing.
    pub fn display_list(&self) -> TopoResult<DisplayList> {
        let mut list = DisplayList::default();
        self.draw(&mut list)?;
        Ok(list)
    }

    /// Rasterize to `path` at the configured pixel size.
    pub fn save(&self, path: impl AsRef<Path>) -> TopoResult<()> {
        let mut surface = BitmapSurface::new(
            path.as_ref(),
            (self.output.width, self.output.height),
            self.style.view_half_width,
        );
        self.draw(&mut surface)
    }
}

/// Head outline radius: the largest x or y among the electrodes, or 1 if none is positive.
pub fn head_radius(positions: &[Position]) -> f64 {
    let max_x = positions.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let max_y = positions.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    let r = max_x.max(max_y);
    if r.is_finite() && r > 1e-9 { r } else { 1.0 }
}

/// Topography renderer with an injected configuration and interpolation backend.
pub struct Topomap<I = Box<dyn ScatteredInterpolator>> {
    config: TopoConfig,
    interpolator: I,
}

impl Topomap {
    /// Renderer using the interpolation method named in `config`.
    pub fn new(config: TopoConfig) -> TopoResult<Self> {
        let interpolator = config.interpolation.method.interpolator();
        Self::with_interpolator(config, interpolator)
    }
}

impl<I: ScatteredInterpolator> Topomap<I> {
    pub fn with_interpolator(config: TopoConfig, interpolator: I) -> TopoResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            interpolator,
        })
    }

    pub fn config(&self) -> &TopoConfig {
        &self.config
    }

    fn validate_inputs<S: AsRef<str>>(
        &self,
        labels: &[S],
        values: &[f64],
        grid_size: usize,
    ) -> TopoResult<Vec<ElectrodeSample>> {
        if labels.len() != values.len() {
            return Err(TopoError::LengthMismatch {
                labels: labels.len(),
                values: values.len(),
            });
        }
        if labels.is_empty() {
            return Err(TopoError::EmptyInput);
        }
        let positions = electrodes::resolve_all(labels)?;
        if let Some((label, &value)) = labels
            .iter()
            .zip(values)
            .find(|(_, v)| !v.is_finite())
        {
            return Err(TopoError::NonFiniteValue {
                label: label.as_ref().to_string(),
                value,
            });
        }
        if grid_size < 2 {
            return Err(TopoError::InvalidGridSize(grid_size));
        }

        Ok(labels
            .iter()
            .zip(positions)
            .zip(values)
            .map(|((label, position), &value)| ElectrodeSample {
                label: label.as_ref().to_string(),
                position,
                value,
            })
            .collect())
    }

    /// Validate, extrapolate, interpolate and lay out the figure without drawing it.
    /// `grid_size` overrides `interpolation.grid_size`.
    pub fn prepare<S: AsRef<str>>(
        &self,
        labels: &[S],
        values: &[f64],
        grid_size: Option<usize>,
    ) -> TopoResult<TopoFigure> {
        let interp = &self.config.interpolation;
        let grid_size = grid_size.unwrap_or(interp.grid_size);
        let electrodes = self.validate_inputs(labels, values, grid_size)?;
        debug!(n = electrodes.len(), grid_size, "resolved electrodes");

        let positions: Vec<Position> = electrodes.iter().map(|e| e.position).collect();
        let radius = head_radius(&positions);

        let samples: Vec<SamplePoint> = electrodes
            .iter()
            .map(|e| SamplePoint {
                x: e.position.x,
                y: e.position.y,
                value: e.value,
            })
            .collect();
        let extended = extrapolate_boundary(
            &samples,
            interp.boundary_points,
            interp.boundary_radius,
            interp.nearest_k,
        );
        debug!(n_extended = extended.len(), head_radius = radius, "boundary extrapolation");

        let field = interpolate_masked(
            &self.interpolator,
            &extended,
            Region::new(interp.region_half_width),
            grid_size,
            interp.mask_radius,
        )?;
        let (lo, hi) = field
            .value_range()
            .ok_or_else(|| TopoError::Interpolation("field has no defined samples".into()))?;
        debug!(defined = field.defined_count(), lo, hi, "masked field");

        Ok(TopoFigure {
            electrodes,
            extended,
            levels: contour_levels(lo, hi, self.config.style.bands),
            field,
            head: HeadGeometry::new(radius, &self.config.head.params()),
            style: self.config.style.clone(),
            output: self.config.output.clone(),
            saved_to: None,
        })
    }

    /// [`prepare`](Self::prepare), then write the image to `output.path`.
    pub fn render<S: AsRef<str>>(
        &self,
        labels: &[S],
        values: &[f64],
        grid_size: Option<usize>,
    ) -> TopoResult<TopoFigure> {
        let mut figure = self.prepare(labels, values, grid_size)?;
        let path = self.config.output.path.clone();
        figure.save(&path)?;
        figure.saved_to = Some(path);
        Ok(figure)
    }
}

/// Render with the default configuration, writing `figure.png` to the working directory.
pub fn render_topography<S: AsRef<str>>(
    labels: &[S],
    values: &[f64],
    grid_size: Option<usize>,
) -> TopoResult<TopoFigure> {
    Topomap::new(TopoConfig::default())?.render(labels, values, grid_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::NearestNeighbor;
    use approx::assert_relative_eq;

    fn quiet_config() -> TopoConfig {
        let mut cfg = TopoConfig::default();
        cfg.interpolation.grid_size = 41;
        cfg
    }

    #[test]
    fn head_radius_uses_max_coordinate() {
        let r = head_radius(&[Position::new(0.3, 0.95), Position::new(-0.3, 0.95)]);
        assert_relative_eq!(r, 0.95);
        assert_relative_eq!(head_radius(&[Position::new(0.0, 0.0)]), 1.0);
        assert_relative_eq!(head_radius(&[Position::new(-0.5, -0.5)]), 1.0);
    }

    #[test]
    fn draw_sequence_is_fixed() {
        let topo = Topomap::new(quiet_config()).unwrap();
        let fig = topo
            .prepare(&["Fpz", "Fp1", "Fp2"], &[0.1, 0.5, 0.9], None)
            .unwrap();
        let list = fig.display_list().unwrap();
        assert!(list.finished);

        let kinds = list.kinds();
        assert_eq!(kinds[0], "filled_contour");
        assert_eq!(kinds[1], "scatter");
        assert_eq!(kinds[2], "text_labels");
        assert_eq!(kinds[3], "polyline", "head outline");
        assert_eq!(kinds.last(), Some(&"colorbar"));
        // outline + two nose sides + at least one piece per ear
        assert!(kinds.iter().filter(|k| **k == "polyline").count() >= 5);
        assert!(!kinds.contains(&"isolines"));
    }

    #[test]
    fn optional_layers_follow_style() {
        let mut cfg = quiet_config();
        cfg.style.draw_labels = false;
        cfg.style.colorbar = false;
        cfg.style.isolines = true;
        let fig = Topomap::new(cfg)
            .unwrap()
            .prepare(&["C3", "Cz", "C4", "Pz"], &[1.0, 2.0, 3.0, 4.0], None)
            .unwrap();
        let kinds = fig.display_list().unwrap().kinds();
        assert_eq!(kinds[1], "isolines");
        assert!(!kinds.contains(&"text_labels"));
        assert!(!kinds.contains(&"colorbar"));
    }

    #[test]
    fn markers_sit_on_electrodes() {
        let fig = Topomap::new(quiet_config())
            .unwrap()
            .prepare(&["Cz", "Oz"], &[0.0, 1.0], None)
            .unwrap();
        let list = fig.display_list().unwrap();
        let points = list
            .ops
            .iter()
            .find_map(|op| match op {
                surface::DrawOp::Scatter { points, .. } => Some(points.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(points, vec![(0.0, 0.0), (0.0, -1.0)]);
    }

    #[test]
    fn explicit_grid_size_overrides_config() {
        let fig = Topomap::new(quiet_config())
            .unwrap()
            .prepare(&["Cz", "Pz", "Fz"], &[1.0, 0.0, -1.0], Some(17))
            .unwrap();
        assert_eq!(fig.field.width(), 17);
        assert_eq!(fig.extended.len(), 3 + 8);
        assert_eq!(fig.levels.len(), fig.style.bands + 1);
    }

    #[test]
    fn injected_interpolator_is_used() {
        let fig = Topomap::with_interpolator(quiet_config(), NearestNeighbor)
            .unwrap()
            .prepare(&["T7", "T8"], &[-1.0, 1.0], Some(11))
            .unwrap();
        // Nearest-neighbour output only carries input (or boundary-mean) values.
        let (lo, hi) = fig.field.value_range().unwrap();
        assert_relative_eq!(lo, -1.0);
        assert_relative_eq!(hi, 1.0);
    }

    #[test]
    fn validation_errors() {
        let topo = Topomap::new(quiet_config()).unwrap();
        assert!(matches!(
            topo.prepare(&["Fpz", "Fp1", "Fp2"], &[0.1, 0.5], None),
            Err(TopoError::LengthMismatch { labels: 3, values: 2 })
        ));
        assert!(matches!(
            topo.prepare::<&str>(&[], &[], None),
            Err(TopoError::EmptyInput)
        ));
        assert!(matches!(
            topo.prepare(&["Cz", "ZZ9"], &[0.0, 1.0], None),
            Err(TopoError::UnknownElectrode(l)) if l == "ZZ9"
        ));
        assert!(matches!(
            topo.prepare(&["Cz", "Pz"], &[0.0, f64::NAN], None),
            Err(TopoError::NonFiniteValue { .. })
        ));
        assert!(matches!(
            topo.prepare(&["Cz", "Pz"], &[0.0, 1.0], Some(1)),
            Err(TopoError::InvalidGridSize(1))
        ));
    }
}
