//! render/surface.rs — Drawing capability used by the orchestrator, and its backends.
//!
//! All coordinates are in head space (unit scalp disk). [`DisplayList`] records the
//! calls; [`BitmapSurface`] records and then rasterizes them to a PNG with plotters.

use std::error::Error;
use std::fs::create_dir_all;
use std::path::PathBuf;

use plotters::prelude::*;
use tracing::info;

use crate::core::contour::Segment;
use crate::error::{TopoError, TopoResult};

/// Axis-aligned filled cell span of the contour image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilledRect {
    pub lower_left: (f64, f64),
    pub upper_right: (f64, f64),
    pub color: RGBColor,
}

/// 2D plotting primitives the topography recipe needs.
pub trait PlotSurface {
    fn filled_contour(&mut self, rects: &[FilledRect]) -> TopoResult<()>;
    fn isolines(&mut self, segments: &[Segment]) -> TopoResult<()>;
    fn scatter(&mut self, points: &[(f64, f64)], size: u32) -> TopoResult<()>;
    fn text_labels(&mut self, labels: &[(String, (f64, f64))], font_size: u32) -> TopoResult<()>;
    fn polyline(&mut self, points: &[(f64, f64)], width: u32) -> TopoResult<()>;
    fn colorbar(&mut self, levels: &[f64], colors: &[RGBColor]) -> TopoResult<()>;
    /// Flush the figure (write the file for file-backed surfaces).
    fn finish(&mut self) -> TopoResult<()>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    FilledContour(Vec<FilledRect>),
    Isolines(Vec<Segment>),
    Scatter {
        points: Vec<(f64, f64)>,
        size: u32,
    },
    TextLabels {
        labels: Vec<(String, (f64, f64))>,
        font_size: u32,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        width: u32,
    },
    Colorbar {
        levels: Vec<f64>,
        colors: Vec<RGBColor>,
    },
}

impl DrawOp {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FilledContour(_) => "filled_contour",
            Self::Isolines(_) => "isolines",
            Self::Scatter { .. } => "scatter",
            Self::TextLabels { .. } => "text_labels",
            Self::Polyline { .. } => "polyline",
            Self::Colorbar { .. } => "colorbar",
        }
    }
}

/// In-memory surface: keeps the draw calls in order.
#[derive(Clone, Debug, Default)]
pub struct DisplayList {
    pub ops: Vec<DrawOp>,
    pub finished: bool,
}

impl DisplayList {
    pub fn kinds(&self) -> Vec<&'static str> {
        self.ops.iter().map(DrawOp::kind).collect()
    }
}

impl PlotSurface for DisplayList {
    fn filled_contour(&mut self, rects: &[FilledRect]) -> TopoResult<()> {
        self.ops.push(DrawOp::FilledContour(rects.to_vec()));
        Ok(())
    }

    fn isolines(&mut self, segments: &[Segment]) -> TopoResult<()> {
        self.ops.push(DrawOp::Isolines(segments.to_vec()));
        Ok(())
    }

    fn scatter(&mut self, points: &[(f64, f64)], size: u32) -> TopoResult<()> {
        self.ops.push(DrawOp::Scatter {
            points: points.to_vec(),
            size,
        });
        Ok(())
    }

    fn text_labels(&mut self, labels: &[(String, (f64, f64))], font_size: u32) -> TopoResult<()> {
        self.ops.push(DrawOp::TextLabels {
            labels: labels.to_vec(),
            font_size,
        });
        Ok(())
    }

    fn polyline(&mut self, points: &[(f64, f64)], width: u32) -> TopoResult<()> {
        self.ops.push(DrawOp::Polyline {
            points: points.to_vec(),
            width,
        });
        Ok(())
    }

    fn colorbar(&mut self, levels: &[f64], colors: &[RGBColor]) -> TopoResult<()> {
        self.ops.push(DrawOp::Colorbar {
            levels: levels.to_vec(),
            colors: colors.to_vec(),
        });
        Ok(())
    }

    fn finish(&mut self) -> TopoResult<()> {
        self.finished = true;
        Ok(())
    }
}

const COLORBAR_WIDTH: u32 = 150;
const LABEL_OFFSET: f64 = 0.035;

/// PNG output via plotters' bitmap backend.
pub struct BitmapSurface {
    path: PathBuf,
    size: (u32, u32),
    view_half_width: f64,
    list: DisplayList,
}

impl BitmapSurface {
    pub fn new(path: impl Into<PathBuf>, size: (u32, u32), view_half_width: f64) -> Self {
        Self {
            path: path.into(),
            size,
            view_half_width,
            list: DisplayList::default(),
        }
    }

    fn rasterize(&self) -> Result<(), Box<dyn Error>> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }

        let (width, height) = self.size;
        let root = BitMapBackend::new(&self.path, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let colorbar = self.list.ops.iter().find_map(|op| match op {
            DrawOp::Colorbar { levels, colors } => Some((levels, colors)),
            _ => None,
        });
        let (head_area, bar_area) = match colorbar {
            Some(_) if width > 2 * COLORBAR_WIDTH => {
                let (left, right) = root.split_horizontally(width - COLORBAR_WIDTH);
                (left, Some(right))
            }
            _ => (root.clone(), None),
        };

        // Square plotting region so the head stays circular.
        let (pw, ph) = head_area.dim_in_pixel();
        let side = pw.min(ph);
        let head_area = head_area.shrink(((pw - side) / 2, (ph - side) / 2), (side, side));

        let v = self.view_half_width;
        let mut chart = ChartBuilder::on(&head_area)
            .margin(10)
            .build_cartesian_2d(-v..v, -v..v)?;

        for op in &self.list.ops {
            match op {
                DrawOp::FilledContour(rects) => {
                    chart.draw_series(rects.iter().map(|r| {
                        Rectangle::new([r.lower_left, r.upper_right], r.color.filled())
                    }))?;
                }
                DrawOp::Isolines(segments) => {
                    chart.draw_series(
                        segments
                            .iter()
                            .map(|s| PathElement::new(vec![s.start, s.end], BLACK.mix(0.4))),
                    )?;
                }
                DrawOp::Scatter { points, size } => {
                    chart.draw_series(
                        points
                            .iter()
                            .map(|&p| Circle::new(p, *size, BLACK.filled())),
                    )?;
                }
                DrawOp::TextLabels { labels, font_size } => {
                    chart.draw_series(labels.iter().map(|(text, (x, y))| {
                        Text::new(
                            text.clone(),
                            (*x + LABEL_OFFSET, *y + LABEL_OFFSET),
                            ("sans-serif", *font_size).into_font(),
                        )
                    }))?;
                }
                DrawOp::Polyline { points, width } => {
                    chart.draw_series(std::iter::once(PathElement::new(
                        points.clone(),
                        BLACK.stroke_width(*width),
                    )))?;
                }
                DrawOp::Colorbar { .. } => {}
            }
        }

        if let (Some(bar_area), Some((levels, colors))) = (bar_area, colorbar) {
            let lo = levels[0];
            let hi = levels[levels.len() - 1];
            let mut bar = ChartBuilder::on(&bar_area)
                .margin(30)
                .y_label_area_size(70)
                .build_cartesian_2d(0.0f64..1.0f64, lo..hi)?;
            bar.configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .disable_x_axis()
                .y_labels(6)
                .y_label_formatter(&|y| format!("{:.2}", y))
                .draw()?;
            bar.draw_series(levels.windows(2).zip(colors.iter()).map(|(w, color)| {
                Rectangle::new([(0.0, w[0]), (1.0, w[1])], color.filled())
            }))?;
        }

        root.present()?;
        Ok(())
    }
}

impl PlotSurface for BitmapSurface {
    fn filled_contour(&mut self, rects: &[FilledRect]) -> TopoResult<()> {
        self.list.filled_contour(rects)
    }

    fn isolines(&mut self, segments: &[Segment]) -> TopoResult<()> {
        self.list.isolines(segments)
    }

    fn scatter(&mut self, points: &[(f64, f64)], size: u32) -> TopoResult<()> {
        self.list.scatter(points, size)
    }

    fn text_labels(&mut self, labels: &[(String, (f64, f64))], font_size: u32) -> TopoResult<()> {
        self.list.text_labels(labels, font_size)
    }

    fn polyline(&mut self, points: &[(f64, f64)], width: u32) -> TopoResult<()> {
        self.list.polyline(points, width)
    }

    fn colorbar(&mut self, levels: &[f64], colors: &[RGBColor]) -> TopoResult<()> {
        self.list.colorbar(levels, colors)
    }

    fn finish(&mut self) -> TopoResult<()> {
        self.rasterize()
            .map_err(|e| TopoError::Render(format!("{}: {e}", self.path.display())))?;
        self.list.finished = true;
        info!("Saved topography to {}", self.path.display());
        Ok(())
    }
}
