//! core/contour.rs — Contour levels, filled-band quantization, marching-squares isolines.

use super::field::FieldGrid;

/// `bands + 1` evenly spaced level edges spanning `[min, max]`.
/// A flat range is widened by ±0.5 so every band has positive width.
pub fn contour_levels(min: f64, max: f64, bands: usize) -> Vec<f64> {
    let bands = bands.max(1);
    let (lo, hi) = if (max - min).abs() < 1e-12 {
        (min - 0.5, max + 0.5)
    } else {
        (min.min(max), min.max(max))
    };
    let step = (hi - lo) / bands as f64;
    (0..=bands).map(|i| lo + i as f64 * step).collect()
}

/// Band that `value` falls in, `0..levels.len() - 1`. Values past either end clamp.
pub fn band_index(value: f64, levels: &[f64]) -> usize {
    let n_bands = levels.len().saturating_sub(1).max(1);
    let (lo, hi) = (levels[0], levels[levels.len() - 1]);
    if hi <= lo {
        return 0;
    }
    let t = (value - lo) / (hi - lo);
    ((t * n_bands as f64).floor().max(0.0) as usize).min(n_bands - 1)
}

/// Horizontal run of grid samples sharing one band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BandRun {
    pub row: usize,
    pub col_start: usize,
    /// Inclusive.
    pub col_end: usize,
    pub band: usize,
}

/// Run-length encode the banded grid row by row; undefined samples break runs.
pub fn band_runs(grid: &FieldGrid, levels: &[f64]) -> Vec<BandRun> {
    let mut runs = Vec::new();
    for row in 0..grid.height() {
        let mut current: Option<BandRun> = None;
        for col in 0..grid.width() {
            let band = grid.get(col, row).map(|v| band_index(v, levels));
            if let (Some(run), Some(b)) = (current.as_mut(), band) {
                if run.band == b {
                    run.col_end = col;
                    continue;
                }
            }
            if let Some(run) = current.take() {
                runs.push(run);
            }
            current = band.map(|band| BandRun {
                row,
                col_start: col,
                col_end: col,
                band,
            });
        }
        if let Some(run) = current {
            runs.push(run);
        }
    }
    runs
}

/// Isoline piece in data coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

fn lerp_edge(p1: (f64, f64), p2: (f64, f64), v1: f64, v2: f64, level: f64) -> (f64, f64) {
    if (v2 - v1).abs() < 1e-12 {
        return (0.5 * (p1.0 + p2.0), 0.5 * (p1.1 + p2.1));
    }
    let t = ((level - v1) / (v2 - v1)).clamp(0.0, 1.0);
    (p1.0 + t * (p2.0 - p1.0), p1.1 + t * (p2.1 - p1.1))
}

/// Marching squares at `level`. Cells with an undefined corner are skipped.
pub fn march_squares(grid: &FieldGrid, level: f64) -> Vec<Segment> {
    let (w, h) = (grid.width(), grid.height());
    let mut segments = Vec::new();
    if w < 2 || h < 2 {
        return segments;
    }

    for row in 0..h - 1 {
        for col in 0..w - 1 {
            // Corners: a = (col,row), b = (col+1,row), c = (col+1,row+1), d = (col,row+1)
            let (Some(va), Some(vb), Some(vc), Some(vd)) = (
                grid.get(col, row),
                grid.get(col + 1, row),
                grid.get(col + 1, row + 1),
                grid.get(col, row + 1),
            ) else {
                continue;
            };

            let mut case = 0u8;
            if va >= level {
                case |= 1;
            }
            if vb >= level {
                case |= 2;
            }
            if vc >= level {
                case |= 4;
            }
            if vd >= level {
                case |= 8;
            }
            if case == 0 || case == 15 {
                continue;
            }

            let pa = (grid.xs[col], grid.ys[row]);
            let pb = (grid.xs[col + 1], grid.ys[row]);
            let pc = (grid.xs[col + 1], grid.ys[row + 1]);
            let pd = (grid.xs[col], grid.ys[row + 1]);

            let ab = || lerp_edge(pa, pb, va, vb, level);
            let bc = || lerp_edge(pb, pc, vb, vc, level);
            let cd = || lerp_edge(pd, pc, vd, vc, level);
            let da = || lerp_edge(pa, pd, va, vd, level);
            let mut push = |start, end| segments.push(Segment { start, end });

            match case {
                1 | 14 => push(da(), ab()),
                2 | 13 => push(ab(), bc()),
                3 | 12 => push(da(), bc()),
                4 | 11 => push(bc(), cd()),
                6 | 9 => push(ab(), cd()),
                7 | 8 => push(da(), cd()),
                5 => {
                    push(da(), ab());
                    push(bc(), cd());
                }
                10 => {
                    push(ab(), bc());
                    push(da(), cd());
                }
                _ => {}
            }
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::Region;
    use approx::assert_relative_eq;

    #[test]
    fn levels_span_range() {
        let levels = contour_levels(-1.0, 3.0, 4);
        assert_eq!(levels, vec![-1.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn flat_range_is_widened() {
        let levels = contour_levels(2.0, 2.0, 2);
        assert_relative_eq!(levels[0], 1.5);
        assert_relative_eq!(levels[2], 2.5);
        assert_eq!(band_index(2.0, &levels), 1);
    }

    #[test]
    fn band_index_clamps() {
        let levels = contour_levels(0.0, 1.0, 4);
        assert_eq!(band_index(-5.0, &levels), 0);
        assert_eq!(band_index(0.0, &levels), 0);
        assert_eq!(band_index(0.3, &levels), 1);
        assert_eq!(band_index(1.0, &levels), 3);
        assert_eq!(band_index(9.0, &levels), 3);
    }

    fn ramp_grid(n: usize) -> FieldGrid {
        // value = x, over [-1, 1]^2
        let mut grid = FieldGrid::empty(Region::default(), n);
        for row in 0..n {
            for col in 0..n {
                grid.values[row * n + col] = Some(grid.xs[col]);
            }
        }
        grid
    }

    #[test]
    fn runs_break_on_band_and_gaps() {
        let mut grid = ramp_grid(5); // x = -1, -0.5, 0, 0.5, 1
        grid.values[2 * 5 + 2] = None;
        let levels = contour_levels(-1.0, 1.0, 2);
        let runs = band_runs(&grid, &levels);

        let row0: Vec<_> = runs.iter().filter(|r| r.row == 0).collect();
        assert_eq!(row0.len(), 2);
        assert_eq!((row0[0].col_start, row0[0].col_end, row0[0].band), (0, 1, 0));
        assert_eq!((row0[1].col_start, row0[1].col_end, row0[1].band), (2, 4, 1));

        let row2: Vec<_> = runs.iter().filter(|r| r.row == 2).collect();
        assert_eq!(row2.len(), 2, "gap at the centre splits the band-1 run: {row2:?}");
    }

    #[test]
    fn vertical_isoline_on_a_ramp() {
        let grid = ramp_grid(9);
        let segs = march_squares(&grid, 0.1);
        assert_eq!(segs.len(), 8, "one crossing per row of cells");
        for s in &segs {
            assert_relative_eq!(s.start.0, 0.1, epsilon = 1e-9);
            assert_relative_eq!(s.end.0, 0.1, epsilon = 1e-9);
        }
    }

    #[test]
    fn undefined_cells_produce_nothing() {
        let grid = FieldGrid::empty(Region::default(), 6);
        assert!(march_squares(&grid, 0.0).is_empty());
        assert!(band_runs(&grid, &contour_levels(0.0, 1.0, 3)).is_empty());
    }
}
