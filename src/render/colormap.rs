use plotters::style::{Color, HSLColor, RGBColor};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Colormap {
    /// Blue → cyan → green → yellow → red hue sweep.
    #[default]
    Jet,
    /// Diverging blue → white → red.
    RdBu,
    Grayscale,
}

impl Colormap {
    /// Color at `t` in `[0, 1]` (clamped).
    pub fn color(self, t: f64) -> RGBColor {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
        match self {
            Self::Jet => {
                let (r, g, b) = HSLColor((240.0 - 240.0 * t) / 360.0, 0.90, 0.50).rgb();
                RGBColor(r, g, b)
            }
            Self::RdBu => {
                const BLUE: (f64, f64, f64) = (33.0, 102.0, 172.0);
                const WHITE: (f64, f64, f64) = (247.0, 247.0, 247.0);
                const RED: (f64, f64, f64) = (178.0, 24.0, 43.0);
                let (from, to, s) = if t < 0.5 {
                    (BLUE, WHITE, t * 2.0)
                } else {
                    (WHITE, RED, (t - 0.5) * 2.0)
                };
                let mix = |a: f64, b: f64| (a + (b - a) * s).round() as u8;
                RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
            }
            Self::Grayscale => {
                let v = (255.0 * (1.0 - t)).round() as u8;
                RGBColor(v, v, v)
            }
        }
    }

    /// One color per band, sampled at band centres.
    pub fn band_colors(self, n_bands: usize) -> Vec<RGBColor> {
        (0..n_bands)
            .map(|i| self.color((i as f64 + 0.5) / n_bands as f64))
            .collect()
    }
}
