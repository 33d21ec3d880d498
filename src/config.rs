use crate::core::extrapolate::{DEFAULT_BOUNDARY_POINTS, DEFAULT_BOUNDARY_RADIUS, DEFAULT_NEAREST_K};
use crate::core::field::InterpolationMethod;
use crate::core::head::{
    HeadParams, DEFAULT_EAR_HEIGHT, DEFAULT_EAR_POINTS, DEFAULT_EAR_WIDTH, DEFAULT_NOSE_ANGLE_DEG,
    DEFAULT_NOSE_TIP_FACTOR,
};
use crate::error::{TopoError, TopoResult};
use crate::render::colormap::Colormap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_path")]
    pub path: PathBuf,
    #[serde(default = "OutputConfig::default_width")]
    pub width: u32,
    #[serde(default = "OutputConfig::default_height")]
    pub height: u32,
}

impl OutputConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("figure.png")
    }
    fn default_width() -> u32 {
        900
    }
    fn default_height() -> u32 {
        800
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            width: Self::default_width(),
            height: Self::default_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpolationConfig {
    #[serde(default = "InterpolationConfig::default_grid_size")]
    pub grid_size: usize,
    #[serde(default)]
    pub method: InterpolationMethod,
    #[serde(default = "InterpolationConfig::default_boundary_points")]
    pub boundary_points: usize,
    #[serde(default = "InterpolationConfig::default_boundary_radius")]
    pub boundary_radius: f64,
    #[serde(default = "InterpolationConfig::default_nearest_k")]
    pub nearest_k: usize,
    #[serde(default = "InterpolationConfig::default_region_half_width")]
    pub region_half_width: f64,
    #[serde(default = "InterpolationConfig::default_mask_radius")]
    pub mask_radius: f64,
}

impl InterpolationConfig {
    fn default_grid_size() -> usize {
        1000
    }
    fn default_boundary_points() -> usize {
        DEFAULT_BOUNDARY_POINTS
    }
    fn default_boundary_radius() -> f64 {
        DEFAULT_BOUNDARY_RADIUS
    }
    fn default_nearest_k() -> usize {
        DEFAULT_NEAREST_K
    }
    fn default_region_half_width() -> f64 {
        1.0
    }
    fn default_mask_radius() -> f64 {
        1.0
    }
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            grid_size: Self::default_grid_size(),
            method: InterpolationMethod::default(),
            boundary_points: Self::default_boundary_points(),
            boundary_radius: Self::default_boundary_radius(),
            nearest_k: Self::default_nearest_k(),
            region_half_width: Self::default_region_half_width(),
            mask_radius: Self::default_mask_radius(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadConfig {
    #[serde(default = "HeadConfig::default_nose_angle_deg")]
    pub nose_angle_deg: f64,
    #[serde(default = "HeadConfig::default_nose_tip_factor")]
    pub nose_tip_factor: f64,
    #[serde(default = "HeadConfig::default_ear_points")]
    pub ear_points: usize,
    #[serde(default = "HeadConfig::default_ear_width")]
    pub ear_width: f64,
    #[serde(default = "HeadConfig::default_ear_height")]
    pub ear_height: f64,
    #[serde(default = "HeadConfig::default_outline_points")]
    pub outline_points: usize,
}

impl HeadConfig {
    fn default_nose_angle_deg() -> f64 {
        DEFAULT_NOSE_ANGLE_DEG
    }
    fn default_nose_tip_factor() -> f64 {
        DEFAULT_NOSE_TIP_FACTOR
    }
    fn default_ear_points() -> usize {
        DEFAULT_EAR_POINTS
    }
    fn default_ear_width() -> f64 {
        DEFAULT_EAR_WIDTH
    }
    fn default_ear_height() -> f64 {
        DEFAULT_EAR_HEIGHT
    }
    fn default_outline_points() -> usize {
        360
    }

    pub fn params(&self) -> HeadParams {
        HeadParams {
            nose_angle_deg: self.nose_angle_deg,
            nose_tip_factor: self.nose_tip_factor,
            ear_points: self.ear_points,
            ear_width: self.ear_width,
            ear_height: self.ear_height,
            outline_points: self.outline_points,
        }
    }
}

impl Default for HeadConfig {
    fn default() -> Self {
        Self {
            nose_angle_deg: Self::default_nose_angle_deg(),
            nose_tip_factor: Self::default_nose_tip_factor(),
            ear_points: Self::default_ear_points(),
            ear_width: Self::default_ear_width(),
            ear_height: Self::default_ear_height(),
            outline_points: Self::default_outline_points(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    pub colormap: Colormap,
    #[serde(default = "StyleConfig::default_bands")]
    pub bands: usize,
    #[serde(default = "StyleConfig::default_marker_size")]
    pub marker_size: u32,
    #[serde(default = "StyleConfig::default_label_font_size")]
    pub label_font_size: u32,
    #[serde(default = "StyleConfig::default_line_width")]
    pub line_width: u32,
    #[serde(default = "StyleConfig::default_draw_labels")]
    pub draw_labels: bool,
    #[serde(default = "StyleConfig::default_colorbar")]
    pub colorbar: bool,
    #[serde(default)]
    pub isolines: bool,
    #[serde(default = "StyleConfig::default_view_half_width")]
    pub view_half_width: f64,
}

impl StyleConfig {
    fn default_bands() -> usize {
        12
    }
    fn default_marker_size() -> u32 {
        4
    }
    fn default_label_font_size() -> u32 {
        14
    }
    fn default_line_width() -> u32 {
        2
    }
    fn default_draw_labels() -> bool {
        true
    }
    fn default_colorbar() -> bool {
        true
    }
    fn default_view_half_width() -> f64 {
        1.35
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            colormap: Colormap::default(),
            bands: Self::default_bands(),
            marker_size: Self::default_marker_size(),
            label_font_size: Self::default_label_font_size(),
            line_width: Self::default_line_width(),
            draw_labels: Self::default_draw_labels(),
            colorbar: Self::default_colorbar(),
            isolines: false,
            view_half_width: Self::default_view_half_width(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TopoConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub interpolation: InterpolationConfig,
    #[serde(default)]
    pub head: HeadConfig,
    #[serde(default)]
    pub style: StyleConfig,
}

impl TopoConfig {
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output.path = path.into();
        self
    }

    pub fn validate(&self) -> TopoResult<()> {
        let interp = &self.interpolation;
        let head = &self.head;
        if interp.grid_size < 2 {
            return Err(TopoError::InvalidGridSize(interp.grid_size));
        }
        let checks = [
            (interp.boundary_points >= 3, "interpolation.boundary_points must be >= 3"),
            (interp.nearest_k >= 1, "interpolation.nearest_k must be >= 1"),
            (interp.boundary_radius > 0.0, "interpolation.boundary_radius must be > 0"),
            (interp.region_half_width > 0.0, "interpolation.region_half_width must be > 0"),
            (interp.mask_radius > 0.0, "interpolation.mask_radius must be > 0"),
            (self.style.bands >= 1, "style.bands must be >= 1"),
            (self.style.view_half_width > 0.0, "style.view_half_width must be > 0"),
            (self.output.width > 0 && self.output.height > 0, "output size must be non-zero"),
            (self.style.marker_size > 0, "style.marker_size must be > 0"),
            (self.style.label_font_size > 0, "style.label_font_size must be > 0"),
            (self.style.line_width > 0, "style.line_width must be > 0"),
            (
                head.nose_angle_deg > 0.0 && head.nose_angle_deg < 90.0,
                "head.nose_angle_deg must be in (0, 90)",
            ),
            (head.nose_tip_factor > 1.0, "head.nose_tip_factor must be > 1"),
            (head.ear_width > 0.0, "head.ear_width must be > 0"),
            (head.ear_height > 0.0, "head.ear_height must be > 0"),
            (head.ear_points >= 2, "head.ear_points must be >= 2"),
            (head.outline_points >= 3, "head.outline_points must be >= 3"),
        ];
        for (ok, msg) in checks {
            if !ok {
                return Err(TopoError::InvalidConfig(msg.to_string()));
            }
        }
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> TopoResult<Self> {
        let cfg: Self = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn format_f64_compact(x: f64) -> String {
        let mut s = format!("{:.6}", x);
        while s.contains('.') && s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
        if s.is_empty() { "0".to_string() } else { s }
    }

    /// Default config as TOML with every key commented out.
    pub fn commented_template() -> Option<String> {
        let text = toml::to_string_pretty(&Self::default()).ok()?;
        let mut commented = String::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                commented.push('\n');
            } else if trimmed.starts_with('[') && trimmed.ends_with(']') {
                commented.push_str(line);
                commented.push('\n');
            } else {
                let mut out_line = line.to_string();
                if let Some((lhs, rhs)) = line.split_once('=') {
                    let rhs_trim = rhs.trim();
                    let has_decimal = rhs_trim.contains('.');
                    if has_decimal && !rhs_trim.contains('"') {
                        if let Ok(val) = rhs_trim.parse::<f64>() {
                            let mut formatted = Self::format_f64_compact(val);
                            if !formatted.contains('.') {
                                formatted.push_str(".0");
                            }
                            out_line = format!("{} = {}", lhs.trim(), formatted);
                        }
                    }
                }
                commented.push_str("# ");
                commented.push_str(&out_line);
                commented.push('\n');
            }
        }
        Some(commented)
    }

    /// Read `path` if it exists. A missing file means defaults; unreadable or invalid
    /// files fall back to defaults with a warning. Never writes.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No config at {}; using defaults", path.display());
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(cfg) => return cfg,
                Err(err) => {
                    warn!("Failed to load config {}: {err}. Using defaults.", path.display());
                }
            },
            Err(err) => {
                warn!("Failed to read config {}: {err}. Using defaults.", path.display());
            }
        }
        Self::default()
    }

    /// Write the commented default template to `path`, replacing any existing file.
    pub fn write_template(path: impl AsRef<Path>) -> TopoResult<()> {
        let text = Self::commented_template()
            .ok_or_else(|| TopoError::InvalidConfig("cannot serialize default config".into()))?;
        fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn unique_path(name: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "topomap_config_test_{}_{}",
            name,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        p
    }

    #[test]
    fn missing_file_gives_defaults_without_writing() {
        let path = unique_path("missing.toml");
        let cfg = TopoConfig::load_or_default(&path);
        assert!(!path.exists(), "loading must not create the config file");
        assert_eq!(cfg.output.path, PathBuf::from("figure.png"));
        assert_eq!(cfg.interpolation.grid_size, 1000);
        assert_eq!(cfg.interpolation.boundary_points, 8);
        assert_eq!(cfg.interpolation.boundary_radius, 1.2);
        assert_eq!(cfg.interpolation.nearest_k, 4);
        assert_eq!(cfg.interpolation.method, InterpolationMethod::Linear);
        assert_eq!(cfg.head.ear_points, 100);
        assert!(!cfg.style.isolines);
    }

    #[test]
    fn write_template_round_trips_to_defaults() {
        let path = unique_path("template.toml");
        TopoConfig::write_template(&path).unwrap();

        let contents = fs::read_to_string(&path).expect("read written config");
        assert!(contents.contains("[interpolation]"));
        assert!(
            contents.contains("# boundary_radius = 1.2"),
            "should write commented boundary_radius:\n{contents}"
        );
        assert!(contents.contains("# grid_size = 1000"));
        assert!(contents.contains("# method = \"linear\""));

        // The commented template parses back to the defaults.
        let reread = TopoConfig::load_or_default(&path);
        assert_eq!(reread.interpolation.grid_size, 1000);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn load_or_default_reads_existing() {
        let path = unique_path("custom.toml");
        let mut custom = TopoConfig::default().with_output_path("out/topo.png");
        custom.interpolation.grid_size = 64;
        custom.interpolation.method = InterpolationMethod::Nearest;
        custom.style.colormap = Colormap::RdBu;
        custom.style.isolines = true;
        let text = toml::to_string_pretty(&custom).unwrap();
        fs::write(&path, text).unwrap();

        let cfg = TopoConfig::load_or_default(&path);
        assert_eq!(cfg.output.path, PathBuf::from("out/topo.png"));
        assert_eq!(cfg.interpolation.grid_size, 64);
        assert_eq!(cfg.interpolation.method, InterpolationMethod::Nearest);
        assert_eq!(cfg.style.colormap, Colormap::RdBu);
        assert!(cfg.style.isolines);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = TopoConfig::from_toml_str("[style]\nbands = 5\n").unwrap();
        assert_eq!(cfg.style.bands, 5);
        assert_eq!(cfg.style.marker_size, 4);
        assert_eq!(cfg.interpolation.grid_size, 1000);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            TopoConfig::from_toml_str("[interpolation]\ngrid_size = 1\n"),
            Err(TopoError::InvalidGridSize(1))
        ));
        assert!(matches!(
            TopoConfig::from_toml_str("[interpolation]\nboundary_points = 2\n"),
            Err(TopoError::InvalidConfig(_))
        ));
        for text in [
            "[head]\near_width = 0.0\n",
            "[head]\near_height = -0.2\n",
            "[head]\nnose_tip_factor = 0.9\n",
            "[head]\nnose_angle_deg = 0.0\n",
            "[head]\near_points = 1\n",
            "[head]\noutline_points = 2\n",
            "[style]\nmarker_size = 0\n",
            "[style]\nlabel_font_size = 0\n",
            "[style]\nline_width = 0\n",
        ] {
            assert!(
                matches!(TopoConfig::from_toml_str(text), Err(TopoError::InvalidConfig(_))),
                "accepted {text:?}"
            );
        }
        assert!(matches!(
            TopoConfig::from_toml_str("[style]\nbands = \"many\"\n"),
            Err(TopoError::ConfigParse(_))
        ));
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let path = unique_path("broken.toml");
        fs::write(&path, "[output\nwidth = ").unwrap();
        let cfg = TopoConfig::load_or_default(&path);
        assert_eq!(cfg.output.width, 900);
        let _ = fs::remove_file(&path);
    }
}
