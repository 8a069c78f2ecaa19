use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::ColorScheme;
use crate::data::range::PlotRange;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Every user-tunable plotting option.
///
/// Missing keys in a settings file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    /// Energy window in eV.
    pub range: PlotRange,
    pub line_width: f32,
    /// Line colour in single-file mode (name or `#rrggbb`).
    pub line_color: String,
    pub show_fermi: bool,
    pub fermi_color: String,
    pub show_grid: bool,
    pub grid_alpha: f32,
    /// Export figure size in inches.
    pub figure_width: f32,
    pub figure_height: f32,
    pub dpi: u32,
    pub font_size: u32,
    pub title_font_size: u32,
    /// Colours of the comparison plot.
    pub color_scheme: ColorScheme,
    /// Fit the value axis to the in-range data.
    pub auto_scale: bool,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            range: PlotRange::default(),
            line_width: 2.0,
            line_color: "blue".to_string(),
            show_fermi: true,
            fermi_color: "red".to_string(),
            show_grid: true,
            grid_alpha: 0.3,
            figure_width: 12.0,
            figure_height: 8.0,
            dpi: 300,
            font_size: 12,
            title_font_size: 16,
            color_scheme: ColorScheme::Auto,
            auto_scale: true,
        }
    }
}

impl PlotSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SettingsError::Format {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let text = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Format {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, text).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Figure size in pixels at the configured DPI.
    pub fn pixel_size(&self) -> (u32, u32) {
        let px = |inches: f32| (inches * self.dpi as f32).round().max(1.0) as u32;
        (px(self.figure_width), px(self.figure_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_uses_defaults() {
        let settings: PlotSettings =
            serde_json::from_str(r#"{"line_color": "black", "color_scheme": "viridis"}"#).unwrap();
        assert_eq!(settings.line_color, "black");
        assert_eq!(settings.color_scheme, ColorScheme::Viridis);
        assert_eq!(settings.dpi, 300);
        assert_eq!(settings.range, PlotRange::default());
    }

    #[test]
    fn inverted_range_in_file_is_rejected() {
        let parsed =
            serde_json::from_str::<PlotSettings>(r#"{"range": {"min": 5.0, "max": -5.0}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn pixel_size_follows_dpi() {
        let settings = PlotSettings {
            figure_width: 10.0,
            figure_height: 6.0,
            dpi: 100,
            ..PlotSettings::default()
        };
        assert_eq!(settings.pixel_size(), (1000, 600));
    }
}
