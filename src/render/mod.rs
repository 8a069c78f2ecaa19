/// Hand-off between the core and whatever draws the figure.
///
/// The core decides which points, which window and which style; a
/// [`Renderer`] turns a [`RenderRequest`] into pixels (the egui plot panel)
/// or a file (`file::FileRenderer`).

pub mod file;

use std::path::Path;

use eframe::egui::Color32;
use thiserror::Error;

use crate::color::{StyleAssigner, named_color};
use crate::data::filter::{InRange, filter_points_in_range};
use crate::data::range::{PlotRange, RangeError};
use crate::settings::PlotSettings;
use crate::state::{PlotMode, SeriesStore, StoreError};

/// Fraction of the value span added above and below when auto-scaling.
const Y_MARGIN: f64 = 0.05;

pub const X_LABEL: &str = "Energy (eV)";
pub const Y_LABEL: &str = "Density of States (states/eV)";
pub const FERMI_LABEL: &str = "Fermi Level";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    NotLoaded(#[from] StoreError),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error("unknown colour '{0}' (use a name such as blue/red/black or #rrggbb)")]
    UnknownColor(String),

    #[error("unsupported output format '{0}' (use .png or .svg)")]
    UnsupportedFormat(String),

    #[error("drawing failed: {0}")]
    Backend(String),
}

/// One line of the figure.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledSeries {
    pub label: String,
    pub color: Color32,
    /// In-range points only, ascending energy.
    pub points: Vec<(f64, f64)>,
}

/// Everything a renderer needs; all values finite and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub title: String,
    pub series: Vec<StyledSeries>,
    pub range: PlotRange,
    pub y_range: (f64, f64),
    /// Colour of the Fermi line, `None` when hidden.
    pub fermi: Option<Color32>,
    pub settings: PlotSettings,
}

impl RenderRequest {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

pub trait Renderer {
    type Output;

    fn render(&mut self, request: &RenderRequest) -> Result<Self::Output, RenderError>;
}

fn resolve_color(name: &str) -> Result<Color32, RenderError> {
    named_color(name).ok_or_else(|| RenderError::UnknownColor(name.to_string()))
}

/// Build the frame for the store's active mode and window.
///
/// Fails with [`StoreError::NotLoaded`] when the mode has no data and with
/// [`RangeError::EmptyResult`] when no point falls inside the window.
pub fn build_request(
    store: &SeriesStore,
    settings: &PlotSettings,
    assigner: &StyleAssigner,
) -> Result<RenderRequest, RenderError> {
    let active = store.active_series();
    if active.is_empty() {
        return Err(StoreError::NotLoaded(store.mode()).into());
    }
    let range = store.range();
    let views: Vec<InRange<'_>> = active
        .iter()
        .map(|s| filter_points_in_range(s, range))
        .collect();

    let (lo, hi) = views
        .iter()
        .filter_map(InRange::value_bounds)
        .reduce(|(lo, hi), (a, b)| (lo.min(a), hi.max(b)))
        .ok_or(RangeError::EmptyResult {
            min: range.min(),
            max: range.max(),
        })?;

    let (title, series) = match store.mode() {
        PlotMode::SingleFile => {
            let only = &views[0];
            let id = only.series().source_id();
            let name = Path::new(id)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| id.to_string());
            let styled = StyledSeries {
                label: "Total DOS".to_string(),
                color: resolve_color(&settings.line_color)?,
                points: only.iter().collect(),
            };
            (format!("Density of States - {name}"), vec![styled])
        }
        PlotMode::MultiFile => {
            let styled = views
                .iter()
                .enumerate()
                .map(|(i, view)| {
                    let style = assigner.assign(i, view.series().source_id());
                    StyledSeries {
                        label: style.label,
                        color: style.color,
                        points: view.iter().collect(),
                    }
                })
                .collect();
            ("Density of States Comparison".to_string(), styled)
        }
    };

    let fermi = if settings.show_fermi {
        Some(resolve_color(&settings.fermi_color)?)
    } else {
        None
    };

    Ok(RenderRequest {
        title,
        series,
        range,
        y_range: value_axis(lo, hi, settings.auto_scale),
        fermi,
        settings: settings.clone(),
    })
}

/// Value-axis limits for data spanning `lo..=hi`.
///
/// Auto-scale pads the span by 5%; otherwise the axis starts at zero (or
/// the lowest value if negative) and leaves the same headroom on top.
pub fn value_axis(lo: f64, hi: f64, auto_scale: bool) -> (f64, f64) {
    let span = hi - lo;
    if span <= f64::EPSILON {
        return (lo - 0.5, hi + 0.5);
    }
    let margin = span * Y_MARGIN;
    if auto_scale {
        (lo - margin, hi + margin)
    } else {
        (lo.min(0.0), hi + margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorScheme;
    use crate::data::parser::parse;
    use crate::data::range::validate;

    fn assigner() -> StyleAssigner {
        StyleAssigner::new(ColorScheme::Tab10, None)
    }

    #[test]
    fn empty_store_is_not_loaded() {
        let store = SeriesStore::new();
        let err = build_request(&store, &PlotSettings::default(), &assigner()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::NotLoaded(StoreError::NotLoaded(PlotMode::SingleFile))
        ));
    }

    #[test]
    fn single_mode_uses_line_color_and_window() {
        let mut store = SeriesStore::new();
        store.load_single(parse("calc/DOS0", "-3 1\n-1 2\n0 4\n1 3\n4 9\n").unwrap());
        store.set_range(validate(-2.0, 2.0).unwrap());

        let req = build_request(&store, &PlotSettings::default(), &assigner()).unwrap();
        assert_eq!(req.title, "Density of States - DOS0");
        assert_eq!(req.series.len(), 1);
        assert_eq!(req.series[0].label, "Total DOS");
        assert_eq!(req.series[0].color, named_color("blue").unwrap());
        assert_eq!(req.series[0].points, vec![(-1.0, 2.0), (0.0, 4.0), (1.0, 3.0)]);
        assert_eq!(req.fermi, named_color("red"));
        let (y0, y1) = req.y_range;
        assert!((y0 - 1.9).abs() < 1e-12 && (y1 - 4.1).abs() < 1e-12);
    }

    #[test]
    fn window_without_points_is_no_data_in_range() {
        let mut store = SeriesStore::new();
        store.load_single(parse("a", "-3 1\n50 1\n").unwrap());
        store.set_range(validate(100.0, 200.0).unwrap());
        let err = build_request(&store, &PlotSettings::default(), &assigner()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Range(RangeError::EmptyResult { min, max }) if min == 100.0 && max == 200.0
        ));
    }

    #[test]
    fn multi_mode_styles_every_file_in_order() {
        let mut store = SeriesStore::new();
        store.set_mode(PlotMode::MultiFile);
        store.add(parse("a.txt", "-5 1\n5 2\n").unwrap());
        store.add(parse("b.txt", "-8 3\n3 4\n").unwrap());
        store.add(parse("far.txt", "50 1\n").unwrap());
        store.set_range(validate(-10.0, 10.0).unwrap());

        let settings = PlotSettings {
            show_fermi: false,
            ..PlotSettings::default()
        };
        let req = build_request(&store, &settings, &assigner()).unwrap();
        let labels: Vec<_> = req.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["a.txt", "b.txt", "far.txt"]);
        assert_eq!(req.series[0].color, ColorScheme::Tab10.color(0));
        assert_eq!(req.series[1].color, ColorScheme::Tab10.color(1));
        assert!(req.series[2].points.is_empty());
        assert_eq!(req.point_count(), 4);
        assert_eq!(req.fermi, None);
    }

    #[test]
    fn unknown_line_color_is_reported() {
        let mut store = SeriesStore::new();
        store.load_single(parse("a", "0 1\n1 1\n").unwrap());
        store.set_range(validate(-1.0, 2.0).unwrap());
        let settings = PlotSettings {
            line_color: "octarine".to_string(),
            ..PlotSettings::default()
        };
        let err = build_request(&store, &settings, &assigner()).unwrap_err();
        assert!(matches!(err, RenderError::UnknownColor(c) if c == "octarine"));
    }

    #[test]
    fn value_axis_variants() {
        assert_eq!(value_axis(2.0, 2.0, true), (1.5, 2.5));
        assert_eq!(value_axis(0.0, 10.0, true), (-0.5, 10.5));
        assert_eq!(value_axis(1.0, 11.0, false), (0.0, 11.5));
    }
}
