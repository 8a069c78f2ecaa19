use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::Series;

/// Window restored by "Reset" and used before any data is loaded.
pub const DEFAULT_ENERGY_MIN: f64 = -7.0;
pub const DEFAULT_ENERGY_MAX: f64 = 7.0;

/// Slider limits when no data drives them.
pub const DEFAULT_SLIDER_SPAN: (f64, f64) = (-20.0, 20.0);

/// Padding around the data when auto-detecting / zooming.
pub const AUTO_DETECT_SLIDER_PAD: f64 = 2.0;
pub const ZOOM_SLIDER_PAD: f64 = 1.0;

/// Half-width used when all loaded energies coincide.
const DEGENERATE_HALF_WIDTH: f64 = 0.5;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeFault {
    #[error("min and max must be finite numbers")]
    NotNumeric,
    #[error("min ({min}) must be less than max ({max})")]
    MinNotBelowMax { min: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeError {
    #[error("invalid energy range: {0}")]
    InvalidRange(RangeFault),

    /// A valid window that happens to contain no points.
    #[error("no data in range {min:.2} to {max:.2} eV")]
    EmptyResult { min: f64, max: f64 },
}

// ---------------------------------------------------------------------------
// PlotRange
// ---------------------------------------------------------------------------

/// A validated energy window; `min < max`, both finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRange", into = "RawRange")]
pub struct PlotRange {
    min: f64,
    max: f64,
}

#[derive(Serialize, Deserialize)]
struct RawRange {
    min: f64,
    max: f64,
}

impl TryFrom<RawRange> for PlotRange {
    type Error = RangeError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        validate(raw.min, raw.max)
    }
}

impl From<PlotRange> for RawRange {
    fn from(range: PlotRange) -> Self {
        RawRange {
            min: range.min,
            max: range.max,
        }
    }
}

impl PlotRange {
    pub fn new(min: f64, max: f64) -> Result<Self, RangeError> {
        validate(min, max)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, energy: f64) -> bool {
        self.min <= energy && energy <= self.max
    }

    /// The same window widened by `pad` on both sides.
    pub fn padded(&self, pad: f64) -> (f64, f64) {
        (self.min - pad, self.max + pad)
    }
}

impl Default for PlotRange {
    fn default() -> Self {
        PlotRange {
            min: DEFAULT_ENERGY_MIN,
            max: DEFAULT_ENERGY_MAX,
        }
    }
}

impl fmt::Display for PlotRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} to {:.2} eV", self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// Validation – every range entry point goes through here
// ---------------------------------------------------------------------------

/// Build a [`PlotRange`] or explain why the bounds are unusable.
pub fn validate(min: f64, max: f64) -> Result<PlotRange, RangeError> {
    if !min.is_finite() || !max.is_finite() {
        return Err(RangeError::InvalidRange(RangeFault::NotNumeric));
    }
    if min >= max {
        return Err(RangeError::InvalidRange(RangeFault::MinNotBelowMax { min, max }));
    }
    Ok(PlotRange { min, max })
}

/// Validate bounds typed as text (entry fields).
pub fn validate_text(min: &str, max: &str) -> Result<PlotRange, RangeError> {
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|_| RangeError::InvalidRange(RangeFault::NotNumeric))
    };
    validate(parse(min)?, parse(max)?)
}

// ---------------------------------------------------------------------------
// Detection from data
// ---------------------------------------------------------------------------

/// Auto-detected window spanning every energy of `series`.
///
/// In single-file mode the slice holds one series; in multi-file mode it
/// holds all of them and the result is the union of their spans. Returns
/// `None` for an empty slice. When every energy is identical the window is
/// widened to ±0.5 eV around that energy.
pub fn auto_detect(series: &[Series]) -> Option<PlotRange> {
    let (lo, hi) = series
        .iter()
        .map(Series::energy_bounds)
        .reduce(|(lo, hi), (a, b)| (lo.min(a), hi.max(b)))?;

    if lo < hi {
        Some(PlotRange { min: lo, max: hi })
    } else {
        Some(PlotRange {
            min: lo - DEGENERATE_HALF_WIDTH,
            max: hi + DEGENERATE_HALF_WIDTH,
        })
    }
}

/// "Zoom to data": the data's own bounds, whatever window is configured now.
pub fn clamp_to_data(series: &[Series]) -> Option<PlotRange> {
    auto_detect(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parser::parse;

    fn series_with(id: &str, energies: &[f64]) -> Series {
        let text: String = energies.iter().map(|e| format!("{e} 1.0\n")).collect();
        parse(id, &text).unwrap()
    }

    #[test]
    fn validate_accepts_only_ordered_finite_bounds() {
        assert!(validate(-1.0, 1.0).is_ok());
        assert_eq!(
            validate(1.0, 1.0),
            Err(RangeError::InvalidRange(RangeFault::MinNotBelowMax {
                min: 1.0,
                max: 1.0
            }))
        );
        assert!(validate(2.0, 1.0).is_err());
        assert_eq!(
            validate(f64::NAN, 1.0),
            Err(RangeError::InvalidRange(RangeFault::NotNumeric))
        );
        assert!(validate(0.0, f64::INFINITY).is_err());
        assert!(validate(f64::NEG_INFINITY, 0.0).is_err());
    }

    #[test]
    fn validate_matches_ordering_over_a_grid() {
        let samples = [-1e6, -7.0, -0.5, 0.0, 0.5, 7.0, 1e6, f64::NAN, f64::INFINITY];
        for &a in &samples {
            for &b in &samples {
                let expected = a.is_finite() && b.is_finite() && a < b;
                assert_eq!(validate(a, b).is_ok(), expected, "validate({a}, {b})");
            }
        }
    }

    #[test]
    fn text_errors_match_numeric_errors() {
        assert_eq!(validate_text(" -2 ", "3").unwrap(), validate(-2.0, 3.0).unwrap());
        assert_eq!(validate_text("abc", "3"), validate(f64::NAN, 3.0));
        assert_eq!(validate_text("3", "3"), validate(3.0, 3.0));
    }

    #[test]
    fn auto_detect_single() {
        let s = series_with("a", &[-10.0, -5.0, 0.0, 3.0, 7.0]);
        let range = auto_detect(std::slice::from_ref(&s)).unwrap();
        assert_eq!((range.min(), range.max()), (-10.0, 7.0));
    }

    #[test]
    fn auto_detect_multi_is_union() {
        let a = series_with("a", &[-5.0, 5.0]);
        let b = series_with("b", &[-8.0, 3.0]);
        let range = auto_detect(&[a, b]).unwrap();
        assert_eq!((range.min(), range.max()), (-8.0, 5.0));
    }

    #[test]
    fn auto_detect_empty_and_degenerate() {
        assert!(auto_detect(&[]).is_none());
        let s = series_with("a", &[2.0, 2.0]);
        let range = clamp_to_data(&[s]).unwrap();
        assert_eq!((range.min(), range.max()), (1.5, 2.5));
    }

    #[test]
    fn serde_rejects_inverted_range() {
        let ok: PlotRange = serde_json::from_str(r#"{"min": -1.0, "max": 2.0}"#).unwrap();
        assert_eq!(ok, validate(-1.0, 2.0).unwrap());
        assert!(serde_json::from_str::<PlotRange>(r#"{"min": 3.0, "max": 2.0}"#).is_err());
    }
}
