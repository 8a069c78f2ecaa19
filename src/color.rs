use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};
use serde::{Deserialize, Serialize};

/// Labels longer than this are shortened with an ellipsis.
pub const MAX_LABEL_CHARS: usize = 50;
/// Characters kept from the end of a shortened label.
pub const LABEL_TAIL_CHARS: usize = 15;

/// 1/φ – successive multiples are maximally spread over [0, 1).
const GOLDEN_STEP: f32 = 0.618_034;

// Colour stops of the continuous maps, evenly spaced from 0 to 1.
const VIRIDIS: [u32; 9] = [
    0x440154, 0x472d7b, 0x3b528b, 0x2c728e, 0x21918c, 0x28ae80, 0x5ec962, 0xaddc30, 0xfde725,
];
const PLASMA: [u32; 10] = [
    0x0d0887, 0x46039f, 0x7201a8, 0x9c179e, 0xbd3786, 0xd8576b, 0xed7953, 0xfb9f3a, 0xfdca26,
    0xf0f921,
];
const TAB10: [u32; 10] = [
    0x1f77b4, 0xff7f0e, 0x2ca02c, 0xd62728, 0x9467bd, 0x8c564b, 0xe377c2, 0x7f7f7f, 0xbcbd22,
    0x17becf,
];

/// Names accepted for single-file line and Fermi line colours.
pub const NAMED_COLORS: [(&str, u32); 10] = [
    ("blue", 0x1f77b4),
    ("red", 0xd62728),
    ("green", 0x2ca02c),
    ("black", 0x000000),
    ("purple", 0x9467bd),
    ("orange", 0xff7f0e),
    ("gray", 0x7f7f7f),
    ("brown", 0x8c564b),
    ("pink", 0xe377c2),
    ("cyan", 0x17becf),
];

// ---------------------------------------------------------------------------
// Colour schemes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Evenly spread hues, the plot widget's own look.
    #[default]
    Auto,
    Rainbow,
    Viridis,
    Plasma,
    Tab10,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 5] = [
        ColorScheme::Auto,
        ColorScheme::Rainbow,
        ColorScheme::Viridis,
        ColorScheme::Plasma,
        ColorScheme::Tab10,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorScheme::Auto => "auto",
            ColorScheme::Rainbow => "rainbow",
            ColorScheme::Viridis => "viridis",
            ColorScheme::Plasma => "plasma",
            ColorScheme::Tab10 => "tab10",
        }
    }

    /// Colour of the series at `index` (0-based). Pure: same input, same bytes.
    pub fn color(self, index: usize) -> Color32 {
        match self {
            ColorScheme::Auto => {
                let hue = sample_position(index) * 360.0;
                let rgb: Srgb = Hsl::new(hue, 0.75, 0.55).into_color();
                to_color32(rgb)
            }
            ColorScheme::Rainbow => {
                let t = sample_position(index);
                let red = (2.0 * t - 0.5).abs();
                let green = (std::f32::consts::PI * t).sin();
                let blue = (std::f32::consts::FRAC_PI_2 * t).cos();
                to_color32(Srgb::new(red, green, blue))
            }
            ColorScheme::Viridis => sample_stops(&VIRIDIS, sample_position(index)),
            ColorScheme::Plasma => sample_stops(&PLASMA, sample_position(index)),
            ColorScheme::Tab10 => hex_color(TAB10[index % TAB10.len()]),
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorScheme::ALL
            .into_iter()
            .find(|scheme| scheme.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown color scheme '{s}' (expected auto, rainbow, viridis, plasma or tab10)")
            })
    }
}

/// Position in [0, 1) of the `index`-th series on a continuous map.
///
/// Depends on the index only, so adding files never recolours earlier ones.
fn sample_position(index: usize) -> f32 {
    (index as f32 * GOLDEN_STEP).fract()
}

fn sample_stops(stops: &[u32], t: f32) -> Color32 {
    let scaled = t.clamp(0.0, 1.0) * (stops.len() - 1) as f32;
    let lo = (scaled.floor() as usize).min(stops.len() - 2);
    let a = hex_linear(stops[lo]);
    let b = hex_linear(stops[lo + 1]);
    let mixed = a.mix(b, scaled - lo as f32);
    to_color32(Srgb::from_linear(mixed))
}

fn hex_linear(hex: u32) -> LinSrgb {
    let [_, r, g, b] = hex.to_be_bytes();
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}

fn hex_color(hex: u32) -> Color32 {
    let [_, r, g, b] = hex.to_be_bytes();
    Color32::from_rgb(r, g, b)
}

fn to_color32(rgb: Srgb) -> Color32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgb(channel(rgb.red), channel(rgb.green), channel(rgb.blue))
}

/// Resolve a colour name (`"red"`) or hex triplet (`"#d62728"`).
pub fn named_color(name: &str) -> Option<Color32> {
    let name = name.trim();
    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        return u32::from_str_radix(hex, 16).ok().map(hex_color);
    }
    NAMED_COLORS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, hex)| hex_color(hex))
}

// ---------------------------------------------------------------------------
// Legend labels
// ---------------------------------------------------------------------------

/// Legend text for a file: path relative to `cwd` when inside it, shortened
/// to `first … last` if longer than [`MAX_LABEL_CHARS`].
///
/// Two long paths that differ only in the middle may end up with the same
/// label; both are kept as they are.
pub fn legend_label(source_id: &str, cwd: Option<&Path>) -> String {
    let relative = cwd
        .and_then(|cwd| Path::new(source_id).strip_prefix(cwd).ok())
        .filter(|rel| !rel.as_os_str().is_empty())
        .map(|rel| rel.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_id.to_string());

    let chars: Vec<char> = relative.chars().collect();
    if chars.len() <= MAX_LABEL_CHARS {
        return relative;
    }
    let head = MAX_LABEL_CHARS - LABEL_TAIL_CHARS - 3;
    let mut label: String = chars[..head].iter().collect();
    label.push_str("...");
    label.extend(&chars[chars.len() - LABEL_TAIL_CHARS..]);
    label
}

// ---------------------------------------------------------------------------
// Style assignment
// ---------------------------------------------------------------------------

/// Colour and legend text for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleAssignment {
    pub color: Color32,
    pub label: String,
}

/// Maps series positions to styles for one scheme.
///
/// The working directory used to shorten labels is captured once, so
/// assignment never looks at process-wide state.
#[derive(Debug, Clone)]
pub struct StyleAssigner {
    pub scheme: ColorScheme,
    cwd: Option<PathBuf>,
}

impl StyleAssigner {
    pub fn new(scheme: ColorScheme, cwd: Option<PathBuf>) -> Self {
        Self { scheme, cwd }
    }

    /// Assigner relative to the current working directory.
    pub fn from_env(scheme: ColorScheme) -> Self {
        Self::new(scheme, std::env::current_dir().ok())
    }

    pub fn assign(&self, index: usize, source_id: &str) -> StyleAssignment {
        StyleAssignment {
            color: self.scheme.color(index),
            label: legend_label(source_id, self.cwd.as_deref()),
        }
    }

    /// Legend entries (label → colour) for a list of source ids.
    pub fn legend_entries<'a>(
        &self,
        source_ids: impl IntoIterator<Item = &'a str>,
    ) -> Vec<(String, Color32)> {
        source_ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| {
                let style = self.assign(i, id);
                (style.label, style.color)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_is_deterministic() {
        let assigner = StyleAssigner::new(ColorScheme::Rainbow, None);
        let a = assigner.assign(2, "a/b/c.txt");
        let b = assigner.assign(2, "a/b/c.txt");
        assert_eq!(a, b);
        assert_eq!(a.color.to_array(), b.color.to_array());
        assert_eq!(a.label, "a/b/c.txt");
    }

    #[test]
    fn neighbouring_indices_differ_in_every_scheme() {
        for scheme in ColorScheme::ALL {
            for i in 0..9 {
                assert_ne!(scheme.color(i), scheme.color(i + 1), "{scheme} index {i}");
            }
        }
    }

    #[test]
    fn tab10_cycles_after_ten() {
        assert_eq!(ColorScheme::Tab10.color(0), ColorScheme::Tab10.color(10));
        assert_eq!(ColorScheme::Tab10.color(0), Color32::from_rgb(0x1f, 0x77, 0xb4));
    }

    #[test]
    fn continuous_maps_start_at_their_first_stop() {
        assert_eq!(ColorScheme::Viridis.color(0), Color32::from_rgb(0x44, 0x01, 0x54));
        assert_eq!(ColorScheme::Plasma.color(0), Color32::from_rgb(0x0d, 0x08, 0x87));
    }

    #[test]
    fn scheme_names_round_trip() {
        for scheme in ColorScheme::ALL {
            assert_eq!(scheme.name().parse::<ColorScheme>(), Ok(scheme));
        }
        assert_eq!("VIRIDIS".parse::<ColorScheme>(), Ok(ColorScheme::Viridis));
        assert!("jet".parse::<ColorScheme>().is_err());
    }

    #[test]
    fn named_colors_and_hex() {
        assert_eq!(named_color("Red"), Some(Color32::from_rgb(0xd6, 0x27, 0x28)));
        assert_eq!(named_color("#000000"), Some(Color32::BLACK));
        assert_eq!(named_color("#12345"), None);
        assert_eq!(named_color("chartreuse"), None);
    }

    #[test]
    fn label_strips_working_directory() {
        let cwd = Path::new("/home/user/calc");
        assert_eq!(
            legend_label("/home/user/calc/run1/DOS0", Some(cwd)),
            "run1/DOS0"
        );
        assert_eq!(legend_label("/elsewhere/DOS0", Some(cwd)), "/elsewhere/DOS0");
    }

    #[test]
    fn long_label_keeps_head_and_tail() {
        let long = format!("{}/surface_o_vacancy_dos.txt", "deep/".repeat(12));
        let label = legend_label(&long, None);
        assert_eq!(label.chars().count(), MAX_LABEL_CHARS);
        assert!(label.starts_with("deep/deep/"));
        assert!(label.ends_with("vacancy_dos.txt"));
        assert!(label.contains("..."));
    }

    #[test]
    fn colliding_labels_are_left_alone() {
        let a = format!("{}A{}", "x".repeat(40), "y".repeat(40));
        let b = format!("{}B{}", "x".repeat(40), "y".repeat(40));
        assert_eq!(legend_label(&a, None), legend_label(&b, None));
    }
}
