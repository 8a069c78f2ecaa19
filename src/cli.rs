use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use crate::color::{ColorScheme, StyleAssigner, named_color};
use crate::data::export::export_in_range;
use crate::data::filter::filter_points_in_range;
use crate::data::loader::load_file;
use crate::data::model::Series;
use crate::data::range::{self, PlotRange};
use crate::render::file::{FileRenderer, ImageFormat};
use crate::render::{Renderer, build_request};
use crate::settings::PlotSettings;
use crate::state::{PlotMode, SeriesStore};

#[derive(Parser, Debug)]
#[command(
    name = "rusty-dos",
    version,
    about = "Density-of-states plotter",
    long_about = "Density-of-states plotter. Without a subcommand the interactive viewer opens."
)]
pub struct Cli {
    /// Settings file (JSON) applied before the command runs
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Plot one file over its auto-detected range
    Quick {
        file: PathBuf,
        /// Output image, .png or .svg only; defaults to <name>_dos.png
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Plot one or several files with explicit options
    Plot {
        #[command(subcommand)]
        target: PlotTarget,
    },
    /// Write the points inside a range to a .csv (comma) or text (tab) file
    Export {
        file: PathBuf,
        #[command(flatten)]
        range: RangeArg,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum PlotTarget {
    /// Plot a single DOS file
    Single {
        file: PathBuf,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Overlay several DOS files
    Multi {
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
        /// Colour scheme: auto, rainbow, viridis, plasma or tab10
        #[arg(short = 'c', long = "colormap")]
        scheme: Option<ColorScheme>,
        #[command(flatten)]
        style: StyleArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct RangeArg {
    /// Energy window in eV
    #[arg(
        short,
        long,
        num_args = 2,
        value_names = ["MIN", "MAX"],
        allow_negative_numbers = true
    )]
    pub range: Option<Vec<f64>>,
}

impl RangeArg {
    /// The validated window, if one was given.
    pub fn resolve(&self) -> Result<Option<PlotRange>> {
        match self.range.as_deref() {
            None => Ok(None),
            Some(&[min, max]) => Ok(Some(range::validate(min, max)?)),
            Some(other) => bail!("--range takes MIN and MAX, got {} value(s)", other.len()),
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct StyleArgs {
    #[command(flatten)]
    pub range: RangeArg,
    /// Output image, .png or .svg only
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Line colour in single-file plots (name or #rrggbb)
    #[arg(long)]
    pub color: Option<String>,
    /// Line width in points
    #[arg(long)]
    pub width: Option<f32>,
    /// Hide the Fermi level line
    #[arg(long)]
    pub no_fermi: bool,
    #[arg(long)]
    pub fermi_color: Option<String>,
    /// Hide the grid
    #[arg(long)]
    pub no_grid: bool,
    #[arg(long)]
    pub dpi: Option<u32>,
    /// Figure size in inches
    #[arg(long, num_args = 2, value_names = ["W", "H"])]
    pub size: Option<Vec<f32>>,
}

impl StyleArgs {
    /// Overlay the given flags on `settings`.
    pub fn apply(&self, settings: &mut PlotSettings) -> Result<()> {
        if let Some(color) = &self.color {
            check_color(color)?;
            settings.line_color = color.clone();
        }
        if let Some(color) = &self.fermi_color {
            check_color(color)?;
            settings.fermi_color = color.clone();
        }
        if let Some(width) = self.width {
            if !(width.is_finite() && width > 0.0) {
                bail!("line width must be positive, got {width}");
            }
            settings.line_width = width;
        }
        if let Some(dpi) = self.dpi {
            if dpi == 0 {
                bail!("dpi must be positive");
            }
            settings.dpi = dpi;
        }
        if let Some(size) = self.size.as_deref() {
            let &[w, h] = size else {
                bail!("--size takes W and H");
            };
            if !(w > 0.0 && h > 0.0) {
                bail!("figure size must be positive, got {w} x {h}");
            }
            settings.figure_width = w;
            settings.figure_height = h;
        }
        settings.show_fermi &= !self.no_fermi;
        settings.show_grid &= !self.no_grid;
        Ok(())
    }
}

fn check_color(name: &str) -> Result<()> {
    if named_color(name).is_none() {
        bail!("unknown colour '{name}' (use a name such as blue/red/black or #rrggbb)");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Runners
// ---------------------------------------------------------------------------

/// Execute a non-interactive command.
pub fn run(command: Command, mut settings: PlotSettings) -> Result<()> {
    match command {
        Command::Quick { file, output } => {
            let series = load(&file)?;
            let mut store = SeriesStore::new();
            store.load_single(series);
            store.set_range(store.detect_range()?);
            let output = output.unwrap_or_else(|| default_output(&file));
            render(&store, &settings, &output)
        }
        Command::Plot {
            target: PlotTarget::Single { file, style },
        } => {
            style.apply(&mut settings)?;
            let series = load(&file)?;
            let mut store = SeriesStore::new();
            store.load_single(series);
            store.set_range(style.range.resolve()?.unwrap_or(settings.range));
            let output = style.output.clone().unwrap_or_else(|| default_output(&file));
            render(&store, &settings, &output)
        }
        Command::Plot {
            target: PlotTarget::Multi { files, scheme, style },
        } => {
            style.apply(&mut settings)?;
            if let Some(scheme) = scheme {
                settings.color_scheme = scheme;
            }
            let mut store = SeriesStore::new();
            store.set_mode(PlotMode::MultiFile);
            for file in &files {
                store.add(load(file)?);
            }
            store.set_range(style.range.resolve()?.unwrap_or(settings.range));
            let output = style
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from("dos_comparison.png"));
            render(&store, &settings, &output)
        }
        Command::Export {
            file,
            range,
            output,
        } => {
            let series = load(&file)?;
            let window = range.resolve()?.unwrap_or(settings.range);
            let rows = export_in_range(&output, &filter_points_in_range(&series, window))
                .with_context(|| format!("exporting {}", file.display()))?;
            println!("Exported {rows} points ({window}) to {}", output.display());
            Ok(())
        }
    }
}

fn load(path: &Path) -> Result<Series> {
    let series = load_file(path)?;
    println!("{}\n{}", path.display(), series.stats());
    Ok(series)
}

/// `<stem>_dos.png` in the working directory.
fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dos".to_string());
    PathBuf::from(format!("{stem}_dos.png"))
}

fn render(store: &SeriesStore, settings: &PlotSettings, output: &Path) -> Result<()> {
    // Reject the format before doing any drawing work.
    ImageFormat::from_path(output)?;
    let assigner = StyleAssigner::from_env(settings.color_scheme);
    let request = build_request(store, settings, &assigner)
        .with_context(|| format!("plotting {}", store.range()))?;
    let saved = FileRenderer::new(output).render(&request)?;
    println!(
        "Plot saved to {} ({} points in {})",
        saved.display(),
        request.point_count(),
        request.range
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn negative_range_values_parse() {
        let cli = Cli::try_parse_from([
            "rusty-dos", "plot", "single", "DOS0", "-r", "-5", "3.5", "--no-fermi",
        ])
        .unwrap();
        let Some(Command::Plot {
            target: PlotTarget::Single { file, style },
        }) = cli.command
        else {
            panic!("expected plot single");
        };
        assert_eq!(file, PathBuf::from("DOS0"));
        assert_eq!(style.range.resolve().unwrap(), Some(PlotRange::new(-5.0, 3.5).unwrap()));
        assert!(style.no_fermi);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let arg = RangeArg {
            range: Some(vec![5.0, -5.0]),
        };
        assert!(arg.resolve().is_err());
    }

    #[test]
    fn style_flags_overlay_settings() {
        let style = StyleArgs {
            color: Some("black".to_string()),
            width: Some(1.5),
            no_grid: true,
            size: Some(vec![6.0, 4.0]),
            dpi: Some(100),
            ..StyleArgs::default()
        };
        let mut settings = PlotSettings::default();
        style.apply(&mut settings).unwrap();
        assert_eq!(settings.line_color, "black");
        assert_eq!(settings.line_width, 1.5);
        assert!(!settings.show_grid);
        assert!(settings.show_fermi);
        assert_eq!(settings.pixel_size(), (600, 400));
    }

    #[test]
    fn unknown_colour_flag_fails() {
        let style = StyleArgs {
            color: Some("octarine".to_string()),
            ..StyleArgs::default()
        };
        assert!(style.apply(&mut PlotSettings::default()).is_err());
    }

    #[test]
    fn multi_takes_scheme() {
        let cli =
            Cli::try_parse_from(["rusty-dos", "plot", "multi", "a", "b", "-c", "viridis"]).unwrap();
        let Some(Command::Plot {
            target: PlotTarget::Multi { files, scheme, .. },
        }) = cli.command
        else {
            panic!("expected plot multi");
        };
        assert_eq!(files.len(), 2);
        assert_eq!(scheme, Some(ColorScheme::Viridis));
    }

    #[test]
    fn output_help_names_supported_formats() {
        for path in [&["quick"][..], &["plot", "single"], &["plot", "multi"]] {
            let mut cmd = Cli::command();
            let sub = path
                .iter()
                .fold(&mut cmd, |cmd, name| cmd.find_subcommand_mut(name).unwrap());
            let help = sub.render_help().to_string();
            assert!(help.contains(".png or .svg only"), "{help}");
        }
    }

    #[test]
    fn default_output_uses_stem() {
        assert_eq!(default_output(Path::new("runs/DOS_clean.dat")), PathBuf::from("DOS_clean_dos.png"));
    }
}
