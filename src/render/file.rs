use std::path::{Path, PathBuf};

use eframe::egui::Color32;
use plotters::backend::{BitMapBackend, DrawingBackend, SVGBackend};
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, DrawingAreaErrorKind, IntoDrawingArea};
use plotters::element::PathElement;
use plotters::series::LineSeries;
use plotters::style::colors::{BLACK, WHITE};
use plotters::style::{Color, IntoFont, RGBColor};

use super::{FERMI_LABEL, RenderError, RenderRequest, Renderer, X_LABEL, Y_LABEL};

/// Points per inch used for font sizes.
const POINTS_PER_INCH: f64 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    /// Pick the format from the output extension. PDF and friends are not
    /// supported by the drawing backend.
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "png" => Ok(ImageFormat::Png),
            "svg" => Ok(ImageFormat::Svg),
            other => Err(RenderError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Writes the figure to an image file.
#[derive(Debug, Clone)]
pub struct FileRenderer {
    path: PathBuf,
}

impl FileRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Renderer for FileRenderer {
    type Output = PathBuf;

    fn render(&mut self, request: &RenderRequest) -> Result<PathBuf, RenderError> {
        let format = ImageFormat::from_path(&self.path)?;
        let size = request.settings.pixel_size();
        match format {
            ImageFormat::Png => {
                draw_figure(BitMapBackend::new(&self.path, size).into_drawing_area(), request)?
            }
            ImageFormat::Svg => {
                draw_figure(SVGBackend::new(&self.path, size).into_drawing_area(), request)?
            }
        }
        log::info!("Plot saved to {}", self.path.display());
        Ok(self.path.clone())
    }
}

fn backend<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Backend(err.to_string())
}

fn rgb(color: Color32) -> RGBColor {
    RGBColor(color.r(), color.g(), color.b())
}

/// Font size in pixels for a size given in points.
fn font_px(points: u32, dpi: u32) -> u32 {
    ((points as f64 * dpi as f64 / POINTS_PER_INCH).round() as u32).max(1)
}

fn draw_figure<DB>(root: DrawingArea<DB, Shift>, request: &RenderRequest) -> Result<(), RenderError>
where
    DB: DrawingBackend,
{
    let settings = &request.settings;
    let scale = settings.dpi as f64 / POINTS_PER_INCH;
    let label_px = font_px(settings.font_size, settings.dpi);
    let title_px = font_px(settings.title_font_size, settings.dpi);
    let stroke = ((settings.line_width as f64 * scale).round() as u32).max(1);

    root.fill(&WHITE).map_err(backend)?;

    let (x0, x1) = (request.range.min(), request.range.max());
    let (y0, y1) = request.y_range;
    let mut chart = ChartBuilder::on(&root)
        .caption(&request.title, ("sans-serif", title_px).into_font())
        .margin((10.0 * scale) as u32)
        .x_label_area_size(label_px * 3)
        .y_label_area_size(label_px * 4)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(backend)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .label_style(("sans-serif", label_px).into_font());
    if settings.show_grid {
        let alpha = settings.grid_alpha.clamp(0.0, 1.0) as f64;
        mesh.bold_line_style(BLACK.mix(alpha))
            .light_line_style(BLACK.mix(alpha * 0.3));
    } else {
        mesh.disable_mesh();
    }
    mesh.draw().map_err(backend)?;

    for series in &request.series {
        let color = rgb(series.color);
        chart
            .draw_series(LineSeries::new(
                series.points.iter().copied(),
                color.stroke_width(stroke),
            ))
            .map_err(backend)?
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    if let Some(fermi) = request.fermi.filter(|_| request.range.contains(0.0)) {
        let color = rgb(fermi).mix(0.7);
        chart
            .draw_series(LineSeries::new(
                vec![(0.0, y0), (0.0, y1)],
                color.stroke_width(stroke),
            ))
            .map_err(backend)?
            .label(FERMI_LABEL)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(("sans-serif", label_px).into_font())
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(backend)?;

    root.present().map_err(backend)?;
    Ok(())
}
