use eframe::egui::{self, Ui};
use egui_plot::{Legend, Line, LineStyle, Plot, PlotBounds, PlotPoints, VLine};

use crate::render::{FERMI_LABEL, RenderError, RenderRequest, Renderer, X_LABEL, Y_LABEL};
use crate::scheduler::Status;
use crate::session::Session;
use crate::state::PlotMode;

// ---------------------------------------------------------------------------
// Interactive renderer (central panel)
// ---------------------------------------------------------------------------

/// Draws a frame into an egui plot.
pub struct EguiRenderer<'u> {
    ui: &'u mut Ui,
    /// Snap the view to the frame's window instead of keeping the user's
    /// pan/zoom.
    reset_bounds: bool,
}

impl<'u> EguiRenderer<'u> {
    pub fn new(ui: &'u mut Ui, reset_bounds: bool) -> Self {
        Self { ui, reset_bounds }
    }
}

impl Renderer for EguiRenderer<'_> {
    type Output = egui::Response;

    fn render(&mut self, request: &RenderRequest) -> Result<egui::Response, RenderError> {
        let settings = &request.settings;
        let (y0, y1) = request.y_range;
        let bounds = PlotBounds::from_min_max([request.range.min(), y0], [request.range.max(), y1]);
        let reset = self.reset_bounds;

        let response = Plot::new("dos_plot")
            .legend(Legend::default())
            .x_axis_label(X_LABEL)
            .y_axis_label(Y_LABEL)
            .show_grid(settings.show_grid)
            .allow_boxed_zoom(true)
            .allow_drag(true)
            .allow_scroll(true)
            .allow_zoom(true)
            .show(self.ui, |plot_ui| {
                if reset {
                    plot_ui.set_plot_bounds(bounds);
                }
                for series in &request.series {
                    let points: PlotPoints = series.points.iter().map(|&(e, v)| [e, v]).collect();
                    plot_ui.line(
                        Line::new(points)
                            .name(&series.label)
                            .color(series.color)
                            .width(settings.line_width),
                    );
                }
                if let Some(color) = request.fermi {
                    plot_ui.vline(
                        VLine::new(0.0)
                            .name(FERMI_LABEL)
                            .color(color.gamma_multiply(0.7))
                            .style(LineStyle::dashed_loose())
                            .width(settings.line_width.min(1.5)),
                    );
                }
            })
            .response;
        Ok(response)
    }
}

/// Render the central panel: the last frame, or why there is none.
pub fn dos_plot(ui: &mut Ui, session: &Session, reset_bounds: bool) {
    let Some(frame) = session.frame() else {
        let hint = match session.status() {
            Status::NoDataInRange(range) => {
                format!("No data in range {range}. Try Auto-detect or Zoom to Data.")
            }
            Status::Loading { .. } => "Loading…".to_string(),
            _ if session.store().active_series().is_empty() => match session.store().mode() {
                PlotMode::SingleFile => "Open a DOS file  (File → Open…)".to_string(),
                PlotMode::MultiFile => "Add files to compare  (File → Add files…)".to_string(),
            },
            status => status.to_string(),
        };
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(hint);
        });
        return;
    };

    if let Err(err) = EguiRenderer::new(ui, reset_bounds).render(frame) {
        log::error!("Plot failed: {err}");
    }
}
