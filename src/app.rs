use std::collections::BTreeSet;
use std::time::Instant;

use eframe::egui;

use crate::session::Session;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyDosApp {
    pub session: Session,
    /// Checked entries of the comparison list.
    selected: BTreeSet<String>,
    /// Frame generation last shown; a newer one snaps the plot view.
    shown_generation: u64,
}

impl RustyDosApp {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            selected: BTreeSet::new(),
            shown_generation: 0,
        }
    }
}

impl eframe::App for RustyDosApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.session.tick(now);

        // ---- Top panel: menu bar and status ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.session, now);
        });

        // ---- Left side panel: controls ----
        egui::SidePanel::left("control_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.session, &mut self.selected, now);
            });

        // ---- Central panel: plot ----
        let generation = self.session.frame_generation();
        let reset_bounds = generation != self.shown_generation;
        self.shown_generation = generation;
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::dos_plot(ui, &self.session, reset_bounds);
        });

        // Wake up again when the debounced redraw is due.
        if let Some(deadline) = self.session.scheduler().next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        }
    }
}
