use std::collections::BTreeSet;
use std::time::Instant;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::{ColorScheme, NAMED_COLORS, named_color};
use crate::render::file::FileRenderer;
use crate::scheduler::Status;
use crate::session::Session;
use crate::state::PlotMode;

const DATA_EXTENSIONS: [&str; 4] = ["dat", "txt", "dos", "csv"];

// ---------------------------------------------------------------------------
// Left side panel – range, style and file widgets
// ---------------------------------------------------------------------------

/// Render the left control panel. `selected` holds the checked entries of
/// the comparison list.
pub fn side_panel(ui: &mut Ui, session: &mut Session, selected: &mut BTreeSet<String>, now: Instant) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            mode_tabs(ui, session, now);
            ui.separator();
            range_controls(ui, session, now);
            ui.separator();
            style_controls(ui, session, now);
            ui.separator();

            match session.store().mode() {
                PlotMode::SingleFile => {
                    if ui.button("Open file…").clicked() {
                        open_single_dialog(session);
                    }
                }
                PlotMode::MultiFile => file_list(ui, session, selected, now),
            }

            if let Some(info) = session.file_info() {
                ui.separator();
                egui::CollapsingHeader::new(RichText::new("File information").strong())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.monospace(info);
                    });
            }
        });
}

fn mode_tabs(ui: &mut Ui, session: &mut Session, now: Instant) {
    let mut mode = session.store().mode();
    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut mode, PlotMode::SingleFile, "Single file");
        ui.selectable_value(&mut mode, PlotMode::MultiFile, "Compare files");
    });
    session.set_mode(mode, now);
}

fn range_controls(ui: &mut Ui, session: &mut Session, now: Instant) {
    ui.strong("Energy range (eV)");

    let mut text_changed = false;
    egui::Grid::new("range_grid").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("Min");
        text_changed |= ui
            .add(egui::TextEdit::singleline(&mut session.controls.min_text).desired_width(80.0))
            .changed();
        ui.end_row();
        ui.label("Max");
        text_changed |= ui
            .add(egui::TextEdit::singleline(&mut session.controls.max_text).desired_width(80.0))
            .changed();
        ui.end_row();
    });
    if text_changed {
        // Rejections land on the status line.
        let _ = session.edit_range_text(now);
    }

    let (lo, hi) = session.controls.slider_span;
    let mut min = session.controls.min_slider;
    let mut max = session.controls.max_slider;
    if ui
        .add(egui::Slider::new(&mut min, lo..=hi).text("Min").fixed_decimals(2))
        .changed()
    {
        let _ = session.slide_min(min, now);
    }
    if ui
        .add(egui::Slider::new(&mut max, lo..=hi).text("Max").fixed_decimals(2))
        .changed()
    {
        let _ = session.slide_max(max, now);
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Auto-detect").clicked() {
            if let Err(err) = session.auto_detect(now) {
                session.set_status(Status::Message(format!("Auto-detect: {err}")));
            }
        }
        if ui.button("Zoom to Data").clicked() {
            if let Err(err) = session.zoom_to_data(now) {
                session.set_status(Status::Message(format!("Zoom to Data: {err}")));
            }
        }
        if ui.button("Reset").clicked() {
            session.reset_range(now);
        }
    });
}

fn style_controls(ui: &mut Ui, session: &mut Session, now: Instant) {
    ui.strong("Style");
    let mut changed = false;
    let mode = session.store().mode();
    let settings = session.settings_mut();

    changed |= ui.checkbox(&mut settings.show_fermi, "Fermi level").changed();
    changed |= ui.checkbox(&mut settings.show_grid, "Grid").changed();
    changed |= ui.checkbox(&mut settings.auto_scale, "Auto-scale DOS axis").changed();
    changed |= ui
        .add(egui::Slider::new(&mut settings.line_width, 0.5..=5.0).text("Line width"))
        .changed();

    match mode {
        PlotMode::SingleFile => {
            changed |= color_combo(ui, "line_color", "Line colour", &mut settings.line_color);
        }
        PlotMode::MultiFile => {
            egui::ComboBox::from_id_salt("color_scheme")
                .selected_text(settings.color_scheme.name())
                .show_ui(ui, |ui: &mut Ui| {
                    for scheme in ColorScheme::ALL {
                        changed |= ui
                            .selectable_value(&mut settings.color_scheme, scheme, scheme.name())
                            .changed();
                    }
                });
        }
    }
    if settings.show_fermi {
        changed |= color_combo(ui, "fermi_color", "Fermi colour", &mut settings.fermi_color);
    }

    if changed {
        session.style_changed(now);
    }
}

fn color_combo(ui: &mut Ui, id: &str, label: &str, value: &mut String) -> bool {
    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(value.as_str())
            .show_ui(ui, |ui: &mut Ui| {
                for (name, _) in NAMED_COLORS {
                    let swatch = named_color(name).unwrap_or(Color32::GRAY);
                    let text = RichText::new(name).color(swatch);
                    if ui.selectable_label(value.as_str() == name, text).clicked() {
                        *value = name.to_string();
                        changed = true;
                    }
                }
            });
    });
    changed
}

fn file_list(ui: &mut Ui, session: &mut Session, selected: &mut BTreeSet<String>, now: Instant) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong(format!("Files ({})", session.store().multi().len()));
        if ui.small_button("Add…").clicked() {
            add_files_dialog(session);
        }
    });

    let ids: Vec<String> = session
        .store()
        .multi()
        .iter()
        .map(|s| s.source_id().to_string())
        .collect();
    selected.retain(|id| ids.contains(id));
    let entries = session.assigner().legend_entries(ids.iter().map(String::as_str));

    for (id, (label, color)) in ids.iter().zip(entries) {
        let mut checked = selected.contains(id);
        if ui
            .checkbox(&mut checked, RichText::new(label).color(color))
            .on_hover_text(id.as_str())
            .changed()
        {
            if checked {
                selected.insert(id.clone());
            } else {
                selected.remove(id);
            }
        }
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui
            .add_enabled(!selected.is_empty(), egui::Button::new("Remove selected"))
            .clicked()
        {
            session.remove_selected(selected.iter().map(String::as_str), now);
            selected.clear();
        }
        if ui.button("Clear").clicked() {
            session.clear_multi(now);
            selected.clear();
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu and status line.
pub fn top_bar(ui: &mut Ui, session: &mut Session, now: Instant) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_single_dialog(session);
                ui.close_menu();
            }
            if ui.button("Add files…").clicked() {
                add_files_dialog(session);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Save plot…").clicked() {
                save_plot_dialog(session);
                ui.close_menu();
            }
            if ui.button("Export data…").clicked() {
                export_data_dialog(session);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Save settings…").clicked() {
                save_settings_dialog(session);
                ui.close_menu();
            }
            if ui.button("Load settings…").clicked() {
                load_settings_dialog(session, now);
                ui.close_menu();
            }
            if ui.button("Reset settings").clicked() {
                session.reset_settings(now);
                ui.close_menu();
            }
        });

        ui.separator();

        let status = session.status();
        let text = RichText::new(status.to_string());
        ui.label(if status.is_error() {
            text.color(Color32::RED)
        } else {
            text
        });
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_single_dialog(session: &mut Session) {
    let file = rfd::FileDialog::new()
        .set_title("Open DOS data")
        .add_filter("DOS data", &DATA_EXTENSIONS)
        .add_filter("All files", &["*"])
        .pick_file();
    if let Some(path) = file {
        session.open_single(path);
    }
}

pub fn add_files_dialog(session: &mut Session) {
    let files = rfd::FileDialog::new()
        .set_title("Add DOS files to compare")
        .add_filter("DOS data", &DATA_EXTENSIONS)
        .add_filter("All files", &["*"])
        .pick_files();
    if let Some(paths) = files {
        session.add_files(paths);
    }
}

fn save_plot_dialog(session: &mut Session) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save plot")
        .add_filter("PNG image", &["png"])
        .add_filter("SVG image", &["svg"])
        .set_file_name("dos_plot.png")
        .save_file()
    else {
        return;
    };
    let status = match session.render_with(&mut FileRenderer::new(&path)) {
        Ok(saved) => Status::Message(format!("Plot saved to {}", saved.display())),
        Err(err) => {
            log::error!("Failed to save plot: {err}");
            Status::Error(format!("Save plot: {err}"))
        }
    };
    session.set_status(status);
}

fn export_data_dialog(session: &mut Session) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export data in range")
        .add_filter("CSV", &["csv"])
        .add_filter("Text (tab separated)", &["txt", "dat"])
        .set_file_name("dos_export.csv")
        .save_file()
    else {
        return;
    };
    let status = match session.export_csv(&path) {
        Ok(rows) => Status::Message(format!("Exported {rows} points to {}", path.display())),
        Err(err) => {
            log::error!("Export failed: {err}");
            Status::Error(format!("Export: {err}"))
        }
    };
    session.set_status(status);
}

fn save_settings_dialog(session: &mut Session) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save settings")
        .add_filter("JSON", &["json"])
        .set_file_name("dos_settings.json")
        .save_file()
    else {
        return;
    };
    let status = match session.save_settings(&path) {
        Ok(()) => Status::Message(format!("Settings saved to {}", path.display())),
        Err(err) => Status::Error(err.to_string()),
    };
    session.set_status(status);
}

fn load_settings_dialog(session: &mut Session, now: Instant) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Load settings")
        .add_filter("JSON", &["json"])
        .pick_file()
    else {
        return;
    };
    let status = match session.load_settings(&path, now) {
        Ok(()) => Status::Message(format!("Settings loaded from {}", path.display())),
        Err(err) => {
            log::error!("Failed to load settings: {err}");
            Status::Error(err.to_string())
        }
    };
    session.set_status(status);
}
