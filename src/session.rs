use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::color::{ColorScheme, StyleAssigner};
use crate::data::export::{ExportError, export_in_range};
use crate::data::filter::filter_points_in_range;
use crate::data::range::{
    self, AUTO_DETECT_SLIDER_PAD, DEFAULT_SLIDER_SPAN, PlotRange, RangeError, ZOOM_SLIDER_PAD,
};
use crate::render::{RenderError, RenderRequest, Renderer, build_request};
use crate::scheduler::{Applied, LoadTarget, LoadWorker, Status, UpdateScheduler};
use crate::settings::PlotSettings;
use crate::state::{PlotMode, SeriesStore, StoreError};

/// Gap kept between the two sliders when one is pushed past the other.
pub const SLIDER_GAP: f64 = 0.1;

// ---------------------------------------------------------------------------
// Range controls
// ---------------------------------------------------------------------------

/// What the range widgets currently show: two text fields and two sliders.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeControls {
    pub min_text: String,
    pub max_text: String,
    pub min_slider: f64,
    pub max_slider: f64,
    pub slider_span: (f64, f64),
}

impl RangeControls {
    fn new(range: PlotRange) -> Self {
        let mut controls = Self {
            min_text: String::new(),
            max_text: String::new(),
            min_slider: 0.0,
            max_slider: 0.0,
            slider_span: DEFAULT_SLIDER_SPAN,
        };
        controls.show(range);
        controls
    }

    /// Put `range` into every widget.
    fn show(&mut self, range: PlotRange) {
        self.min_text = format_bound(range.min());
        self.max_text = format_bound(range.max());
        self.min_slider = range.min();
        self.max_slider = range.max();
        self.widen_span(range);
    }

    fn widen_span(&mut self, range: PlotRange) {
        self.slider_span.0 = self.slider_span.0.min(range.min());
        self.slider_span.1 = self.slider_span.1.max(range.max());
    }
}

fn format_bound(v: f64) -> String {
    let text = format!("{v:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_string() } else { text.to_string() }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The application context: loaded data, scheduler, settings and widgets.
///
/// Both the GUI and the tests drive the core through this one object; all
/// calls happen on the control thread.
pub struct Session {
    store: SeriesStore,
    scheduler: UpdateScheduler,
    settings: PlotSettings,
    assigner: StyleAssigner,
    pub controls: RangeControls,
    frame: Option<RenderRequest>,
    /// Bumped whenever a new frame is produced.
    frame_generation: u64,
}

impl Session {
    pub fn new(scheduler: UpdateScheduler, cwd: Option<PathBuf>) -> Self {
        let settings = PlotSettings::default();
        let mut store = SeriesStore::new();
        store.set_range(settings.range);
        Self {
            store,
            scheduler,
            assigner: StyleAssigner::new(settings.color_scheme, cwd),
            controls: RangeControls::new(settings.range),
            settings,
            frame: None,
            frame_generation: 0,
        }
    }

    /// Session with a background loader; `notify` wakes the UI when a
    /// load finishes.
    pub fn with_loader(notify: impl Fn() + Send + 'static) -> std::io::Result<Self> {
        let worker = LoadWorker::spawn(notify)?;
        let scheduler = UpdateScheduler::default().with_worker(worker);
        Ok(Self::new(scheduler, std::env::current_dir().ok()))
    }

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    pub fn settings(&self) -> &PlotSettings {
        &self.settings
    }

    pub fn status(&self) -> &Status {
        self.scheduler.status()
    }

    /// Report the outcome of a user action on the status line.
    pub fn set_status(&mut self, status: Status) {
        self.scheduler.set_status(status);
    }

    pub fn scheduler(&self) -> &UpdateScheduler {
        &self.scheduler
    }

    pub fn assigner(&self) -> &StyleAssigner {
        &self.assigner
    }

    /// The last frame produced by a redraw, if it had data in range.
    pub fn frame(&self) -> Option<&RenderRequest> {
        self.frame.as_ref()
    }

    pub fn frame_generation(&self) -> u64 {
        self.frame_generation
    }

    // -- files --------------------------------------------------------------

    pub fn open_single(&mut self, path: PathBuf) {
        self.scheduler.request_load(LoadTarget::Single, path);
    }

    /// Queue files for the comparison plot.
    pub fn add_files(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        for path in paths {
            let target = LoadTarget::Multi(path.to_string_lossy().into_owned());
            self.scheduler.request_load(target, path);
        }
    }

    /// Drop the selected comparison files, including any still loading.
    pub fn remove_selected<'a>(&mut self, source_ids: impl IntoIterator<Item = &'a str>, now: Instant) {
        let ids: Vec<&str> = source_ids.into_iter().collect();
        self.scheduler.forget_loads(|target| match target {
            LoadTarget::Multi(id) => ids.iter().any(|wanted| *wanted == id.as_str()),
            LoadTarget::Single => false,
        });
        let removed = self.store.remove_selected(ids);
        if removed > 0 {
            self.scheduler.request_redraw(now);
        }
    }

    pub fn clear_multi(&mut self, now: Instant) {
        self.scheduler
            .forget_loads(|target| matches!(target, LoadTarget::Multi(_)));
        self.store.clear_multi();
        self.scheduler.request_redraw(now);
    }

    pub fn set_mode(&mut self, mode: PlotMode, now: Instant) {
        if self.store.mode() != mode {
            self.store.set_mode(mode);
            self.scheduler.request_redraw(now);
        }
    }

    // -- range --------------------------------------------------------------

    /// The text fields changed.
    pub fn edit_range_text(&mut self, now: Instant) -> Result<PlotRange, RangeError> {
        let range = self.scheduler.request_range_text(
            &self.controls.min_text,
            &self.controls.max_text,
            now,
        )?;
        self.controls.min_slider = range.min();
        self.controls.max_slider = range.max();
        self.controls.widen_span(range);
        Ok(range)
    }

    /// The min slider moved; pushes max up if needed.
    pub fn slide_min(&mut self, value: f64, now: Instant) -> Result<PlotRange, RangeError> {
        let mut max = self.controls.max_slider;
        if value >= max {
            max = value + SLIDER_GAP;
        }
        self.apply_slider(value, max, now)
    }

    /// The max slider moved; pushes min down if needed.
    pub fn slide_max(&mut self, value: f64, now: Instant) -> Result<PlotRange, RangeError> {
        let mut min = self.controls.min_slider;
        if value <= min {
            min = value - SLIDER_GAP;
        }
        self.apply_slider(min, value, now)
    }

    fn apply_slider(&mut self, min: f64, max: f64, now: Instant) -> Result<PlotRange, RangeError> {
        let range = self.scheduler.request_range(min, max, now)?;
        self.controls.show(range);
        Ok(range)
    }

    /// Range from the active data, sliders padded by 2 eV.
    pub fn auto_detect(&mut self, now: Instant) -> Result<PlotRange, StoreError> {
        let detected = self.store.detect_range()?;
        self.set_range_with_span(detected, detected.padded(AUTO_DETECT_SLIDER_PAD), now);
        self.scheduler
            .set_status(Status::Message(format!("Auto-detected: {detected}")));
        Ok(detected)
    }

    /// Full data range, sliders padded by 1 eV.
    pub fn zoom_to_data(&mut self, now: Instant) -> Result<PlotRange, StoreError> {
        let data = self.store.data_range()?;
        self.set_range_with_span(data, data.padded(ZOOM_SLIDER_PAD), now);
        self.scheduler
            .set_status(Status::Message(format!("Full data range: {data}")));
        Ok(data)
    }

    /// Back to -7 .. 7 eV.
    pub fn reset_range(&mut self, now: Instant) {
        self.set_range_with_span(PlotRange::default(), DEFAULT_SLIDER_SPAN, now);
    }

    fn set_range_with_span(&mut self, range: PlotRange, span: (f64, f64), now: Instant) {
        // Already validated; still routed through the scheduler's gate.
        if let Ok(range) = self.scheduler.request_range(range.min(), range.max(), now) {
            self.controls.slider_span = span;
            self.controls.show(range);
        }
    }

    // -- style --------------------------------------------------------------

    /// Mutable settings for widgets; call [`style_changed`](Self::style_changed)
    /// afterwards.
    pub fn settings_mut(&mut self) -> &mut PlotSettings {
        &mut self.settings
    }

    pub fn style_changed(&mut self, now: Instant) {
        self.assigner.scheme = self.settings.color_scheme;
        self.scheduler.request_redraw(now);
    }

    pub fn set_scheme(&mut self, scheme: ColorScheme, now: Instant) {
        self.settings.color_scheme = scheme;
        self.style_changed(now);
    }

    /// Replace all settings (loaded file or reset).
    pub fn apply_settings(&mut self, settings: PlotSettings, now: Instant) {
        let range = settings.range;
        self.settings = settings;
        self.assigner.scheme = self.settings.color_scheme;
        self.set_range_with_span(range, DEFAULT_SLIDER_SPAN, now);
    }

    pub fn reset_settings(&mut self, now: Instant) {
        self.apply_settings(PlotSettings::default(), now);
    }

    pub fn save_settings(&mut self, path: &Path) -> Result<(), crate::settings::SettingsError> {
        self.settings.range = self.store.range();
        self.settings.save(path)
    }

    pub fn load_settings(&mut self, path: &Path, now: Instant) -> Result<(), crate::settings::SettingsError> {
        let settings = PlotSettings::load(path)?;
        self.apply_settings(settings, now);
        Ok(())
    }

    // -- control-thread step ------------------------------------------------

    /// Apply finished loads and run a due redraw. Returns whether a new
    /// frame was produced.
    pub fn tick(&mut self, now: Instant) -> bool {
        let (applied, redraw) = self.scheduler.tick(&mut self.store, now);

        let loaded_active = applied.iter().any(|a| match a {
            Applied::Loaded { target, .. } => {
                let mode = match target {
                    LoadTarget::Single => PlotMode::SingleFile,
                    LoadTarget::Multi(_) => PlotMode::MultiFile,
                };
                mode == self.store.mode()
            }
            _ => false,
        });
        if loaded_active {
            let range = self.store.range();
            self.controls.slider_span = range.padded(AUTO_DETECT_SLIDER_PAD);
            self.controls.show(range);
        }

        if redraw.is_none() {
            return false;
        }
        self.redraw();
        true
    }

    fn redraw(&mut self) {
        self.settings.range = self.store.range();
        self.frame_generation += 1;
        match build_request(&self.store, &self.settings, &self.assigner) {
            Ok(frame) => {
                // A failure from an earlier action is cleared by a good draw;
                // rejected range input and pending loads stay visible.
                if !matches!(
                    self.scheduler.status(),
                    Status::InvalidRange(_) | Status::Loading { .. }
                ) {
                    self.scheduler.set_status(Status::Message(format!(
                        "Plot updated: {} points in range",
                        frame.point_count()
                    )));
                }
                self.frame = Some(frame);
            }
            Err(RenderError::Range(RangeError::EmptyResult { .. })) => {
                self.frame = None;
                self.scheduler
                    .set_status(Status::NoDataInRange(self.store.range()));
            }
            Err(RenderError::NotLoaded(_)) => {
                self.frame = None;
            }
            Err(err) => {
                self.frame = None;
                self.scheduler.set_status(Status::Error(err.to_string()));
            }
        }
    }

    // -- output -------------------------------------------------------------

    /// Build a fresh frame from the current state and hand it to `renderer`.
    pub fn render_with<R: Renderer>(&self, renderer: &mut R) -> Result<R::Output, RenderError> {
        let request = build_request(&self.store, &self.settings, &self.assigner)?;
        renderer.render(&request)
    }

    /// Export the single-file series inside the current window.
    pub fn export_csv(&self, path: &Path) -> Result<usize, ExportError> {
        let series = self
            .store
            .single()
            .ok_or(StoreError::NotLoaded(PlotMode::SingleFile))?;
        export_in_range(path, &filter_points_in_range(series, self.store.range()))
    }

    /// File information for the active mode.
    pub fn file_info(&self) -> Option<String> {
        match self.store.mode() {
            PlotMode::SingleFile => self.store.single().map(|s| s.stats().to_string()),
            PlotMode::MultiFile if !self.store.multi().is_empty() => {
                let points: usize = self.store.multi().iter().map(|s| s.len()).sum();
                let span = range::auto_detect(self.store.multi())?;
                Some(format!(
                    "Files: {}\nData Points: {points}\nEnergy Range: {span}",
                    self.store.multi().len()
                ))
            }
            PlotMode::MultiFile => None,
        }
    }
}
