/// Update scheduling: debounced redraws and background file loading.
///
/// ```text
///  slider / text edit ──► validate ──► Debouncer ──► Redraw (control thread)
///                            │
///                            └─ invalid: error status, pending redraw dropped
///
///  open file ──► LoadTicket(gen) ──► LoadWorker thread ──► LoadOutcome
///                                                            │
///          control thread: apply if gen is still the latest ◄┘
/// ```

pub mod debounce;
pub mod worker;

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::data::range::{self, PlotRange, RangeError};
use crate::state::{PlotMode, SeriesStore};

pub use debounce::Debouncer;
pub use worker::{LoadJob, LoadOutcome, LoadTarget, LoadTicket, LoadWorker, LoadedSeries};

/// Quiet window before a burst of setting changes turns into a redraw.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Status {
    #[default]
    Ready,
    Loading { pending: usize },
    Message(String),
    /// Rejected range input; the last good window is still in use.
    InvalidRange(RangeError),
    /// Valid window without any points in it.
    NoDataInRange(PlotRange),
    Error(String),
}

impl Status {
    pub fn is_error(&self) -> bool {
        matches!(self, Status::InvalidRange(_) | Status::Error(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ready => f.write_str("Ready"),
            Status::Loading { pending } => write!(f, "Loading {pending} file(s)…"),
            Status::Message(msg) => f.write_str(msg),
            Status::InvalidRange(err) => write!(f, "{err}"),
            Status::NoDataInRange(range) => write!(f, "No data in range ({range})"),
            Status::Error(msg) => write!(f, "Error: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// A redraw that is due now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Redraw {
    pub generation: u64,
    pub range: PlotRange,
}

/// What happened to a finished load.
#[derive(Debug)]
pub enum Applied {
    /// Written to the store.
    Loaded { target: LoadTarget, points: usize },
    /// Superseded by a newer request for the same target; ignored.
    Discarded(LoadTicket),
    /// The load failed; the store is untouched.
    Failed(crate::data::loader::LoadError),
}

/// Owns the debounce timer and load bookkeeping for one session.
///
/// Only the control thread calls into the scheduler; the store is passed in
/// and mutated here and nowhere else.
pub struct UpdateScheduler {
    debounce: Debouncer,
    pending_range: Option<PlotRange>,
    /// The armed redraw was requested by a load or style change, not only
    /// by range input, so rejecting range input must not drop it.
    content_dirty: bool,
    worker: Option<LoadWorker>,
    /// Outcomes of loads run inline when there is no worker thread.
    inline: VecDeque<LoadOutcome>,
    generation: u64,
    /// Latest requested generation per target that has not resolved yet.
    latest: HashMap<LoadTarget, u64>,
    status: Status,
}

impl UpdateScheduler {
    /// Scheduler without a worker thread; loads run when requested and are
    /// applied on the next [`tick`](Self::tick).
    pub fn new(delay: Duration) -> Self {
        Self {
            debounce: Debouncer::new(delay),
            pending_range: None,
            content_dirty: false,
            worker: None,
            inline: VecDeque::new(),
            generation: 0,
            latest: HashMap::new(),
            status: Status::Ready,
        }
    }

    pub fn with_worker(mut self, worker: LoadWorker) -> Self {
        self.worker = Some(worker);
        self
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// Number of loads whose result is still awaited.
    pub fn loads_in_flight(&self) -> usize {
        self.latest.len()
    }

    /// When the next redraw is due, for scheduling a wake-up.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    // -- range changes ------------------------------------------------------

    /// Numeric range input (sliders, CLI flags, buttons).
    pub fn request_range(&mut self, min: f64, max: f64, now: Instant) -> Result<PlotRange, RangeError> {
        self.gate(range::validate(min, max), now)
    }

    /// Typed range input.
    pub fn request_range_text(
        &mut self,
        min: &str,
        max: &str,
        now: Instant,
    ) -> Result<PlotRange, RangeError> {
        self.gate(range::validate_text(min, max), now)
    }

    fn gate(
        &mut self,
        checked: Result<PlotRange, RangeError>,
        now: Instant,
    ) -> Result<PlotRange, RangeError> {
        match checked {
            Ok(range) => {
                self.pending_range = Some(range);
                self.debounce.trigger(now);
                if matches!(self.status, Status::InvalidRange(_)) {
                    self.status = Status::Ready;
                }
                Ok(range)
            }
            Err(err) => {
                log::warn!("Range rejected: {err}");
                self.pending_range = None;
                if !self.content_dirty {
                    self.debounce.cancel();
                }
                self.status = Status::InvalidRange(err.clone());
                Err(err)
            }
        }
    }

    /// A non-range setting changed (colour, width, toggles).
    pub fn request_redraw(&mut self, now: Instant) {
        self.content_dirty = true;
        self.debounce.trigger(now);
    }

    // -- loading ------------------------------------------------------------

    /// Stop waiting for loads whose target matches `dropped`; their results
    /// are discarded when they arrive.
    pub fn forget_loads(&mut self, mut dropped: impl FnMut(&LoadTarget) -> bool) {
        let before = self.latest.len();
        self.latest.retain(|target, _| !dropped(target));
        let forgotten = before - self.latest.len();
        if forgotten == 0 {
            return;
        }
        log::debug!("Forgot {forgotten} pending load(s)");
        if let Status::Loading { .. } = self.status {
            self.status = if self.latest.is_empty() {
                Status::Ready
            } else {
                Status::Loading {
                    pending: self.latest.len(),
                }
            };
        }
    }

    /// Reserve a new generation for `target`, superseding older requests.
    pub fn begin_load(&mut self, target: LoadTarget) -> LoadTicket {
        self.generation += 1;
        self.latest.insert(target.clone(), self.generation);
        LoadTicket {
            target,
            generation: self.generation,
        }
    }

    /// Load `path` into `target` off the interactive path.
    pub fn request_load(&mut self, target: LoadTarget, path: PathBuf) -> LoadTicket {
        let ticket = self.begin_load(target);
        let job = LoadJob {
            ticket: ticket.clone(),
            path,
        };
        let job = match &self.worker {
            Some(worker) => worker.submit(job).err(),
            None => Some(job),
        };
        if let Some(job) = job {
            if self.worker.is_some() {
                log::warn!("Loader thread unavailable, loading {} inline", job.path.display());
            }
            self.inline.push_back(worker::run_job(job));
        }
        self.status = Status::Loading {
            pending: self.loads_in_flight(),
        };
        ticket
    }

    /// Apply one finished load to the store if it is still the latest
    /// request for its target.
    pub fn apply_outcome(
        &mut self,
        outcome: LoadOutcome,
        store: &mut SeriesStore,
        now: Instant,
    ) -> Applied {
        let ticket = outcome.ticket;
        if self.latest.get(&ticket.target) != Some(&ticket.generation) {
            log::debug!(
                "Discarding superseded load of {} (generation {})",
                outcome.path.display(),
                ticket.generation
            );
            return Applied::Discarded(ticket);
        }
        self.latest.remove(&ticket.target);

        let loaded = match outcome.result {
            Ok(loaded) => loaded,
            Err(err) => {
                log::error!("Failed to load file: {err}");
                self.status = Status::Error(err.to_string());
                return Applied::Failed(err);
            }
        };

        let points = loaded.series.len();
        let target_mode = match &ticket.target {
            LoadTarget::Single => {
                store.load_single(loaded.series);
                PlotMode::SingleFile
            }
            LoadTarget::Multi(_) => {
                store.add(loaded.series);
                PlotMode::MultiFile
            }
        };

        if store.mode() == target_mode {
            let detected = match target_mode {
                PlotMode::SingleFile => Ok(loaded.detected),
                PlotMode::MultiFile => store.detect_range(),
            };
            if let Ok(range) = detected {
                store.set_range(range);
                self.pending_range = None;
            }
            self.request_redraw(now);
        }

        self.status = if self.latest.is_empty() {
            Status::Message(format!("Loaded {points} data points"))
        } else {
            Status::Loading {
                pending: self.latest.len(),
            }
        };
        Applied::Loaded {
            target: ticket.target,
            points,
        }
    }

    /// Run one control-thread step: apply finished loads, then fire the
    /// debounced redraw if it is due. Each load is applied in full before
    /// anything reads the store for drawing.
    pub fn tick(&mut self, store: &mut SeriesStore, now: Instant) -> (Vec<Applied>, Option<Redraw>) {
        let mut finished: Vec<LoadOutcome> = self.inline.drain(..).collect();
        if let Some(worker) = &self.worker {
            finished.extend(worker.try_results());
        }
        let applied = finished
            .into_iter()
            .map(|outcome| self.apply_outcome(outcome, store, now))
            .collect();

        let redraw = self.debounce.poll(now).map(|generation| {
            self.content_dirty = false;
            if let Some(range) = self.pending_range.take() {
                store.set_range(range);
            }
            log::debug!("Redraw {generation} for {}", store.range());
            Redraw {
                generation,
                range: store.range(),
            }
        });
        (applied, redraw)
    }
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
