use std::path::PathBuf;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::data::loader::{LoadError, load_file};
use crate::data::model::Series;
use crate::data::range::{self, PlotRange};

// ---------------------------------------------------------------------------
// Jobs and outcomes
// ---------------------------------------------------------------------------

/// Which store slot a load is meant for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoadTarget {
    /// The single-file slot.
    Single,
    /// The comparison list entry with this `source_id`.
    Multi(String),
}

/// Identifies one load request; newer generations supersede older ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub target: LoadTarget,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct LoadJob {
    pub ticket: LoadTicket,
    pub path: PathBuf,
}

/// A parsed file plus the window detected from it alone.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: Series,
    pub detected: PlotRange,
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub ticket: LoadTicket,
    pub path: PathBuf,
    pub result: Result<LoadedSeries, LoadError>,
}

/// Parse a file and detect its range. Runs on the worker thread.
pub fn run_job(job: LoadJob) -> LoadOutcome {
    let result = load_file(&job.path).map(|series| {
        // A parsed series always has at least one point.
        let detected = range::auto_detect(std::slice::from_ref(&series)).unwrap_or_default();
        LoadedSeries { series, detected }
    });
    LoadOutcome {
        ticket: job.ticket,
        path: job.path,
        result,
    }
}

// ---------------------------------------------------------------------------
// Worker thread
// ---------------------------------------------------------------------------

/// One background thread that loads files in submission order.
///
/// The worker never touches the store; outcomes come back over a channel
/// and the control thread decides whether to apply them.
pub struct LoadWorker {
    jobs: Option<mpsc::Sender<LoadJob>>,
    results: mpsc::Receiver<LoadOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl LoadWorker {
    /// Start the worker. `notify` runs after every finished job (e.g. to
    /// wake the UI).
    pub fn spawn(notify: impl Fn() + Send + 'static) -> std::io::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<LoadJob>();
        let (result_tx, result_rx) = mpsc::channel();

        let handle = std::thread::Builder::new()
            .name("dos-loader".to_string())
            .spawn(move || {
                for job in job_rx {
                    log::debug!(
                        "Loading {} (generation {})",
                        job.path.display(),
                        job.ticket.generation
                    );
                    if result_tx.send(run_job(job)).is_err() {
                        break;
                    }
                    notify();
                }
            })?;

        Ok(Self {
            jobs: Some(job_tx),
            results: result_rx,
            handle: Some(handle),
        })
    }

    /// Queue a job. Returns the job back if the thread is gone.
    pub fn submit(&self, job: LoadJob) -> Result<(), LoadJob> {
        match &self.jobs {
            Some(tx) => tx.send(job).map_err(|err| err.0),
            None => Err(job),
        }
    }

    /// Finished outcomes, without blocking.
    pub fn try_results(&self) -> impl Iterator<Item = LoadOutcome> + '_ {
        self.results.try_iter()
    }

    /// Block for the next outcome, up to `timeout`.
    pub fn wait(&self, timeout: Duration) -> Option<LoadOutcome> {
        self.results.recv_timeout(timeout).ok()
    }
}

impl Drop for LoadWorker {
    fn drop(&mut self) {
        // Closing the job channel ends the thread's loop.
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Loader thread panicked");
            }
        }
    }
}
