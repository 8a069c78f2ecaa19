use std::path::{Path, PathBuf};

use thiserror::Error;

use super::model::Series;
use super::parser::{ParseError, parse_with_report};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

impl LoadError {
    /// The file the failure refers to.
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Io { path, .. } | LoadError::Parse { path, .. } => path,
        }
    }
}

/// Read and parse a DOS text file.
///
/// The series' `source_id` is the path exactly as given, which is what the
/// legend labels and duplicate detection work from.
pub fn load_file(path: &Path) -> Result<Series, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let report = parse_with_report(&path.to_string_lossy(), &text).map_err(|source| {
        LoadError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;

    if !report.skipped.is_empty() {
        log::debug!(
            "{}: skipped {} malformed line(s), first: {}",
            path.display(),
            report.skipped.len(),
            report.skipped[0]
        );
    }
    let (lo, hi) = report.series.energy_bounds();
    log::info!(
        "Loaded {} points from {} ({lo:.3} to {hi:.3} eV)",
        report.series.len(),
        path.display()
    );
    Ok(report.series)
}
