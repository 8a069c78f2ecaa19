use std::fmt;

use thiserror::Error;

use crate::data::model::Series;
use crate::data::range::{self, PlotRange};

// ---------------------------------------------------------------------------
// Plot mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlotMode {
    #[default]
    SingleFile,
    MultiFile,
}

impl fmt::Display for PlotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotMode::SingleFile => f.write_str("single-file"),
            PlotMode::MultiFile => f.write_str("multi-file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no {0} data loaded")]
    NotLoaded(PlotMode),

    #[error("'{0}' is not in the comparison list")]
    UnknownSource(String),
}

/// Result of adding a series to the comparison list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Appended(usize),
    /// A series with the same `source_id` was swapped out at this position.
    Replaced(usize),
}

// ---------------------------------------------------------------------------
// Series store
// ---------------------------------------------------------------------------

/// Loaded data for both plot modes plus the active energy window.
///
/// The single-file slot and the comparison list are independent: switching
/// mode never drops the other mode's data.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    single: Option<Series>,
    /// Comparison list in insertion order, unique by `source_id`.
    multi: Vec<Series>,
    mode: PlotMode,
    range: PlotRange,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> PlotMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PlotMode) {
        self.mode = mode;
    }

    pub fn range(&self) -> PlotRange {
        self.range
    }

    pub fn set_range(&mut self, range: PlotRange) {
        self.range = range;
    }

    /// Replace the single-file series, returning the previous one.
    pub fn load_single(&mut self, series: Series) -> Option<Series> {
        self.single.replace(series)
    }

    pub fn single(&self) -> Option<&Series> {
        self.single.as_ref()
    }

    /// Add to the comparison list; an existing `source_id` is replaced in place.
    pub fn add(&mut self, series: Series) -> AddOutcome {
        match self.position(series.source_id()) {
            Some(idx) => {
                self.multi[idx] = series;
                AddOutcome::Replaced(idx)
            }
            None => {
                self.multi.push(series);
                AddOutcome::Appended(self.multi.len() - 1)
            }
        }
    }

    pub fn remove(&mut self, source_id: &str) -> Result<Series, StoreError> {
        let idx = self
            .position(source_id)
            .ok_or_else(|| StoreError::UnknownSource(source_id.to_string()))?;
        Ok(self.multi.remove(idx))
    }

    /// Remove every listed id that is present; returns how many went away.
    pub fn remove_selected<'a>(&mut self, source_ids: impl IntoIterator<Item = &'a str>) -> usize {
        source_ids
            .into_iter()
            .filter(|id| self.remove(id).is_ok())
            .count()
    }

    pub fn clear_multi(&mut self) {
        self.multi.clear();
    }

    pub fn multi(&self) -> &[Series] {
        &self.multi
    }

    pub fn position(&self, source_id: &str) -> Option<usize> {
        self.multi.iter().position(|s| s.source_id() == source_id)
    }

    /// Series plotted in the current mode: zero or one in single-file mode,
    /// the comparison list in multi-file mode.
    pub fn active_series(&self) -> &[Series] {
        match self.mode {
            PlotMode::SingleFile => self.single.as_slice(),
            PlotMode::MultiFile => &self.multi,
        }
    }

    /// Whether the current mode has nothing to plot.
    pub fn is_empty(&self) -> bool {
        self.active_series().is_empty()
    }

    /// Window spanning the active data (union of all files in multi mode).
    pub fn detect_range(&self) -> Result<PlotRange, StoreError> {
        range::auto_detect(self.active_series()).ok_or(StoreError::NotLoaded(self.mode))
    }

    /// Window equal to the active data's own bounds.
    pub fn data_range(&self) -> Result<PlotRange, StoreError> {
        range::clamp_to_data(self.active_series()).ok_or(StoreError::NotLoaded(self.mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parser::parse;

    fn series(id: &str, text: &str) -> Series {
        parse(id, text).unwrap()
    }

    #[test]
    fn single_slot_is_replaced_wholesale() {
        let mut store = SeriesStore::new();
        assert!(store.is_empty());
        assert!(store.load_single(series("a", "0 1\n")).is_none());
        let old = store.load_single(series("b", "1 2\n")).unwrap();
        assert_eq!(old.source_id(), "a");
        assert_eq!(store.active_series().len(), 1);
        assert_eq!(store.active_series()[0].source_id(), "b");
    }

    #[test]
    fn duplicate_add_replaces_in_place() {
        let mut store = SeriesStore::new();
        store.add(series("w", "0 1\n"));
        assert_eq!(store.add(series("x", "0 1\n")), AddOutcome::Appended(1));
        store.add(series("y", "0 1\n"));
        assert_eq!(store.add(series("x", "5 9\n6 9\n")), AddOutcome::Replaced(1));

        let ids: Vec<_> = store.multi().iter().map(Series::source_id).collect();
        assert_eq!(ids, vec!["w", "x", "y"]);
        assert_eq!(store.multi()[1].energies(), &[5.0, 6.0]);
    }

    #[test]
    fn remove_and_clear() {
        let mut store = SeriesStore::new();
        for id in ["a", "b", "c"] {
            store.add(series(id, "0 1\n"));
        }
        assert_eq!(
            store.remove("zzz").unwrap_err(),
            StoreError::UnknownSource("zzz".to_string())
        );
        assert_eq!(store.remove_selected(["a", "c", "nope"]), 2);
        assert_eq!(store.multi().len(), 1);
        store.clear_multi();
        assert!(store.multi().is_empty());
    }

    #[test]
    fn modes_keep_their_own_data() {
        let mut store = SeriesStore::new();
        store.load_single(series("single", "-1 1\n1 1\n"));
        store.set_mode(PlotMode::MultiFile);
        assert!(store.is_empty());
        assert_eq!(store.detect_range(), Err(StoreError::NotLoaded(PlotMode::MultiFile)));

        store.add(series("m", "-4 1\n4 1\n"));
        store.set_mode(PlotMode::SingleFile);
        assert_eq!(store.active_series()[0].source_id(), "single");
        store.set_mode(PlotMode::MultiFile);
        assert_eq!(store.active_series()[0].source_id(), "m");
    }

    #[test]
    fn detect_uses_the_active_mode() {
        let mut store = SeriesStore::new();
        store.load_single(series("s", "-1 1\n1 1\n"));
        store.add(series("a", "-5 1\n5 1\n"));
        store.add(series("b", "-8 1\n3 1\n"));

        let single = store.detect_range().unwrap();
        assert_eq!((single.min(), single.max()), (-1.0, 1.0));

        store.set_mode(PlotMode::MultiFile);
        let multi = store.data_range().unwrap();
        assert_eq!((multi.min(), multi.max()), (-8.0, 5.0));
    }
}
