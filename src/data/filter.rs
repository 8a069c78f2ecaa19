use super::model::Series;
use super::range::{PlotRange, RangeError};

// ---------------------------------------------------------------------------
// In-range view of a series
// ---------------------------------------------------------------------------

/// The points of one series with `range.min <= energy <= range.max`.
///
/// The view borrows the series and only stores index bounds, so it is cheap
/// to copy and can be iterated any number of times.
#[derive(Debug, Clone, Copy)]
pub struct InRange<'a> {
    series: &'a Series,
    range: PlotRange,
    start: usize,
    end: usize,
}

impl<'a> InRange<'a> {
    pub fn series(&self) -> &'a Series {
        self.series
    }

    pub fn range(&self) -> PlotRange {
        self.range
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Iterate the in-range `(energy, value)` pairs from the start.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + Clone + 'a {
        let energy = &self.series.energies()[self.start..self.end];
        let value = &self.series.values()[self.start..self.end];
        energy.iter().copied().zip(value.iter().copied())
    }

    /// Turn an empty view into the "no data in range" condition.
    pub fn require_points(self) -> Result<Self, RangeError> {
        if self.is_empty() {
            Err(RangeError::EmptyResult {
                min: self.range.min(),
                max: self.range.max(),
            })
        } else {
            Ok(self)
        }
    }

    /// Lowest and highest value inside the window, `None` when empty.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.iter()
            .map(|(_, v)| (v, v))
            .reduce(|(lo, hi), (a, b)| (lo.min(a), hi.max(b)))
    }
}

impl<'a> IntoIterator for &InRange<'a> {
    type Item = (f64, f64);
    type IntoIter = Box<dyn Iterator<Item = (f64, f64)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Select the points of `series` inside `range` (inclusive on both ends).
///
/// Energies are sorted, so the bounds are found by binary search.
pub fn filter_points_in_range(series: &Series, range: PlotRange) -> InRange<'_> {
    let energies = series.energies();
    let start = energies.partition_point(|&e| e < range.min());
    let end = energies.partition_point(|&e| e <= range.max());
    InRange {
        series,
        range,
        start,
        end: end.max(start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parser::parse;
    use crate::data::range::validate;

    fn sample() -> Series {
        parse("s", "-3 30\n-1 10\n0 0\n1 11\n4 44\n").unwrap()
    }

    #[test]
    fn keeps_exactly_the_points_inside() {
        let s = sample();
        let view = filter_points_in_range(&s, validate(-2.0, 2.0).unwrap());
        let points: Vec<_> = view.iter().collect();
        assert_eq!(points, vec![(-1.0, 10.0), (0.0, 0.0), (1.0, 11.0)]);
        assert_eq!(view.len(), 3);
        assert_eq!(view.value_bounds(), Some((0.0, 11.0)));
    }

    #[test]
    fn bounds_are_inclusive() {
        let s = sample();
        let view = filter_points_in_range(&s, validate(-1.0, 1.0).unwrap());
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn view_can_be_consumed_twice() {
        let s = sample();
        let view = filter_points_in_range(&s, validate(-5.0, 5.0).unwrap());
        let first: Vec<_> = (&view).into_iter().collect();
        let second: Vec<_> = (&view).into_iter().collect();
        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_window_is_reported_distinctly() {
        let s = sample();
        let view = filter_points_in_range(&s, validate(100.0, 200.0).unwrap());
        assert_eq!(view.len(), 0);
        assert_eq!(view.iter().count(), 0);
        assert_eq!(
            view.require_points().unwrap_err(),
            RangeError::EmptyResult {
                min: 100.0,
                max: 200.0
            }
        );
    }
}
