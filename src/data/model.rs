use std::fmt;

// ---------------------------------------------------------------------------
// Row – one parsed data line before the series is assembled
// ---------------------------------------------------------------------------

/// A single numeric row: `energy value [aux...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub energy: f64,
    pub value: f64,
    /// Extra columns (spin-up, spin-down, integrated DOS, ...) by position.
    pub aux: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Series – one loaded file
// ---------------------------------------------------------------------------

/// An immutable energy/value series, sorted ascending by energy.
///
/// Construction goes through [`Series::from_rows`], which guarantees at
/// least one point and a non-decreasing energy axis. Rows with equal
/// energies keep their original relative order.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    source_id: String,
    /// Energy axis (x), non-decreasing.
    energy: Vec<f64>,
    /// Total DOS (y) – same length as `energy`.
    value: Vec<f64>,
    /// Auxiliary columns per point – same length as `energy`.
    aux: Vec<Vec<f64>>,
}

impl Series {
    /// Assemble a series from parsed rows. Returns `None` when `rows` is empty.
    pub fn from_rows(source_id: impl Into<String>, mut rows: Vec<Row>) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        // `sort_by` is stable, so ties stay in file order.
        rows.sort_by(|a, b| a.energy.total_cmp(&b.energy));

        let mut energy = Vec::with_capacity(rows.len());
        let mut value = Vec::with_capacity(rows.len());
        let mut aux = Vec::with_capacity(rows.len());
        for row in rows {
            energy.push(row.energy);
            value.push(row.value);
            aux.push(row.aux);
        }

        Some(Series {
            source_id: source_id.into(),
            energy,
            value,
            aux,
        })
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Number of points (always ≥ 1).
    pub fn len(&self) -> usize {
        self.energy.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }

    pub fn energies(&self) -> &[f64] {
        &self.energy
    }

    pub fn values(&self) -> &[f64] {
        &self.value
    }

    /// Auxiliary columns of point `index`, empty for 2-column data.
    pub fn aux(&self, index: usize) -> &[f64] {
        self.aux.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(energy, value)` pairs in ascending energy order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + Clone + '_ {
        self.energy.iter().copied().zip(self.value.iter().copied())
    }

    /// Lowest and highest energy.
    pub fn energy_bounds(&self) -> (f64, f64) {
        // Sorted and non-empty by construction.
        (self.energy[0], self.energy[self.energy.len() - 1])
    }

    /// Summary numbers shown as file info.
    pub fn stats(&self) -> SeriesStats {
        let (energy_min, energy_max) = self.energy_bounds();
        let value_min = self.value.iter().copied().fold(f64::INFINITY, f64::min);
        let value_max = self.value.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let value_mean = self.value.iter().sum::<f64>() / self.value.len() as f64;

        let fermi = self
            .points()
            .min_by(|a, b| a.0.abs().total_cmp(&b.0.abs()))
            .unwrap_or((energy_min, self.value[0]));

        SeriesStats {
            points: self.len(),
            energy_min,
            energy_max,
            value_min,
            value_max,
            value_mean,
            fermi_energy: fermi.0,
            fermi_value: fermi.1,
        }
    }
}

// ---------------------------------------------------------------------------
// SeriesStats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub points: usize,
    pub energy_min: f64,
    pub energy_max: f64,
    pub value_min: f64,
    pub value_max: f64,
    pub value_mean: f64,
    /// Energy of the point closest to the Fermi level (0 eV).
    pub fermi_energy: f64,
    /// DOS at that point.
    pub fermi_value: f64,
}

impl fmt::Display for SeriesStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Data Points: {}", self.points)?;
        writeln!(
            f,
            "Energy Range: {:.3} to {:.3} eV",
            self.energy_min, self.energy_max
        )?;
        writeln!(
            f,
            "DOS Range: {:.3} to {:.3} states/eV",
            self.value_min, self.value_max
        )?;
        writeln!(f, "Average DOS: {:.3} states/eV", self.value_mean)?;
        write!(
            f,
            "DOS at Fermi level ({:.3} eV): {:.3} states/eV",
            self.fermi_energy, self.fermi_value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(energy: f64, value: f64) -> Row {
        Row {
            energy,
            value,
            aux: Vec::new(),
        }
    }

    #[test]
    fn from_rows_rejects_empty_input() {
        assert!(Series::from_rows("empty", Vec::new()).is_none());
    }

    #[test]
    fn from_rows_sorts_and_keeps_ties_in_order() {
        let series = Series::from_rows(
            "s",
            vec![row(1.0, 10.0), row(-1.0, 20.0), row(1.0, 30.0), row(0.0, 40.0)],
        )
        .unwrap();
        assert_eq!(series.energies(), &[-1.0, 0.0, 1.0, 1.0]);
        assert_eq!(series.values(), &[20.0, 40.0, 10.0, 30.0]);
    }

    #[test]
    fn stats_report_fermi_point() {
        let series = Series::from_rows(
            "s",
            vec![row(-2.0, 1.0), row(-0.1, 3.0), row(0.4, 5.0), row(2.0, 7.0)],
        )
        .unwrap();
        let stats = series.stats();
        assert_eq!(stats.points, 4);
        assert_eq!(stats.energy_min, -2.0);
        assert_eq!(stats.energy_max, 2.0);
        assert_eq!(stats.value_min, 1.0);
        assert_eq!(stats.value_max, 7.0);
        assert_eq!(stats.value_mean, 4.0);
        assert_eq!(stats.fermi_energy, -0.1);
        assert_eq!(stats.fermi_value, 3.0);
    }
}
