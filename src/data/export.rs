use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::filter::InRange;

/// Header written above the exported columns.
pub const EXPORT_HEADER: [&str; 2] = ["Energy(eV)", "DOS(states/eV)"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("nothing to export: {0}")]
    Empty(#[from] crate::data::range::RangeError),

    #[error(transparent)]
    NotLoaded(#[from] crate::state::StoreError),
}

/// `,` for `.csv` files, tab for anything else (`.txt`, `.dat`, ...).
pub fn delimiter_for(path: &Path) -> u8 {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv { b',' } else { b'\t' }
}

/// Write `(energy, value)` pairs as delimited text with a header row.
///
/// Floats are written at full precision so the file re-parses to the same
/// numbers.
pub fn write_points<W, I>(writer: W, delimiter: u8, points: I) -> Result<usize, ExportError>
where
    W: Write,
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    wtr.write_record(EXPORT_HEADER)?;

    let mut count = 0;
    for (energy, value) in points {
        wtr.serialize((energy, value))?;
        count += 1;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(count)
}

/// Export the in-range points of a series to `path`.
pub fn export_in_range(path: &Path, view: &InRange<'_>) -> Result<usize, ExportError> {
    let view = view.require_points()?;
    let file = std::fs::File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let count = write_points(file, delimiter_for(path), view.iter())?;
    log::info!("Exported {count} points to {}", path.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::filter_points_in_range;
    use crate::data::parser::parse;
    use crate::data::range::validate;

    #[test]
    fn writes_header_and_rows() {
        let mut buf = Vec::new();
        let n = write_points(&mut buf, b',', vec![(-1.5, 0.25), (2.0, 1.0)]).unwrap();
        assert_eq!(n, 2);
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Energy(eV),DOS(states/eV)"));
        assert_eq!(lines.next(), Some("-1.5,0.25"));
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn tab_export_round_trips_through_parser() {
        let series = parse("s", "-3 0.1\n-0.333333333333 0.123456789012345\n2 7\n9 9\n").unwrap();
        let view = filter_points_in_range(&series, validate(-5.0, 5.0).unwrap());

        let mut buf = Vec::new();
        write_points(&mut buf, b'\t', view.iter()).unwrap();
        let reparsed = parse("back", &String::from_utf8(buf).unwrap()).unwrap();

        let original: Vec<_> = view.iter().collect();
        let back: Vec<_> = reparsed.points().collect();
        assert_eq!(original.len(), back.len());
        for ((e0, v0), (e1, v1)) in original.iter().zip(&back) {
            assert!((e0 - e1).abs() < 1e-12);
            assert!((v0 - v1).abs() < 1e-12);
        }
    }

    #[test]
    fn delimiter_follows_extension() {
        assert_eq!(delimiter_for(Path::new("out.CSV")), b',');
        assert_eq!(delimiter_for(Path::new("out.txt")), b'\t');
        assert_eq!(delimiter_for(Path::new("out")), b'\t');
    }
}
