use thiserror::Error;

use super::model::{Row, Series};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Nothing numeric survived comment/blank/malformed filtering.
    #[error("no valid data found (expected at least two numeric columns per line)")]
    EmptyData,

    /// A non-comment line without two numeric tokens. Collected, never fatal.
    #[error("line {line}: expected `energy value [...]`, got {content:?}")]
    MalformedLine { line: usize, content: String },
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Outcome of a parse that also keeps track of skipped lines.
#[derive(Debug, Clone)]
pub struct ParseReport {
    pub series: Series,
    /// One [`ParseError::MalformedLine`] per skipped data line.
    pub skipped: Vec<ParseError>,
}

/// Parse raw DOS text into a [`Series`].
///
/// Accepted layout, one point per line:
///
/// ```text
/// # Energy Total_DOS Spin_Up Spin_Down
/// -10.000000 0.000123 0.000061 0.000061
/// -9.899497  0.000210 0.000105 0.000105
/// ```
///
/// * `#` lines and blank lines are skipped.
/// * Tokens are split on runs of whitespace; commas count as separators
///   too, so exported CSV files read back in.
/// * Column 1 is energy, column 2 total DOS, anything after is kept as
///   auxiliary data.
/// * Lines without two finite leading numbers are skipped.
pub fn parse(source_id: &str, raw_text: &str) -> Result<Series, ParseError> {
    parse_with_report(source_id, raw_text).map(|report| report.series)
}

/// Same as [`parse`] but returns the skipped-line diagnostics as well.
pub fn parse_with_report(source_id: &str, raw_text: &str) -> Result<ParseReport, ParseError> {
    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for (idx, line) in raw_text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_row(trimmed) {
            Some(row) => rows.push(row),
            None => skipped.push(ParseError::MalformedLine {
                line: idx + 1,
                content: trimmed.to_string(),
            }),
        }
    }

    let series = Series::from_rows(source_id, rows).ok_or(ParseError::EmptyData)?;
    Ok(ParseReport { series, skipped })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|tok| !tok.is_empty())
}

fn parse_finite(tok: &str) -> Option<f64> {
    tok.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_row(line: &str) -> Option<Row> {
    let mut toks = tokens(line);
    let energy = parse_finite(toks.next()?)?;
    let value = parse_finite(toks.next()?)?;
    // Auxiliary columns stop at the first non-numeric token (trailing notes).
    let aux = toks.map_while(|tok| tok.parse::<f64>().ok()).collect();
    Some(Row { energy, value, aux })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VASP_STYLE: &str = "\
# Energy Total_DOS Spin_Up Spin_Down Integrated_Up Integrated_Down
  -3.0   0.10  0.05  0.05  1.0  1.0

-1.0\t0.30\t0.15\t0.15\t2.0\t2.0
   # indented comment
0.0 0.50  0.25 0.25 3.0 3.0
";

    #[test]
    fn parses_wide_columns_and_keeps_aux() {
        let series = parse("dos0", VASP_STYLE).unwrap();
        assert_eq!(series.source_id(), "dos0");
        assert_eq!(series.energies(), &[-3.0, -1.0, 0.0]);
        assert_eq!(series.values(), &[0.10, 0.30, 0.50]);
        assert_eq!(series.aux(1), &[0.15, 0.15, 2.0, 2.0]);
    }

    #[test]
    fn parses_minimal_two_columns() {
        let series = parse("two", "1 2\n3 4\n").unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.aux(0).is_empty());
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let text = "Energy(eV)\tDOS\n1.0 2.0\nabc def\n3.0\n2.0 nan\n4.0 5.0 junk\n";
        let report = parse_with_report("x", text).unwrap();
        assert_eq!(report.series.energies(), &[1.0, 4.0]);
        assert_eq!(report.skipped.len(), 4);
        assert_eq!(
            report.skipped[0],
            ParseError::MalformedLine {
                line: 1,
                content: "Energy(eV)\tDOS".to_string()
            }
        );
    }

    #[test]
    fn only_comments_is_empty_data() {
        assert_eq!(parse("x", "# a\n\n   \n# b\n"), Err(ParseError::EmptyData));
        assert_eq!(parse("x", ""), Err(ParseError::EmptyData));
        assert_eq!(parse("x", "foo bar\n"), Err(ParseError::EmptyData));
    }

    #[test]
    fn unordered_input_comes_out_sorted() {
        let series = parse("x", "5 1\n-2 2\n3 3\n-2 4\n").unwrap();
        assert!(series.energies().windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(series.values(), &[2.0, 4.0, 3.0, 1.0]);
    }

    #[test]
    fn parsing_twice_is_identical() {
        assert_eq!(parse("x", VASP_STYLE), parse("x", VASP_STYLE));
    }

    #[test]
    fn comma_separated_export_reads_back() {
        let series = parse("csv", "Energy(eV),DOS(states/eV)\n-1.5,0.25\n2,0.75\n").unwrap();
        assert_eq!(series.energies(), &[-1.5, 2.0]);
        assert_eq!(series.values(), &[0.25, 0.75]);
    }
}
