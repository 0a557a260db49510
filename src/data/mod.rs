//! Observed data: CSV columns or the synthetic demo set.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::DataSource;
use crate::error::AppError;

pub mod sample;

pub use sample::*;

/// Paired `(x, y)` samples ready for a guess session.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Where the data came from, for headers and seed files.
    pub label: String,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn x_range(&self) -> Option<(f64, f64)> {
        finite_range(&self.x)
    }

    pub fn y_range(&self) -> Option<(f64, f64)> {
        finite_range(&self.y)
    }
}

/// A CSV row that could not be used.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

pub fn load_dataset(source: &DataSource) -> Result<Dataset, AppError> {
    match source {
        DataSource::Csv { path, x_col, y_col } => load_csv(path, x_col, y_col).map(|(data, _)| data),
        DataSource::Demo {
            seed,
            points,
            noise,
        } => generate_demo(*seed, *points, *noise),
    }
}

/// Read two numeric columns from a CSV file with a header row.
///
/// Rows with a missing or non-numeric value are skipped and reported back;
/// a file without a single usable row is an error.
pub fn load_csv(path: &Path, x_col: &str, y_col: &str) -> Result<(Dataset, Vec<RowError>), AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let x_idx = column_index(&header_map, x_col)?;
    let y_idx = column_index(&header_map, y_col)?;

    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut row_errors = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match (parse_cell(&record, x_idx, x_col), parse_cell(&record, y_idx, y_col)) {
            (Ok(xv), Ok(yv)) => {
                x.push(xv);
                y.push(yv);
            }
            (Err(message), _) | (_, Err(message)) => row_errors.push(RowError { line, message }),
        }
    }

    for err in &row_errors {
        warn!(line = err.line, message = %err.message, "skipped CSV row");
    }
    if y.is_empty() {
        return Err(AppError::new(
            3,
            format!("No usable rows in '{}' for columns '{x_col}', '{y_col}'.", path.display()),
        ));
    }
    debug!(path = %path.display(), rows = y.len(), skipped = row_errors.len(), "loaded CSV");

    let data = Dataset {
        x,
        y,
        label: format!("{} ({x_col}, {y_col})", path.display()),
    };
    Ok((data, row_errors))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may carry a BOM on the first header.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn column_index(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, AppError> {
    header_map
        .get(&normalize_header_name(name))
        .copied()
        .ok_or_else(|| {
            let mut known: Vec<&str> = header_map.keys().map(String::as_str).collect();
            known.sort_unstable();
            AppError::new(
                2,
                format!("CSV has no column '{name}' (columns: {}).", known.join(", ")),
            )
        })
}

fn parse_cell(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing value for '{name}'"))?;
    let v: f64 = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a number in '{name}'"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("non-finite value in '{name}'"))
    }
}

fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    (lo.is_finite() && hi.is_finite()).then_some((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("guess_curves_{}_{name}", std::process::id()));
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_named_columns_and_skips_bad_rows() {
        let path = write_temp(
            "cols.csv",
            "\u{feff}Time, Signal ,other\n0,1.5,x\n1,oops,y\n2,,z\n3,4.0,w\n",
        );
        let (data, errors) = load_csv(&path, "time", "signal").unwrap();
        assert_eq!(data.x, vec![0.0, 3.0]);
        assert_eq!(data.y, vec![1.5, 4.0]);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].line, 3);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn unknown_column_is_an_input_error() {
        let path = write_temp("missing.csv", "a,b\n1,2\n");
        let err = load_csv(&path, "a", "c").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("'c'"));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn file_without_usable_rows_is_rejected() {
        let path = write_temp("empty.csv", "x,y\n1,\n");
        let err = load_csv(&path, "x", "y").unwrap_err();
        assert_eq!(err.exit_code(), 3);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn ranges_ignore_non_finite() {
        let data = Dataset {
            x: vec![1.0, f64::NAN, -2.0],
            y: vec![0.0, 1.0, 2.0],
            label: String::new(),
        };
        assert_eq!(data.x_range(), Some((-2.0, 1.0)));
        assert_eq!(data.y_range(), Some((0.0, 2.0)));
    }
}
