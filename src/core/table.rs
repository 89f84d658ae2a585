//! Tabular reader for two-column delimited measurement files.
//!
//! Instrument exports are tab- or whitespace-delimited text with optional
//! header rows and the occasional stray annotation line. The reader skips
//! headers by label, silently drops rows that do not parse as two real
//! numbers, and preserves acquisition order (which encodes the sweep
//! direction for hysteresis data).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::config::ReaderConfig;

/// Errors that can occur while reading a measurement file.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no numeric data rows in {0}")]
    NoData(PathBuf),
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;

/// A pair of equal-length measurement columns, in acquisition order.
#[derive(Debug, Clone, Default)]
pub struct Series {
    /// Independent variable (e.g. drive current or field H).
    pub x: Vec<f64>,
    /// Dependent variable (e.g. flux density B).
    pub y: Vec<f64>,
}

impl Series {
    /// Creates an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a series from paired columns.
    ///
    /// Panics in debug builds if the columns differ in length; equal length
    /// is an invariant of this type.
    pub fn from_columns(x: Vec<f64>, y: Vec<f64>) -> Self {
        debug_assert_eq!(x.len(), y.len());
        Self { x, y }
    }

    /// Number of paired samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns true if the series holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Appends one paired sample.
    #[inline]
    pub fn push(&mut self, x: f64, y: f64) {
        self.x.push(x);
        self.y.push(y);
    }

    /// Returns a copy with every x multiplied by `factor`.
    ///
    /// Used for the unit conversion H = h_factor * I.
    pub fn scale_x(&self, factor: f64) -> Series {
        Series {
            x: self.x.iter().map(|v| v * factor).collect(),
            y: self.y.clone(),
        }
    }

    /// Paired samples as (x, y) tuples.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.x.iter().copied().zip(self.y.iter().copied()).collect()
    }
}

/// Case-insensitive match of a token against a label set.
fn is_label(token: &str, labels: &[String]) -> bool {
    let token = token.trim().to_lowercase();
    labels.iter().any(|l| l.eq_ignore_ascii_case(&token))
}

/// Splits a row into fields using the configured delimiter.
///
/// A tab delimiter doubles as "any whitespace" so that space-padded exports
/// parse the same way as the original tab-separated files.
fn split_fields(line: &str, delimiter: char) -> Vec<&str> {
    if delimiter == '\t' {
        line.split_whitespace().collect()
    } else {
        line.split(delimiter).map(str::trim).collect()
    }
}

/// Read a two-column measurement file into a [`Series`].
///
/// - Blank rows and rows with fewer than two fields are skipped.
/// - Rows whose first field matches a recognised x-label, or whose second
///   field matches a recognised y-label, are treated as headers and skipped.
/// - Rows where either field fails to parse as a real number are silently
///   dropped; instrument exports often contain stray annotations.
///
/// # Errors
///
/// Returns [`TableError::NoData`] if no valid data rows remain after
/// filtering. Callers should treat this as "missing dataset" and skip the
/// downstream analysis rather than abort the whole batch.
pub fn read_two_columns<P: AsRef<Path>>(path: P, config: &ReaderConfig) -> Result<Series> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut series = Series::new();
    let mut skipped = 0usize;

    for line in reader.lines() {
        let line = line?;
        let fields = split_fields(&line, config.delimiter);

        if fields.len() < 2 {
            continue;
        }
        if is_label(fields[0], &config.x_labels) || is_label(fields[1], &config.y_labels) {
            continue;
        }

        match (fields[0].trim().parse::<f64>(), fields[1].trim().parse::<f64>()) {
            (Ok(x), Ok(y)) => series.push(x, y),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(
            "{}: dropped {} non-numeric row(s)",
            path.display(),
            skipped
        );
    }

    if series.is_empty() {
        return Err(TableError::NoData(path.to_path_buf()));
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_basic_tab_file() {
        let file = write_temp("Current\tFlux density B\n0.5\t120.0\n-0.5\t-118.0\n");
        let series = read_two_columns(file.path(), &ReaderConfig::default()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.x, vec![0.5, -0.5]);
        assert_eq!(series.y, vec![120.0, -118.0]);
    }

    #[test]
    fn test_columns_always_equal_length() {
        let file = write_temp("1.0\t2.0\nnot-a-number\t3.0\n4.0\n5.0\t6.0\n");
        let series = read_two_columns(file.path(), &ReaderConfig::default()).unwrap();
        assert_eq!(series.x.len(), series.y.len());
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_header_skipped_anywhere_in_file() {
        let file = write_temp("1.0\t2.0\nI/A\tB/mT\n3.0\t4.0\n");
        let series = read_two_columns(file.path(), &ReaderConfig::default()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.x, vec![1.0, 3.0]);
    }

    #[test]
    fn test_header_match_is_case_insensitive() {
        let file = write_temp("CURRENT\tFLUX DENSITY B\n0.1\t0.2\n");
        let series = read_two_columns(file.path(), &ReaderConfig::default()).unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_whitespace_delimited_rows() {
        let file = write_temp("  0.25   11.5\n 0.50   23.0\n");
        let series = read_two_columns(file.path(), &ReaderConfig::default()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.y[1], 23.0);
    }

    #[test]
    fn test_empty_file_is_no_data() {
        let file = write_temp("Current\tB/mT\n\n");
        let result = read_two_columns(file.path(), &ReaderConfig::default());
        assert!(matches!(result, Err(TableError::NoData(_))));
    }

    #[test]
    fn test_scale_x() {
        let series = Series::from_columns(vec![1.0, -2.0], vec![5.0, 6.0]);
        let scaled = series.scale_x(2459.0);
        assert_eq!(scaled.x, vec![2459.0, -4918.0]);
        assert_eq!(scaled.y, vec![5.0, 6.0]);
    }
}
