//! In-place dataset rewriting.
//!
//! Some runs were recorded with the sense coil wired in reverse; negating
//! every reading flips the loop back into the conventional orientation.
//! Header rows and rows that do not parse as two numbers are preserved
//! byte-for-byte.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::config::ReaderConfig;

/// Errors that can occur while rewriting a dataset.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to read the original file.
    #[error("failed to read '{path}': {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the rewritten file.
    #[error("failed to write '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

fn is_label(token: &str, labels: &[String]) -> bool {
    let token = token.trim().to_lowercase();
    labels.iter().any(|l| l.eq_ignore_ascii_case(&token))
}

/// Negate every numeric row of a two-column dataset, in place.
///
/// Numeric rows are rewritten as `{-x:.3}\t{-y:.3}`; everything else
/// (headers, blank lines, annotations) passes through unchanged. With
/// `dry_run` set, the file is left untouched.
///
/// Returns the number of rows that were negated.
pub fn negate_in_place(path: &Path, config: &ReaderConfig, dry_run: bool) -> Result<usize> {
    let content = fs::read_to_string(path).map_err(|e| WriteError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut output = String::with_capacity(content.len());
    let mut negated = 0usize;

    for line in content.lines() {
        let fields: Vec<&str> = line.split('\t').collect();

        let rewritten = if fields.len() == 2
            && !is_label(fields[0], &config.x_labels)
            && !is_label(fields[1], &config.y_labels)
        {
            match (fields[0].trim().parse::<f64>(), fields[1].trim().parse::<f64>()) {
                (Ok(x), Ok(y)) => {
                    negated += 1;
                    Some(format!("{:.3}\t{:.3}", -x, -y))
                }
                _ => None,
            }
        } else {
            None
        };

        match rewritten {
            Some(row) => output.push_str(&row),
            None => output.push_str(line),
        }
        output.push('\n');
    }

    if !dry_run {
        let file = File::create(path).map_err(|e| WriteError::WriteFile {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(output.as_bytes())
            .map_err(|e| WriteError::WriteFile {
                path: path.display().to_string(),
                source: e,
            })?;
    }

    Ok(negated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_negate_preserves_headers_and_annotations() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Current\tFlux density B\n0.500\t120.000\nnote: coil warm\n-0.250\t-60.000\n")
            .unwrap();

        let count = negate_in_place(file.path(), &ReaderConfig::default(), false).unwrap();
        assert_eq!(count, 2);

        let content = fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Current\tFlux density B");
        assert_eq!(lines[1], "-0.500\t-120.000");
        assert_eq!(lines[2], "note: coil warm");
        assert_eq!(lines[3], "0.250\t60.000");
    }

    #[test]
    fn test_dry_run_leaves_file_unchanged() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"1.000\t2.000\n").unwrap();

        let count = negate_in_place(file.path(), &ReaderConfig::default(), true).unwrap();
        assert_eq!(count, 1);
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "1.000\t2.000\n");
    }
}
