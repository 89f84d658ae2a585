//! Per-dataset hysteresis analysis.
//!
//! Drives the full reduction for one configured dataset: read the
//! current/flux file, convert current to field strength, then extract
//! coercivity, remanence, and the enclosed loop area. Batch processing
//! isolates failures: a missing or empty dataset is logged and skipped
//! while the remaining datasets continue.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::{DatasetConfig, PipelineConfig};
use crate::core::table::{self, Series};
use crate::processors::loop_geometry::{analyze_loop, LoopSummary};

/// One fully reduced hysteresis dataset.
#[derive(Debug, Clone)]
pub struct HysteresisReport {
    /// Material title from the dataset config.
    pub title: String,
    /// Source file path.
    pub path: PathBuf,
    /// Field/flux series after unit conversion (H in A/m, B in mT).
    pub loop_data: Series,
    /// Coercivity, remanence, and raw area.
    pub summary: LoopSummary,
    /// Loop area scaled to J/m³.
    pub energy_loss: f64,
}

/// Analyze one dataset file.
///
/// # Errors
///
/// Fails when the file is missing or contains no numeric rows; callers in
/// batch mode downgrade this to a warning.
pub fn analyze_dataset(
    data_dir: &Path,
    dataset: &DatasetConfig,
    config: &PipelineConfig,
) -> Result<HysteresisReport> {
    let path = data_dir.join(&dataset.file);

    let raw = table::read_two_columns(&path, &config.reader)
        .with_context(|| format!("failed to read dataset '{}'", path.display()))?;

    info!(
        "{}: {} samples, I in [{:.3}, {:.3}] A",
        dataset.title,
        raw.len(),
        raw.x.iter().cloned().fold(f64::INFINITY, f64::min),
        raw.x.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    );

    // H = h_factor * I, B stays in mT.
    let loop_data = raw.scale_x(dataset.h_factor);

    let summary = analyze_loop(
        &loop_data.x,
        &loop_data.y,
        config.loop_geometry.salience_window,
    );
    let energy_loss = summary.area * config.loop_geometry.area_scale;

    Ok(HysteresisReport {
        title: dataset.title.clone(),
        path,
        loop_data,
        summary,
        energy_loss,
    })
}

/// Analyze every configured dataset under `data_dir`.
///
/// Missing and empty datasets are logged and skipped; the returned reports
/// cover only the datasets that reduced successfully.
pub fn analyze_batch(data_dir: &Path, config: &PipelineConfig) -> Vec<HysteresisReport> {
    let mut reports = Vec::new();

    for dataset in &config.datasets {
        match analyze_dataset(data_dir, dataset, config) {
            Ok(report) => reports.push(report),
            Err(e) => warn!("skipping dataset '{}': {:#}", dataset.file, e),
        }
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_dataset(dir: &Path, name: &str, rows: &[(f64, f64)]) {
        let mut content = String::from("Current\tFlux density B\nI/A\tB/mT\n");
        for (i, b) in rows {
            content.push_str(&format!("{i:.3}\t{b:.3}\n"));
        }
        fs::write(dir.join(name), content).unwrap();
    }

    fn loop_rows() -> Vec<(f64, f64)> {
        vec![
            (0.4, 300.0),
            (0.2, 250.0),
            (0.04, 140.0),
            (-0.04, 100.0),
            (-0.2, -80.0),
            (-0.4, -300.0),
            (-0.2, -250.0),
            (-0.04, -135.0),
            (0.04, -95.0),
            (0.2, 85.0),
            (0.4, 300.0),
        ]
    }

    #[test]
    fn test_analyze_dataset_converts_units() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path(), "run1laminatediron", &loop_rows());

        let config = PipelineConfig::default();
        let report = analyze_dataset(dir.path(), &config.datasets[0], &config).unwrap();

        assert_eq!(report.loop_data.len(), 11);
        assert!((report.loop_data.x[0] - 0.4 * 2459.0).abs() < 1e-9);
        assert!(report.summary.remanence.is_some());
        assert!(report.summary.area > 0.0);
        assert!((report.energy_loss - report.summary.area * 1e-3).abs() < 1e-9);
    }

    #[test]
    fn test_missing_dataset_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default();
        assert!(analyze_dataset(dir.path(), &config.datasets[0], &config).is_err());
    }

    #[test]
    fn test_batch_skips_missing_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        // Only the second configured dataset exists.
        write_dataset(dir.path(), "run1softiron", &loop_rows());

        let config = PipelineConfig::default();
        let reports = analyze_batch(dir.path(), &config);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].title, "Soft Iron");
    }

    #[test]
    fn test_batch_with_no_datasets_is_empty_not_error() {
        // A directory with none of the configured files yields zero
        // reports; the batch itself still completes normally.
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default();
        let reports = analyze_batch(dir.path(), &config);
        assert!(reports.is_empty());
    }
}
