//! Configuration types for the lab pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the two-column tabular reader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Field delimiter (single byte, default tab).
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Header labels recognised in the first column (case-insensitive).
    #[serde(default = "default_x_labels")]
    pub x_labels: Vec<String>,

    /// Header labels recognised in the second column (case-insensitive).
    #[serde(default = "default_y_labels")]
    pub y_labels: Vec<String>,
}

fn default_delimiter() -> char {
    '\t'
}

fn default_x_labels() -> Vec<String> {
    vec!["current".to_string(), "i/a".to_string()]
}

fn default_y_labels() -> Vec<String> {
    vec!["flux density b".to_string(), "b/mt".to_string()]
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            x_labels: default_x_labels(),
            y_labels: default_y_labels(),
        }
    }
}

/// Configuration for the hysteresis loop geometry engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Look-back window (samples) for the crossing salience score.
    ///
    /// Tied to the sampling rate of the source instrument; 50 samples
    /// matches the reference data.
    #[serde(default = "default_salience_window")]
    pub salience_window: usize,

    /// Scale factor from raw loop area (mT·A/m) to J/m³.
    #[serde(default = "default_area_scale")]
    pub area_scale: f64,
}

fn default_salience_window() -> usize {
    50
}

fn default_area_scale() -> f64 {
    1e-3
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            salience_window: default_salience_window(),
            area_scale: default_area_scale(),
        }
    }
}

/// Configuration for chart output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Plot width in pixels.
    #[serde(default = "default_plot_width")]
    pub width: u32,

    /// Plot height in pixels.
    #[serde(default = "default_plot_height")]
    pub height: u32,
}

fn default_plot_width() -> u32 {
    1050
}

fn default_plot_height() -> u32 {
    750
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: default_plot_width(),
            height: default_plot_height(),
        }
    }
}

/// One hysteresis dataset: file name (relative to the data directory),
/// display title, and the current-to-field conversion factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// File name under the data directory.
    pub file: String,

    /// Human-readable material title.
    pub title: String,

    /// H = h_factor * I (A/m per A), from the coil geometry.
    pub h_factor: f64,
}

fn default_datasets() -> Vec<DatasetConfig> {
    vec![
        DatasetConfig {
            file: "run1laminatediron".to_string(),
            title: "Laminated Iron".to_string(),
            h_factor: 2459.0,
        },
        DatasetConfig {
            file: "run1softiron".to_string(),
            title: "Soft Iron".to_string(),
            h_factor: 2586.0,
        },
    ]
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub reader: ReaderConfig,

    #[serde(default, rename = "loop")]
    pub loop_geometry: LoopConfig,

    #[serde(default)]
    pub plot: PlotConfig,

    /// Hysteresis datasets to process in batch mode.
    #[serde(default = "default_datasets")]
    pub datasets: Vec<DatasetConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reader: ReaderConfig::default(),
            loop_geometry: LoopConfig::default(),
            plot: PlotConfig::default(),
            datasets: default_datasets(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reader_config() {
        let config = ReaderConfig::default();
        assert_eq!(config.delimiter, '\t');
        assert!(config.x_labels.contains(&"i/a".to_string()));
        assert!(config.y_labels.contains(&"b/mt".to_string()));
    }

    #[test]
    fn test_default_pipeline_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.loop_geometry.salience_window, 50);
        assert_eq!(config.datasets.len(), 2);
        assert_eq!(config.datasets[0].h_factor, 2459.0);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = PipelineConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: PipelineConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.loop_geometry.salience_window, 50);
        assert_eq!(parsed.datasets[1].title, "Soft Iron");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "loop:\n  salience_window: 25\n";
        let parsed: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.loop_geometry.salience_window, 25);
        assert_eq!(parsed.reader.delimiter, '\t');
        assert_eq!(parsed.datasets.len(), 2);
    }
}
