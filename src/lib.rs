//! Physics-lab data reduction pipeline.
//!
//! This crate consolidates a set of lab data-reduction scripts into one CLI:
//! - Parsing two-column delimited measurement files (current/flux, V/I, ...)
//! - Ferromagnetic hysteresis analysis: coercivity, remanence, loop area
//! - Ordinary least-squares regression with propagated uncertainties
//! - Semiconductor diode ideality-factor extraction
//! - Static PNG chart rendering
//!
//! # Example
//!
//! ```no_run
//! use lab_pipeline::{config::ReaderConfig, core::table, processors::loop_geometry};
//!
//! let cfg = ReaderConfig::default();
//! let series = table::read_two_columns("run1softiron", &cfg).unwrap();
//! let area = loop_geometry::shoelace_area(&series.x, &series.y);
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use crate::config::{DatasetConfig, LoopConfig, PipelineConfig, PlotConfig, ReaderConfig};
pub use crate::core::table::Series;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
