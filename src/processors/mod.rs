//! Data reduction modules.

pub mod diode;
pub mod fitting;
pub mod hysteresis;
pub mod loop_geometry;
pub mod regression;

// Re-export key types for convenience
pub use diode::{analyze_diode, DiodeAnalysis};
pub use fitting::{fit_line, FitError, LinearFit};
pub use hysteresis::{analyze_batch, analyze_dataset, HysteresisReport};
pub use loop_geometry::{
    analyze_loop, classify_main_branches, find_zero_crossings, main_branches, shoelace_area,
    BranchPair, Crossing, LoopSummary,
};
pub use regression::{run_regression, AxisTransform, MoseleyConstants, Regression};
