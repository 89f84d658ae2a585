//! Semiconductor diode analysis: knee voltage and ideality factor.
//!
//! Input columns are forward voltage in mV and current in mA. The ideality
//! factor comes from the slope of ln(I) vs V over the exponential region
//! of the characteristic: eta = q / (slope * k * T).

use anyhow::{bail, Context, Result};

use crate::core::table::Series;
use crate::processors::fitting::{fit_line, LinearFit};

/// Elementary charge (C).
pub const ELEMENTARY_CHARGE: f64 = 1.602e-19;

/// Boltzmann constant (J/K).
pub const BOLTZMANN: f64 = 1.38e-23;

/// Result of a diode characteristic analysis.
#[derive(Debug, Clone)]
pub struct DiodeAnalysis {
    /// Voltage (mV) at which the current is closest to the knee target.
    pub knee_voltage_mv: f64,
    /// Ideality factor eta.
    pub ideality: f64,
    /// Uncertainty on eta propagated from the slope standard error.
    pub ideality_err: f64,
    /// The underlying ln(I) vs V(V) fit.
    pub fit: LinearFit,
    /// Points used for the fit: (V in volts, ln(I in mA)).
    pub fit_points: Vec<(f64, f64)>,
}

/// Voltage at which the measured current is closest to `target_ma`.
///
/// The original analysis reads the knee at 1 mA off the raw samples, no
/// interpolation.
pub fn knee_voltage(v_mv: &[f64], i_ma: &[f64], target_ma: f64) -> Option<f64> {
    v_mv.iter()
        .zip(i_ma)
        .min_by(|(_, a), (_, b)| (*a - target_ma).abs().total_cmp(&(*b - target_ma).abs()))
        .map(|(v, _)| *v)
}

/// Analyze a forward diode characteristic.
///
/// Samples with current at or below `min_current_ma` are excluded from the
/// ln(I) fit; they sit below the exponential region (and ln would be
/// undefined at zero).
pub fn analyze_diode(
    series: &Series,
    temp_k: f64,
    knee_target_ma: f64,
    min_current_ma: f64,
) -> Result<DiodeAnalysis> {
    let knee = knee_voltage(&series.x, &series.y, knee_target_ma)
        .context("empty diode characteristic")?;

    let fit_points: Vec<(f64, f64)> = series
        .x
        .iter()
        .zip(&series.y)
        .filter(|(_, i)| **i > min_current_ma)
        .map(|(v, i)| (v / 1000.0, i.ln()))
        .collect();

    if fit_points.len() < 2 {
        bail!(
            "only {} sample(s) above {} mA; cannot fit exponential region",
            fit_points.len(),
            min_current_ma
        );
    }

    let xs: Vec<f64> = fit_points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = fit_points.iter().map(|p| p.1).collect();
    let fit = fit_line(&xs, &ys)?;

    if fit.slope == 0.0 {
        bail!("flat ln(I) vs V characteristic; ideality factor undefined");
    }

    let ideality = ELEMENTARY_CHARGE / (fit.slope * BOLTZMANN * temp_k);
    let ideality_err = ideality * (fit.stderr_slope / fit.slope).abs();

    Ok(DiodeAnalysis {
        knee_voltage_mv: knee,
        ideality,
        ideality_err,
        fit,
        fit_points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ideal diode at eta = 2, T = 298 K: I = I0 * exp(qV / (2kT)).
    fn synthetic_diode(eta: f64, temp_k: f64) -> Series {
        let i0 = 1e-6; // mA
        let v_mv: Vec<f64> = (0..20).map(|k| 400.0 + 20.0 * k as f64).collect();
        let i_ma: Vec<f64> = v_mv
            .iter()
            .map(|v| i0 * (ELEMENTARY_CHARGE * v / 1000.0 / (eta * BOLTZMANN * temp_k)).exp())
            .collect();
        Series::from_columns(v_mv, i_ma)
    }

    #[test]
    fn test_recovers_ideality_factor() {
        let series = synthetic_diode(2.0, 298.0);
        let analysis = analyze_diode(&series, 298.0, 1.0, 1e-4).unwrap();
        assert!((analysis.ideality - 2.0).abs() < 1e-6);
        assert!(analysis.fit.r_squared() > 0.999);
    }

    #[test]
    fn test_knee_voltage_nearest_sample() {
        let v = [100.0, 200.0, 300.0];
        let i = [0.2, 0.9, 5.0];
        assert_eq!(knee_voltage(&v, &i, 1.0), Some(200.0));
    }

    #[test]
    fn test_knee_voltage_empty() {
        assert_eq!(knee_voltage(&[], &[], 1.0), None);
    }

    #[test]
    fn test_too_few_points_above_threshold() {
        let series = Series::from_columns(vec![100.0, 200.0], vec![0.001, 0.002]);
        assert!(analyze_diode(&series, 298.0, 1.0, 0.5).is_err());
    }
}
