//! Ordinary least-squares line fitting.
//!
//! Provides the `linregress`-style contract the analyses rely on: slope,
//! intercept, Pearson correlation, and standard errors of both parameters.

use thiserror::Error;

/// Errors that can occur during line fitting.
#[derive(Debug, Error)]
pub enum FitError {
    #[error("need at least 2 points to fit a line, got {0}")]
    TooFewPoints(usize),

    #[error("x values have zero variance; slope is undefined")]
    ZeroVariance,

    #[error("x and y lengths differ: {x_len} vs {y_len}")]
    LengthMismatch { x_len: usize, y_len: usize },
}

/// Result type for fitting operations.
pub type Result<T> = std::result::Result<T, FitError>;

/// Ordinary least-squares fit of y = slope * x + intercept.
#[derive(Debug, Clone, Copy)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient.
    pub r: f64,
    /// Standard error of the slope.
    pub stderr_slope: f64,
    /// Standard error of the intercept.
    pub stderr_intercept: f64,
    /// Number of points fitted.
    pub n: usize,
}

impl LinearFit {
    /// Coefficient of determination R².
    pub fn r_squared(&self) -> f64 {
        self.r * self.r
    }

    /// Predicted y at `x`.
    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a straight line to paired samples.
///
/// Standard errors follow the usual OLS formulas:
/// `stderr_slope = sqrt(Σr²/(n-2) / Σ(x-x̄)²)` and
/// `stderr_intercept = stderr_slope * sqrt(Σx²/n)`. With exactly two
/// points both standard errors are reported as 0 (the residuals vanish).
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Result<LinearFit> {
    if xs.len() != ys.len() {
        return Err(FitError::LengthMismatch {
            x_len: xs.len(),
            y_len: ys.len(),
        });
    }

    let n = xs.len();
    if n < 2 {
        return Err(FitError::TooFewPoints(n));
    }

    let nf = n as f64;
    let x_mean = xs.iter().sum::<f64>() / nf;
    let y_mean = ys.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - x_mean;
        let dy = y - y_mean;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx == 0.0 {
        return Err(FitError::ZeroVariance);
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    // Perfectly constant y still correlates as r = 0 here, matching the
    // convention of reporting no linear association.
    let r = if syy == 0.0 {
        0.0
    } else {
        sxy / (sxx * syy).sqrt()
    };

    let (stderr_slope, stderr_intercept) = if n > 2 {
        let residual_ss: f64 = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| {
                let r = y - (slope * x + intercept);
                r * r
            })
            .sum();
        let se_slope = (residual_ss / (nf - 2.0) / sxx).sqrt();
        let sum_x2: f64 = xs.iter().map(|x| x * x).sum();
        let se_intercept = se_slope * (sum_x2 / nf).sqrt();
        (se_slope, se_intercept)
    } else {
        (0.0, 0.0)
    };

    Ok(LinearFit {
        slope,
        intercept,
        r,
        stderr_slope,
        stderr_intercept,
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_exact_line_recovered() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.5 * x - 1.0).collect();

        let fit = fit_line(&xs, &ys).unwrap();
        assert!((fit.slope - 2.5).abs() < EPS);
        assert!((fit.intercept + 1.0).abs() < EPS);
        assert!((fit.r_squared() - 1.0).abs() < EPS);
        assert!(fit.stderr_slope.abs() < EPS);
    }

    #[test]
    fn test_negative_slope_has_negative_r() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [3.0, 2.0, 1.0, 0.0];

        let fit = fit_line(&xs, &ys).unwrap();
        assert!((fit.slope + 1.0).abs() < EPS);
        assert!((fit.r + 1.0).abs() < EPS);
    }

    #[test]
    fn test_noisy_line_stderr_positive() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let ys = [1.1, 1.9, 3.2, 3.8, 5.1, 5.9];

        let fit = fit_line(&xs, &ys).unwrap();
        assert!((fit.slope - 1.0).abs() < 0.1);
        assert!(fit.stderr_slope > 0.0);
        assert!(fit.stderr_intercept > 0.0);
        assert!(fit.r_squared() > 0.99);
    }

    #[test]
    fn test_too_few_points() {
        assert!(matches!(
            fit_line(&[1.0], &[2.0]),
            Err(FitError::TooFewPoints(1))
        ));
    }

    #[test]
    fn test_zero_variance_x() {
        assert!(matches!(
            fit_line(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(FitError::ZeroVariance)
        ));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            fit_line(&[1.0, 2.0], &[1.0]),
            Err(FitError::LengthMismatch { .. })
        ));
    }
}
