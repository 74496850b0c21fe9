//! Integral time and length scales from the autocorrelation of the
//! velocity fluctuation.
//!
//! The autocorrelation is integrated over all non-negative lags, not only up
//! to the first zero crossing.

use crate::error::AnalysisError;
use crate::series::Series;
use crate::stats::{compute_mean, compute_var};
use clap::ValueEnum;
use rustfft::{FftPlanner, num_complex::Complex};
use serde::{Deserialize, Serialize};

/// Raw linear autocorrelation for non-negative lags.
///
/// For an input of length `n` the output has length `n` and index `k` holds
/// `sum_{i=0}^{n-1-k} u[i] * u[i + k]`.
pub trait Correlator {
    fn autocorrelate(&self, u: &[f64]) -> Vec<f64>;
}

/// Direct lag sum, `O(n^2)`.
pub struct DirectCorrelator;

impl Correlator for DirectCorrelator {
    fn autocorrelate(&self, u: &[f64]) -> Vec<f64> {
        (0..u.len())
            .map(|lag| {
                u[..u.len() - lag]
                    .iter()
                    .zip(&u[lag..])
                    .map(|(a, b)| a * b)
                    .sum::<f64>()
            })
            .collect()
    }
}

/// Zero-padded FFT (Wiener-Khinchin), `O(n log n)`.
pub struct FftCorrelator;

impl Correlator for FftCorrelator {
    fn autocorrelate(&self, u: &[f64]) -> Vec<f64> {
        let n = u.len();
        if n == 0 {
            return Vec::new();
        }

        // Padding to at least 2n - 1 keeps the correlation linear.
        let len = (2 * n - 1).next_power_of_two();
        let mut buffer: Vec<Complex<f64>> = u
            .iter()
            .map(|&val| Complex::new(val, 0.0))
            .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
            .take(len)
            .collect();

        let mut planner = FftPlanner::new();
        planner.plan_fft_forward(len).process(&mut buffer);
        for c in &mut buffer {
            *c = Complex::new(c.norm_sqr(), 0.0);
        }
        planner.plan_fft_inverse(len).process(&mut buffer);

        let norm_factor = len as f64;
        buffer[..n].iter().map(|c| c.re / norm_factor).collect()
    }
}

/// Autocorrelation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Direct,
    Fft,
}

impl Backend {
    pub fn correlator(self) -> Box<dyn Correlator> {
        match self {
            Backend::Direct => Box::new(DirectCorrelator),
            Backend::Fft => Box::new(FftCorrelator),
        }
    }
}

/// Integral scales of one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegralScales {
    /// Mean sampling interval.
    pub dt: f64,
    pub mean_speed: f64,
    /// Time integral scale `T_L`.
    pub time_scale: f64,
    /// Spatial integral scale `L = U * T_L`.
    pub length_scale: f64,
    /// Largest relative deviation of a sampling step from `dt`.
    pub dt_deviation: f64,
}

/// Mean of consecutive time differences.
pub fn sampling_interval(time: &[f64]) -> f64 {
    let diffs: Vec<f64> = time.windows(2).map(|w| w[1] - w[0]).collect();
    compute_mean(&diffs)
}

fn max_dt_deviation(time: &[f64], dt: f64) -> f64 {
    time.windows(2)
        .map(|w| ((w[1] - w[0]) - dt).abs() / dt.abs())
        .fold(0.0, f64::max)
}

/// Autocorrelation of the fluctuation `speed - mean(speed)`, normalized so
/// that lag 0 is 1.
pub fn normalized_autocorrelation(
    speed: &[f64],
    correlator: &dyn Correlator,
) -> Result<Vec<f64>, AnalysisError> {
    let n_vals = speed.len();
    if n_vals < 2 {
        return Err(AnalysisError::degenerate(format!(
            "need at least 2 samples, got {n_vals}"
        )));
    }

    let mean = compute_mean(speed);
    let u_prime: Vec<f64> = speed.iter().map(|&val| val - mean).collect();

    let var = compute_var(&u_prime);
    if var == 0.0 {
        return Err(AnalysisError::degenerate(
            "speed has zero variance, integral scale is undefined",
        ));
    }

    let norm = var * n_vals as f64;
    Ok(correlator
        .autocorrelate(&u_prime)
        .into_iter()
        .map(|r| r / norm)
        .collect())
}

/// Compute the time and spatial integral scales of `series`.
pub fn integral_scales(
    series: &Series,
    correlator: &dyn Correlator,
) -> Result<IntegralScales, AnalysisError> {
    let Series { time, speed } = series;
    if time.len() != speed.len() {
        return Err(AnalysisError::degenerate(format!(
            "{} times vs {} speeds",
            time.len(),
            speed.len()
        )));
    }

    let r = normalized_autocorrelation(speed, correlator)?;

    let dt = sampling_interval(time);
    if !(dt > 0.0) {
        return Err(AnalysisError::degenerate(format!(
            "sampling interval must be positive, but is {dt}"
        )));
    }

    let mean_speed = compute_mean(speed);
    let time_scale = dt * r.iter().sum::<f64>();

    Ok(IntegralScales {
        dt,
        mean_speed,
        time_scale,
        length_scale: mean_speed * time_scale,
        dt_deviation: max_dt_deviation(time, dt),
    })
}
