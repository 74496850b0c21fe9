use crate::error::AnalysisError;

/// Streaming mean and population variance (Welford).
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccumulatorReport {
    pub mean: f64,
    pub std_dev: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            n_vals: 0,
            mean: 0.0,
            diff_2_sum: 0.0,
        }
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    /// Mean and population standard deviation (denominator `n`).
    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            mean: if self.n_vals > 0 { self.mean } else { f64::NAN },
            std_dev: if self.n_vals > 0 {
                (self.diff_2_sum / self.n_vals as f64).sqrt()
            } else {
                f64::NAN
            },
        }
    }
}

/// Turbulence intensity of a wind-speed record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intensity {
    pub mean_speed: f64,
    pub std_dev: f64,
    pub intensity: f64,
}

/// Compute the turbulence intensity `std_dev / mean` of `speed`.
///
/// A constant record has intensity exactly `0.0`.
pub fn turbulence_intensity(speed: &[f64]) -> Result<Intensity, AnalysisError> {
    if speed.is_empty() {
        return Err(AnalysisError::degenerate("empty speed record"));
    }

    let mut acc = Accumulator::new();
    speed.iter().for_each(|&val| acc.add(val));
    let AccumulatorReport { mean, std_dev } = acc.report();

    if mean == 0.0 {
        return Err(AnalysisError::degenerate(
            "mean speed is zero, turbulence intensity is undefined",
        ));
    }

    Ok(Intensity {
        mean_speed: mean,
        std_dev,
        intensity: std_dev / mean,
    })
}

pub fn compute_mean(vals: &[f64]) -> f64 {
    if vals.is_empty() {
        return f64::NAN;
    }
    vals.iter().sum::<f64>() / vals.len() as f64
}

/// Population variance (denominator `n`).
pub fn compute_var(vals: &[f64]) -> f64 {
    if vals.is_empty() {
        return f64::NAN;
    }
    let mean = compute_mean(vals);
    vals.iter().map(|&val| (val - mean).powi(2)).sum::<f64>() / vals.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_sample_intensity() {
        let res = turbulence_intensity(&[5.0, 7.0]).unwrap();
        assert_eq!(res.mean_speed, 6.0);
        assert_eq!(res.std_dev, 1.0);
        assert!((res.intensity - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn constant_record_has_zero_intensity() {
        let res = turbulence_intensity(&[4.2; 64]).unwrap();
        assert_eq!(res.std_dev, 0.0);
        assert_eq!(res.intensity, 0.0);
    }

    #[test]
    fn zero_mean_is_degenerate() {
        let err = turbulence_intensity(&[-1.0, 1.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::DegenerateSeries { .. }));
    }

    #[test]
    fn empty_record_is_degenerate() {
        assert!(turbulence_intensity(&[]).is_err());
    }

    #[test]
    fn accumulator_matches_batch_variance() {
        let vals = [3.1, 4.7, 2.2, 9.0, 5.5, 6.3];
        let mut acc = Accumulator::new();
        vals.iter().for_each(|&val| acc.add(val));
        let report = acc.report();
        assert!((report.mean - compute_mean(&vals)).abs() < 1e-12);
        assert!((report.std_dev.powi(2) - compute_var(&vals)).abs() < 1e-12);
    }
}
