//! Sampling-period estimation from quantized timestamps.
//!
//! Log timestamps are rounded to a coarse clock, so consecutive deltas jitter
//! even when acquisition is strictly periodic. The estimator looks for the
//! smallest stride `step` whose delta repeats at every multiple of `step`
//! inside a verification window. The period is the time spanned by the
//! verified strides divided by the number of samples they cover.
//!
//! Timestamps should be relative to the first sample (see
//! [`crate::timestamp::relative_ms`]); absolute epoch milliseconds in `f64`
//! carry about 0.24 µs of rounding per value.

use crate::{
    error::{AnalysisError, AnalysisResult},
    signal::SamplingPeriod,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Minimum number of timestamps the estimator accepts.
pub const MIN_SAMPLES: usize = 4;

/// Two deltas closer than half a microsecond are considered equal.
pub const DELTA_TOLERANCE_MS: f64 = 5e-4;

/// How far the candidate stride is verified along the series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy", content = "value")]
pub enum VerificationWindow {
    /// Verify every multiple of the stride up to the end of the series.
    Full,
    /// Verify up to the given fraction of the series length.
    Fraction(f64),
    /// Verify up to a fixed sample index.
    Fixed(usize),
}

impl Default for VerificationWindow {
    fn default() -> Self {
        Self::Full
    }
}

impl VerificationWindow {
    /// Exclusive upper index of the verification loop, clamped to `len`.
    pub fn bound(&self, len: usize) -> usize {
        let bound = match *self {
            Self::Full => len,
            Self::Fraction(f) => (len as f64 * f.clamp(0.0, 1.0)) as usize,
            Self::Fixed(n) => n,
        };
        bound.min(len)
    }
}

fn same_delta(a: f64, b: f64) -> bool {
    (a - b).abs() <= DELTA_TOLERANCE_MS
}

/// Estimate the sampling period of a millisecond timestamp series.
pub fn estimate_sampling_period(
    timestamps_ms: &[f64],
    window: VerificationWindow,
) -> AnalysisResult<SamplingPeriod> {
    let n = timestamps_ms.len();
    if n < MIN_SAMPLES {
        return Err(AnalysisError::TooShort {
            len: n,
            min: MIN_SAMPLES,
        });
    }
    let t = timestamps_ms;
    let bound = window.bound(n);
    let mut step = 1usize;
    let mut attempts = 1usize;

    loop {
        if 2 * step >= n {
            debug!("no stride below {} samples repeats, giving up", n / 2);
            return Err(AnalysisError::EstimationFailure { len: n });
        }
        let pre_delta = t[step] - t[0];
        let delta = t[2 * step] - t[step];
        attempts += 1;

        if pre_delta <= 0.0 || !same_delta(pre_delta, delta) {
            step += 1;
            continue;
        }
        if attempts > n {
            return Err(AnalysisError::EstimationFailure { len: n });
        }

        let mismatch = (3 * step..bound)
            .step_by(step)
            .find(|&i| !same_delta(t[i] - t[i - step], pre_delta));
        match mismatch {
            Some(i) => {
                debug!("stride {step} rejected at sample {i}");
                step += 1;
            }
            None => {
                // Last index reached by the verified stride.
                let last = if bound > 3 * step {
                    (bound - 1) / step * step
                } else {
                    2 * step
                };
                debug!("stride {step} verified up to sample {last}");
                return SamplingPeriod::from_seconds((t[last] - t[0]) / last as f64 / 1000.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{Recording, Sample};

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}"
        );
    }

    fn uniform(start: f64, delta_ms: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| start + i as f64 * delta_ms).collect()
    }

    #[test]
    fn exact_uniform_series() {
        let ts = uniform(1_600_000_000_000.0, 10.0, 500);
        let period = estimate_sampling_period(&ts, VerificationWindow::Full).unwrap();
        assert_close(period.seconds(), 0.01, 1e-12);
        assert_close(period.frequency_hz(), 100.0, 1e-9);
    }

    #[test]
    fn recovers_period_through_integer_rounding() {
        // 300 Hz logged with whole-millisecond timestamps: 0, 3, 7, 10, 13, 17, ...
        let delta = 10.0 / 3.0;
        let ts: Vec<f64> = (0..900)
            .map(|i| 1_600_000_000_000.0 + (i as f64 * delta).round())
            .collect();
        let period = estimate_sampling_period(&ts, VerificationWindow::Full).unwrap();
        assert_close(period.seconds(), delta / 1000.0, 1e-12);
    }

    #[test]
    fn recovers_rational_periods_with_offset_rounding() {
        // (numerator, denominator) of the true step in ms, phase offset below half a step
        let cases = [(10.0, 3, 0.3), (5.0, 2, 0.2), (4.0, 3, 0.1), (20.0, 7, 0.2), (8.0, 1, 0.4)];
        for (num, den, offset) in cases {
            let delta = num / den as f64;
            let ts: Vec<f64> = (0..2000)
                .map(|i| 1_600_000_000_000.0 + (offset + i as f64 * delta).round())
                .collect();
            let period = estimate_sampling_period(&ts, VerificationWindow::Full)
                .unwrap_or_else(|e| panic!("delta {delta}: {e}"));
            assert_close(period.seconds(), delta / 1000.0, 1e-12);
        }
    }

    #[test]
    fn fails_fast_on_short_series() {
        for n in 0..MIN_SAMPLES {
            let ts = uniform(0.0, 10.0, n);
            assert_eq!(
                estimate_sampling_period(&ts, VerificationWindow::Full),
                Err(AnalysisError::TooShort {
                    len: n,
                    min: MIN_SAMPLES
                })
            );
        }
    }

    #[test]
    fn four_uniform_samples_are_enough() {
        let ts = uniform(0.0, 4.0, 4);
        let period = estimate_sampling_period(&ts, VerificationWindow::Full).unwrap();
        assert_close(period.seconds(), 0.004, 1e-12);
    }

    #[test]
    fn irregular_series_fails_with_estimation_failure() {
        let ts = vec![0.0, 1.0, 3.0, 6.0, 10.0, 15.0, 21.0, 28.0];
        assert_eq!(
            estimate_sampling_period(&ts, VerificationWindow::Full),
            Err(AnalysisError::EstimationFailure { len: 8 })
        );
    }

    #[test]
    fn constant_timestamps_never_yield_zero_period() {
        let ts = vec![5.0; 16];
        assert_eq!(
            estimate_sampling_period(&ts, VerificationWindow::Full),
            Err(AnalysisError::EstimationFailure { len: 16 })
        );
    }

    #[test]
    fn duplicate_timestamps_resolve_to_half_millisecond() {
        // 2 kHz logged with 1 ms resolution: 0, 0, 1, 1, 2, 2, ...
        let ts: Vec<f64> = (0..200).map(|i| (i / 2) as f64).collect();
        let period = estimate_sampling_period(&ts, VerificationWindow::Full).unwrap();
        assert_close(period.seconds(), 0.0005, 1e-12);
    }

    #[test]
    fn window_policy_changes_what_is_verified() {
        // Uniform for 100 samples, then a gap; the full window sees the gap.
        let mut ts = uniform(0.0, 10.0, 100);
        ts.extend(uniform(1_500.0, 10.0, 100));
        assert!(estimate_sampling_period(&ts, VerificationWindow::Full).is_err());
        let period = estimate_sampling_period(&ts, VerificationWindow::Fixed(80)).unwrap();
        assert_close(period.seconds(), 0.01, 1e-12);
        let period = estimate_sampling_period(&ts, VerificationWindow::Fraction(0.25)).unwrap();
        assert_close(period.seconds(), 0.01, 1e-12);
    }

    #[test]
    fn window_bounds_are_clamped() {
        assert_eq!(VerificationWindow::Fixed(3000).bound(100), 100);
        assert_eq!(VerificationWindow::Fraction(0.01).bound(1000), 10);
        assert_eq!(VerificationWindow::Fraction(4.0).bound(10), 10);
        assert_eq!(VerificationWindow::Full.bound(42), 42);
    }

    #[test]
    fn microsecond_epoch_log_recovers_exact_period() {
        let samples: Vec<Sample> = (0..3000i64)
            .map(|i| {
                let us = i * 3300;
                Sample {
                    timestamp: format!(
                        "2023-06-01 12:{:02}:{:02}.{:06}",
                        us / 60_000_000,
                        us / 1_000_000 % 60,
                        us % 1_000_000
                    ),
                    value: 0.0,
                }
            })
            .collect();
        let rec = Recording::from_samples(&samples).unwrap();
        let period = estimate_sampling_period(&rec.timestamps_ms, VerificationWindow::Full).unwrap();
        assert_close(period.seconds(), 0.0033, 1e-15);
        assert_close(period.frequency_hz(), 1000.0 / 3.3, 1e-9);
    }

    #[test]
    fn period_spans_every_verified_stride() {
        // Sub-ulp jitter on each delta averages out over the verified span.
        let ts: Vec<f64> = (0..1000)
            .map(|i| i as f64 * 2.5 + if i % 2 == 0 { 1e-5 } else { -1e-5 })
            .collect();
        let period = estimate_sampling_period(&ts, VerificationWindow::Full).unwrap();
        assert_close(period.seconds(), 0.0025, 1e-10);
    }
}
