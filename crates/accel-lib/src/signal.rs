use crate::{
    error::{AnalysisError, AnalysisResult},
    timestamp::{normalize_timestamps_us, relative_ms},
};
use serde::{Deserialize, Serialize};

/// One record of an acceleration log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Calendar time, `YYYY-MM-DD HH:MM:SS.ffffff`
    pub timestamp: String,
    pub value: f64,
}

/// Fully buffered acquisition with timestamps already normalized to milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    /// Epoch time of the first sample, in microseconds
    pub origin_us: i64,
    /// Milliseconds since `origin_us`, non-decreasing
    pub timestamps_ms: Vec<f64>,
    /// Measured values, index-aligned with `timestamps_ms`
    pub values: Vec<f64>,
}

impl Recording {
    pub fn from_samples(samples: &[Sample]) -> AnalysisResult<Self> {
        let us = normalize_timestamps_us(samples.iter().map(|s| s.timestamp.as_str()))?;
        let origin_us = us.first().copied().unwrap_or_default();
        let values = samples.iter().map(|s| s.value).collect();
        Ok(Self {
            origin_us,
            timestamps_ms: relative_ms(&us, origin_us),
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Epoch milliseconds of every sample.
    pub fn epoch_ms(&self) -> Vec<f64> {
        let origin = self.origin_us as f64 / 1000.0;
        self.timestamps_ms.iter().map(|t| origin + t).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(position, value)` pairs with the sample index as position.
    pub fn indexed_points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v))
            .collect()
    }
}

/// Estimated time between two consecutive samples.
///
/// Only positive, finite periods can be constructed; a failed estimate is
/// carried as an `Err` and never as a zero period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SamplingPeriod(f64);

impl SamplingPeriod {
    pub fn from_seconds(seconds: f64) -> AnalysisResult<Self> {
        if seconds.is_finite() && seconds > 0.0 {
            Ok(Self(seconds))
        } else {
            Err(AnalysisError::invalid(
                "sampling_period",
                format!("{seconds} s is not a positive duration"),
            ))
        }
    }

    pub fn seconds(&self) -> f64 {
        self.0
    }

    pub fn frequency_hz(&self) -> f64 {
        1.0 / self.0
    }

    pub fn nyquist_hz(&self) -> f64 {
        0.5 / self.0
    }

    /// Map sample positions to seconds from the first sample.
    pub fn time_points(&self, positions: impl IntoIterator<Item = f64>) -> Vec<f64> {
        positions.into_iter().map(|p| p * self.0).collect()
    }

    /// Time axis for `n` samples starting at zero.
    pub fn time_axis(&self, n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 * self.0).collect()
    }
}

impl TryFrom<f64> for SamplingPeriod {
    type Error = AnalysisError;

    fn try_from(seconds: f64) -> Result<Self, Self::Error> {
        Self::from_seconds(seconds)
    }
}

impl From<SamplingPeriod> for f64 {
    fn from(period: SamplingPeriod) -> Self {
        period.0
    }
}

/// Period and frequency as reported to the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SamplingReport {
    pub period_s: f64,
    pub frequency_hz: f64,
}

impl From<SamplingPeriod> for SamplingReport {
    fn from(period: SamplingPeriod) -> Self {
        Self {
            period_s: period.seconds(),
            frequency_hz: period.frequency_hz(),
        }
    }
}
