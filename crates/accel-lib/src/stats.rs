//! Descriptive statistics of a value series.

use crate::error::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};

/// Summary statistics. Variance and deviation use the population
/// convention (divide by `N`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Most frequent value; ties resolve to the smallest value.
    pub mode: f64,
    pub variance: f64,
    pub deviation: f64,
}

impl Summary {
    pub fn to_text(&self) -> String {
        format!(
            "Statistical information of the data set\n\
             Mean:      {}\n\
             Mode:      {}\n\
             Median:    {}\n\
             Variance:  {}\n\
             Deviation: {}",
            self.mean, self.mode, self.median, self.variance, self.deviation
        )
    }
}

pub fn mean(values: &[f64]) -> AnalysisResult<f64> {
    if values.is_empty() {
        return Err(AnalysisError::EmptyInput("mean"));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

fn median_of_sorted(v: &[f64]) -> f64 {
    let n = v.len();
    if n % 2 == 0 {
        (v[n / 2 - 1] + v[n / 2]) / 2.0
    } else {
        v[n / 2]
    }
}

pub fn median(values: &[f64]) -> AnalysisResult<f64> {
    if values.is_empty() {
        return Err(AnalysisError::EmptyInput("median"));
    }
    Ok(median_of_sorted(&sorted(values)))
}

fn mode_of_sorted(v: &[f64]) -> f64 {
    let mut best = v[0];
    let mut best_run = 0usize;
    let mut i = 0;
    while i < v.len() {
        let run = v[i..].iter().take_while(|x| **x == v[i]).count().max(1);
        // Strictly greater keeps the earliest (smallest) value on ties.
        if run > best_run {
            best = v[i];
            best_run = run;
        }
        i += run;
    }
    best
}

pub fn mode(values: &[f64]) -> AnalysisResult<f64> {
    if values.is_empty() {
        return Err(AnalysisError::EmptyInput("mode"));
    }
    Ok(mode_of_sorted(&sorted(values)))
}

/// Population variance: mean squared deviation from the mean.
pub fn variance(values: &[f64]) -> AnalysisResult<f64> {
    let m = mean(values)?;
    Ok(values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64)
}

pub fn deviation(values: &[f64]) -> AnalysisResult<f64> {
    Ok(variance(values)?.sqrt())
}

pub fn summarize(values: &[f64]) -> AnalysisResult<Summary> {
    if values.is_empty() {
        return Err(AnalysisError::EmptyInput("statistics"));
    }
    let v = sorted(values);
    let variance = variance(values)?;
    Ok(Summary {
        count: values.len(),
        mean: mean(values)?,
        median: median_of_sorted(&v),
        mode: mode_of_sorted(&v),
        variance,
        deviation: variance.sqrt(),
    })
}

/// Equal-width histogram over `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// `bins + 1` ascending bin edges
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn centres(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }

    pub fn width(&self) -> f64 {
        self.edges.get(1).zip(self.edges.first()).map(|(b, a)| b - a).unwrap_or(0.0)
    }
}

/// Bin `values` into `bins` equal-width bins; the last bin is closed.
/// A constant series is spread over `[v - 0.5, v + 0.5]`.
pub fn histogram(values: &[f64], bins: usize) -> AnalysisResult<Histogram> {
    if values.is_empty() {
        return Err(AnalysisError::EmptyInput("histogram"));
    }
    if bins == 0 {
        return Err(AnalysisError::invalid("bins", "at least one bin is required"));
    }
    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return Err(AnalysisError::invalid("values", "histogram needs finite values"));
    }
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * width).collect();
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Ok(Histogram { edges, counts })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn reference_summary() {
        let s = summarize(&[1.0, 2.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(s.count, 5);
        assert_close(s.mean, 2.4, 1e-12);
        assert_eq!(s.median, 2.0);
        assert_eq!(s.mode, 2.0);
        assert_close(s.variance, 1.04, 1e-12);
        assert_close(s.deviation, 1.0198039, 1e-6);
    }

    #[test]
    fn even_length_median_averages_middle_pair() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5);
    }

    #[test]
    fn mode_ties_pick_smallest_value() {
        assert_eq!(mode(&[3.0, 3.0, 1.0, 1.0, 2.0]).unwrap(), 1.0);
        assert_eq!(mode(&[5.0, -2.0, 7.0]).unwrap(), -2.0);
        assert_eq!(mode(&[1.0, 4.0, 4.0, 4.0, 1.0]).unwrap(), 4.0);
    }

    #[test]
    fn single_value_has_zero_spread() {
        let s = summarize(&[3.5]).unwrap();
        assert_eq!(s.variance, 0.0);
        assert_eq!(s.deviation, 0.0);
        assert_eq!(s.mode, 3.5);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(summarize(&[]), Err(AnalysisError::EmptyInput("statistics")));
        assert!(mean(&[]).is_err());
        assert!(deviation(&[]).is_err());
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let values = [0.0, 0.1, 0.5, 0.9, 1.0, 1.0];
        let h = histogram(&values, 2).unwrap();
        assert_eq!(h.edges, vec![0.0, 0.5, 1.0]);
        assert_eq!(h.counts, vec![2, 4]);
        assert_eq!(h.centres(), vec![0.25, 0.75]);
        assert_eq!(h.width(), 0.5);
    }

    #[test]
    fn constant_histogram_uses_unit_range() {
        let h = histogram(&[2.0; 5], 10).unwrap();
        assert_close(h.edges[0], 1.5, 1e-12);
        assert_close(h.edges[10], 2.5, 1e-12);
        assert_eq!(h.counts.iter().sum::<usize>(), 5);
        assert!(histogram(&[1.0], 0).is_err());
    }
}
