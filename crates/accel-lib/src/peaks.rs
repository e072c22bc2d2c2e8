//! Strict local-maximum search and multi-scale peak reduction.

use crate::error::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};

/// Largest number of passes accepted by [`find_peaks`].
pub const MAX_PASSES: usize = 9;

/// One detected peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Position (x coordinate) of the peak in the source series
    pub position: f64,
    pub value: f64,
    /// Index of the peak in the original sample series
    pub source_index: usize,
}

/// Ordered peaks, as produced by one detection or reduction pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakSet {
    pub peaks: Vec<Peak>,
}

impl PeakSet {
    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    pub fn positions(&self) -> Vec<f64> {
        self.peaks.iter().map(|p| p.position).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.peaks.iter().map(|p| p.value).collect()
    }

    pub fn source_indices(&self) -> Vec<usize> {
        self.peaks.iter().map(|p| p.source_index).collect()
    }
}

/// How the scan advances after accepting an interior peak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Resume two samples later; the right neighbour of a peak cannot be one.
    #[default]
    SkipAdjacent,
    /// Always advance by one sample.
    Exhaustive,
}

/// Indices of strict local maxima in `values`, boundaries included.
fn local_maxima(values: &[f64], mode: ScanMode) -> Vec<usize> {
    let n = values.len();
    let mut out = Vec::new();
    if n < 2 {
        return out;
    }
    if values[0] > values[1] {
        out.push(0);
    }
    let mut i = 1;
    while i + 1 < n {
        if values[i] > values[i - 1] && values[i] > values[i + 1] {
            out.push(i);
            i += match mode {
                ScanMode::SkipAdjacent => 2,
                ScanMode::Exhaustive => 1,
            };
        } else {
            i += 1;
        }
    }
    if values[n - 1] > values[n - 2] {
        out.push(n - 1);
    }
    out
}

/// Find the strict local maxima of a `(position, value)` series.
pub fn detect_peaks(points: &[(f64, f64)], mode: ScanMode) -> AnalysisResult<PeakSet> {
    if points.len() < 2 {
        return Err(AnalysisError::EmptyResult("peak detection"));
    }
    let values: Vec<f64> = points.iter().map(|p| p.1).collect();
    let peaks: Vec<Peak> = local_maxima(&values, mode)
        .into_iter()
        .map(|i| Peak {
            position: points[i].0,
            value: points[i].1,
            source_index: i,
        })
        .collect();
    if peaks.is_empty() {
        return Err(AnalysisError::EmptyResult("peak detection"));
    }
    Ok(PeakSet { peaks })
}

/// Keep the peaks of a peak set ("peaks of peaks"), one scale coarser.
pub fn reduce_peaks(set: &PeakSet, mode: ScanMode) -> AnalysisResult<PeakSet> {
    if set.len() < 2 {
        return Err(AnalysisError::EmptyResult("peak reduction"));
    }
    let peaks: Vec<Peak> = local_maxima(&set.values(), mode)
        .into_iter()
        .map(|i| set.peaks[i])
        .collect();
    if peaks.is_empty() {
        return Err(AnalysisError::EmptyResult("peak reduction"));
    }
    Ok(PeakSet { peaks })
}

/// Detect peaks, then reduce them `passes - 1` times.
pub fn find_peaks(points: &[(f64, f64)], passes: usize, mode: ScanMode) -> AnalysisResult<PeakSet> {
    if !(1..=MAX_PASSES).contains(&passes) {
        return Err(AnalysisError::invalid(
            "passes",
            format!("{passes} is outside 1..={MAX_PASSES}"),
        ));
    }
    let mut set = detect_peaks(points, mode)?;
    for _ in 1..passes {
        set = reduce_peaks(&set, mode)?;
    }
    Ok(set)
}
