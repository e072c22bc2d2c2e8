//! One analysis session over a fully buffered recording.

use crate::{
    config::{AnalysisConfig, BandHz, IirSettings},
    error::AnalysisResult,
    filter::{apply_filter, design_fir, design_iir, BandSpec, FilterCoefficients, FilterKind, IirSpec},
    peaks::{find_peaks, PeakSet},
    sampling::estimate_sampling_period,
    signal::{Recording, SamplingPeriod, SamplingReport},
    spectrum::{compute_spectrum, Spectrum},
    stats::{histogram, summarize, Histogram, Summary},
};
use log::{debug, warn};

/// Read-only view of a recording plus the immutable configuration.
///
/// The sampling period is estimated once; when that fails every
/// frequency-dependent operation returns the same estimation error.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    config: AnalysisConfig,
    recording: Recording,
    period: AnalysisResult<SamplingPeriod>,
}

impl AnalysisSession {
    pub fn new(recording: Recording, config: AnalysisConfig) -> Self {
        let period = estimate_sampling_period(&recording.timestamps_ms, config.verification);
        match &period {
            Ok(p) => debug!("estimated sampling period {} s", p.seconds()),
            Err(e) => warn!("{e}"),
        }
        Self {
            config,
            recording,
            period,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    pub fn values(&self) -> &[f64] {
        &self.recording.values
    }

    pub fn period(&self) -> AnalysisResult<SamplingPeriod> {
        self.period.clone()
    }

    pub fn sampling_report(&self) -> AnalysisResult<SamplingReport> {
        self.period().map(SamplingReport::from)
    }

    /// Seconds since the first sample, one entry per sample.
    pub fn time_axis(&self) -> AnalysisResult<Vec<f64>> {
        Ok(self.period()?.time_axis(self.recording.len()))
    }

    /// Multi-pass peak search over sample positions; needs no time base.
    pub fn peaks(&self, passes: usize) -> AnalysisResult<PeakSet> {
        find_peaks(&self.recording.indexed_points(), passes, self.config.scan)
    }

    /// Seconds since the first sample for every peak of `peaks`.
    pub fn peak_times(&self, peaks: &PeakSet) -> AnalysisResult<Vec<f64>> {
        let period = self.period()?;
        Ok(period.time_points(peaks.peaks.iter().map(|p| p.source_index as f64)))
    }

    pub fn spectrum(&self) -> AnalysisResult<Spectrum> {
        compute_spectrum(self.values(), self.period()?)
    }

    pub fn histogram(&self) -> AnalysisResult<Histogram> {
        histogram(self.values(), self.config.histogram_bins)
    }

    pub fn statistics(&self) -> AnalysisResult<Summary> {
        summarize(self.values())
    }

    /// Design the configured filter with cutoffs normalized to the
    /// estimated Nyquist frequency.
    pub fn design_filter(&self) -> AnalysisResult<FilterCoefficients> {
        let nyquist = self.period()?.nyquist_hz();
        let norm = |hz: f64| hz / nyquist;
        match self.config.filter {
            FilterKind::Fir => {
                let band = match self.config.fir.band {
                    BandHz::LowPass { cutoff_hz } => BandSpec::LowPass {
                        cutoff: norm(cutoff_hz),
                    },
                    BandHz::HighPass { cutoff_hz } => BandSpec::HighPass {
                        cutoff: norm(cutoff_hz),
                    },
                    BandHz::BandPass { low_hz, high_hz } => BandSpec::BandPass {
                        low: norm(low_hz),
                        high: norm(high_hz),
                    },
                };
                design_fir(self.config.fir.order, band)
            }
            FilterKind::Iir => {
                let spec = match self.config.iir {
                    IirSettings::LowPass { pass_hz, stop_hz } => IirSpec::LowPass {
                        pass: norm(pass_hz),
                        stop: norm(stop_hz),
                    },
                    IirSettings::HighPass { pass_hz, stop_hz } => IirSpec::HighPass {
                        pass: norm(pass_hz),
                        stop: norm(stop_hz),
                    },
                    IirSettings::BandPass { pass_hz, stop_hz } => IirSpec::BandPass {
                        pass: pass_hz.map(norm),
                        stop: stop_hz.map(norm),
                    },
                };
                design_iir(spec)
            }
        }
    }

    /// The value series run through [`Self::design_filter`].
    pub fn filtered(&self) -> AnalysisResult<(FilterCoefficients, Vec<f64>)> {
        let coeffs = self.design_filter()?;
        let out = apply_filter(&coeffs, self.values())?;
        Ok((coeffs, out))
    }
}
