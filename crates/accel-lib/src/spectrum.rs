use crate::{
    error::{AnalysisError, AnalysisResult},
    signal::SamplingPeriod,
};
use realfft::{num_complex::Complex64, RealFftPlanner};

/// One frequency bin of a normalized DFT.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumBin {
    /// Frequency in Hz
    pub frequency: f64,
    /// DFT coefficient divided by the series length
    pub coefficient: Complex64,
}

impl SpectrumBin {
    /// `20·log10|X|`; an empty bin maps to negative infinity.
    pub fn magnitude_db(&self) -> f64 {
        20.0 * self.coefficient.norm().log10()
    }
}

/// Full two-sided spectrum: `N` bins from 0 Hz in steps of `fs / N`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spectrum {
    pub bins: Vec<SpectrumBin>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn frequencies(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.frequency).collect()
    }

    pub fn magnitude_db(&self) -> Vec<f64> {
        self.bins.iter().map(SpectrumBin::magnitude_db).collect()
    }

    /// Frequency resolution in Hz.
    pub fn resolution_hz(&self) -> f64 {
        self.bins.get(1).map(|b| b.frequency).unwrap_or(0.0)
    }
}

/// Compute the normalized DFT of a real series and its frequency axis.
pub fn compute_spectrum(values: &[f64], period: SamplingPeriod) -> AnalysisResult<Spectrum> {
    let n = values.len();
    if n == 0 {
        return Err(AnalysisError::EmptyInput("spectral analysis"));
    }
    let mut planner = RealFftPlanner::<f64>::new();
    let r2c = planner.plan_fft_forward(n);
    let mut input = values.to_vec();
    let mut half = r2c.make_output_vec();
    r2c.process(&mut input, &mut half)
        .map_err(|e| AnalysisError::invalid("values", e.to_string()))?;

    let scale = 1.0 / n as f64;
    let df = period.frequency_hz() / n as f64;
    let bins = (0..n)
        .map(|k| {
            // Upper half of a real signal's spectrum mirrors the lower half.
            let raw = if k < half.len() {
                half[k]
            } else {
                half[n - k].conj()
            };
            SpectrumBin {
                frequency: k as f64 * df,
                coefficient: raw * scale,
            }
        })
        .collect();
    Ok(Spectrum { bins })
}
