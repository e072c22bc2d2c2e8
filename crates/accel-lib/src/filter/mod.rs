//! Digital filter design and application.

pub mod apply;
pub mod design;

pub use apply::*;
pub use design::*;

use realfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Filter family used by the analysis session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    #[default]
    Fir,
    Iir,
}

impl FilterKind {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "fir" => Some(Self::Fir),
            "iir" => Some(Self::Iir),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fir => "fir",
            Self::Iir => "iir",
        }
    }
}

/// Zeros, poles and gain of a Butterworth design.
///
/// Kept next to the expanded taps because narrow designs cannot be run or
/// evaluated accurately from the `(b, a)` polynomials.
#[derive(Debug, Clone, PartialEq)]
pub struct Butterworth {
    pub order: u32,
    /// Natural (-3 dB) frequencies, normalized to Nyquist
    pub natural: BandSpec,
    pub zeros: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    pub gain: f64,
}

impl Butterworth {
    fn response_at(&self, w: f64) -> Complex64 {
        let z = Complex64::from_polar(1.0, PI * w);
        let num = self
            .zeros
            .iter()
            .fold(Complex64::new(self.gain, 0.0), |acc, q| acc * (z - *q));
        let den = self
            .poles
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, p| acc * (z - *p));
        num / den
    }
}

/// Transfer function taps, `A[0]` normalized to one.
///
/// FIR designs carry `a = [1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCoefficients {
    pub b: Vec<f64>,
    pub a: Vec<f64>,
    #[serde(skip)]
    pub butterworth: Option<Butterworth>,
}

impl FilterCoefficients {
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Self {
        Self {
            b,
            a,
            butterworth: None,
        }
    }

    pub fn fir(b: Vec<f64>) -> Self {
        Self::new(b, vec![1.0])
    }

    pub fn is_fir(&self) -> bool {
        self.a.len() == 1
    }

    /// Number of delay elements.
    pub fn order(&self) -> usize {
        self.b.len().max(self.a.len()).saturating_sub(1)
    }

    /// Evaluate `H(e^{jπw})` for a frequency `w` normalized to Nyquist.
    pub fn response_at(&self, w: f64) -> Complex64 {
        if let Some(design) = &self.butterworth {
            return design.response_at(w);
        }
        let z_inv = Complex64::from_polar(1.0, -PI * w);
        let eval = |taps: &[f64]| {
            taps.iter()
                .rev()
                .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z_inv + c)
        };
        eval(&self.b) / eval(&self.a)
    }

    /// Magnitude of the response at `w`, in dB.
    pub fn gain_db_at(&self, w: f64) -> f64 {
        20.0 * self.response_at(w).norm().log10()
    }
}
