//! FIR (windowed-sinc) and IIR (Butterworth) coefficient design.
//!
//! IIR order selection is done here; the Butterworth zeros and poles come
//! from `iir_filters`.
//!
//! All frequencies are normalized to the Nyquist frequency, so a valid
//! cutoff lies strictly inside `(0, 1)`.

use super::{Butterworth, FilterCoefficients};
use crate::error::{AnalysisError, AnalysisResult};
use iir_filters::{
    filter::DirectForm2Transposed,
    filter_design::{butter, FilterType},
    sos::zpk2sos,
};
use log::debug;
use num_traits::{One, Zero};
use realfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Maximum allowed ripple inside the IIR passband, in dB.
pub const PASS_RIPPLE_DB: f64 = 1.0;
/// Minimum attenuation inside the IIR stopband, in dB.
pub const STOP_ATTENUATION_DB: f64 = 40.0;
/// Highest Butterworth order a design may request.
pub const MAX_IIR_ORDER: usize = 24;

/// Which band a design lets through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum BandSpec {
    LowPass { cutoff: f64 },
    HighPass { cutoff: f64 },
    BandPass { low: f64, high: f64 },
}

fn check_normalized(name: &'static str, w: f64) -> AnalysisResult<()> {
    if w.is_finite() && w > 0.0 && w < 1.0 {
        Ok(())
    } else {
        Err(AnalysisError::invalid(
            name,
            format!("{w} is outside the open interval (0, 1)"),
        ))
    }
}

impl BandSpec {
    fn validate(&self) -> AnalysisResult<()> {
        match *self {
            Self::LowPass { cutoff } | Self::HighPass { cutoff } => {
                check_normalized("cutoff", cutoff)
            }
            Self::BandPass { low, high } => {
                check_normalized("low", low)?;
                check_normalized("high", high)?;
                if low >= high {
                    return Err(AnalysisError::invalid(
                        "low",
                        format!("band edge {low} is not below {high}"),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Passband as `(left, right)` edges on `[0, 1]`.
    fn band(&self) -> (f64, f64) {
        match *self {
            Self::LowPass { cutoff } => (0.0, cutoff),
            Self::HighPass { cutoff } => (cutoff, 1.0),
            Self::BandPass { low, high } => (low, high),
        }
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

fn hamming(len: usize) -> Vec<f64> {
    if len == 1 {
        return vec![1.0];
    }
    let denom = (len - 1) as f64;
    (0..len)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / denom).cos())
        .collect()
}

/// Windowed-sinc FIR design returning `order + 1` taps.
///
/// Taps are Hamming-windowed and scaled to unity gain at the reference
/// frequency of the passband (DC, Nyquist or the band centre). A high-pass
/// design needs a non-zero response at Nyquist, which requires an even order.
pub fn design_fir(order: usize, band: BandSpec) -> AnalysisResult<FilterCoefficients> {
    band.validate()?;
    if order == 0 {
        return Err(AnalysisError::invalid("order", "FIR order must be at least 1"));
    }
    if matches!(band, BandSpec::HighPass { .. }) && order % 2 == 1 {
        return Err(AnalysisError::invalid(
            "order",
            format!("high-pass design needs an even order, got {order}"),
        ));
    }
    let taps = order + 1;
    let (left, right) = band.band();
    let centre = order as f64 / 2.0;
    let window = hamming(taps);
    let mut h: Vec<f64> = (0..taps)
        .map(|i| {
            let m = i as f64 - centre;
            (right * sinc(right * m) - left * sinc(left * m)) * window[i]
        })
        .collect();

    let reference = if left == 0.0 {
        0.0
    } else if right == 1.0 {
        1.0
    } else {
        0.5 * (left + right)
    };
    let gain: f64 = h
        .iter()
        .enumerate()
        .map(|(i, c)| c * (PI * (i as f64 - centre) * reference).cos())
        .sum();
    if gain.abs() < f64::EPSILON {
        return Err(AnalysisError::invalid(
            "order",
            format!("order {order} leaves no gain in the passband"),
        ));
    }
    for c in &mut h {
        *c /= gain;
    }
    Ok(FilterCoefficients::fir(h))
}

pub fn low_pass_fir(order: usize, cutoff: f64) -> AnalysisResult<FilterCoefficients> {
    design_fir(order, BandSpec::LowPass { cutoff })
}

pub fn high_pass_fir(order: usize, cutoff: f64) -> AnalysisResult<FilterCoefficients> {
    design_fir(order, BandSpec::HighPass { cutoff })
}

pub fn band_pass_fir(order: usize, low: f64, high: f64) -> AnalysisResult<FilterCoefficients> {
    design_fir(order, BandSpec::BandPass { low, high })
}

/// Pass/stop-band edges for an IIR design, normalized to Nyquist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum IirSpec {
    LowPass { pass: f64, stop: f64 },
    HighPass { pass: f64, stop: f64 },
    BandPass { pass: [f64; 2], stop: [f64; 2] },
}

impl IirSpec {
    fn validate(&self) -> AnalysisResult<()> {
        match *self {
            Self::LowPass { pass, stop } => {
                check_normalized("pass", pass)?;
                check_normalized("stop", stop)?;
                if pass >= stop {
                    return Err(AnalysisError::invalid(
                        "stop",
                        format!("low-pass stop edge {stop} must lie above pass edge {pass}"),
                    ));
                }
            }
            Self::HighPass { pass, stop } => {
                check_normalized("pass", pass)?;
                check_normalized("stop", stop)?;
                if stop >= pass {
                    return Err(AnalysisError::invalid(
                        "stop",
                        format!("high-pass stop edge {stop} must lie below pass edge {pass}"),
                    ));
                }
            }
            Self::BandPass { pass, stop } => {
                for w in pass {
                    check_normalized("pass", w)?;
                }
                for w in stop {
                    check_normalized("stop", w)?;
                }
                if !(stop[0] < pass[0] && pass[0] < pass[1] && pass[1] < stop[1]) {
                    return Err(AnalysisError::invalid(
                        "stop",
                        format!("band-pass edges must nest as stop < pass < pass < stop, got {stop:?} / {pass:?}"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Pre-warp a normalized frequency onto the analog axis (sample rate 2).
fn warp(w: f64) -> f64 {
    (PI * w / 2.0).tan()
}

fn unwarp(w: f64) -> f64 {
    2.0 / PI * w.atan()
}

/// Smallest Butterworth order meeting the pass/stop specification, and the
/// natural frequencies (normalized) that put the passband edge at exactly
/// the allowed ripple.
fn butterworth_order(spec: &IirSpec) -> AnalysisResult<(u32, BandSpec)> {
    let selectivity = match *spec {
        IirSpec::LowPass { pass, stop } => warp(stop) / warp(pass),
        IirSpec::HighPass { pass, stop } => warp(pass) / warp(stop),
        IirSpec::BandPass { pass, stop } => {
            let (p0, p1) = (warp(pass[0]), warp(pass[1]));
            stop.iter()
                .map(|&s| {
                    let s = warp(s);
                    ((s * s - p0 * p1) / (s * (p0 - p1))).abs()
                })
                .fold(f64::INFINITY, f64::min)
        }
    };
    let g_stop = 10f64.powf(STOP_ATTENUATION_DB / 10.0);
    let g_pass = 10f64.powf(PASS_RIPPLE_DB / 10.0);
    let order = ((g_stop - 1.0) / (g_pass - 1.0)).log10() / (2.0 * selectivity.log10());
    let order = order.ceil().max(1.0);
    if !order.is_finite() || order as usize > MAX_IIR_ORDER {
        return Err(AnalysisError::invalid(
            "stop",
            format!("transition band is too narrow (needs order {order}, limit {MAX_IIR_ORDER})"),
        ));
    }
    let order = order as u32;
    let w0 = (g_pass - 1.0).powf(-1.0 / (2.0 * order as f64));
    let natural = match *spec {
        IirSpec::LowPass { pass, .. } => BandSpec::LowPass {
            cutoff: unwarp(w0 * warp(pass)),
        },
        IirSpec::HighPass { pass, .. } => BandSpec::HighPass {
            cutoff: unwarp(warp(pass) / w0),
        },
        IirSpec::BandPass { pass, .. } => {
            let (p0, p1) = (warp(pass[0]), warp(pass[1]));
            let half_bw = w0 * (p1 - p0) / 2.0;
            let root = (half_bw * half_bw + p0 * p1).sqrt();
            BandSpec::BandPass {
                low: unwarp(root - half_bw),
                high: unwarp(root + half_bw),
            }
        }
    };
    Ok((order, natural))
}

/// Multiply out `prod (x - r)` for the given roots.
fn poly(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::one()];
    for &r in roots {
        let mut next = vec![Complex64::zero(); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * r;
        }
        coeffs = next;
    }
    coeffs
}

fn filter_type(natural: BandSpec) -> FilterType {
    match natural {
        BandSpec::LowPass { cutoff } => FilterType::LowPass(cutoff),
        BandSpec::HighPass { cutoff } => FilterType::HighPass(cutoff),
        BandSpec::BandPass { low, high } => FilterType::BandPass(low, high),
    }
}

fn design_error<E: std::fmt::Debug>(e: E) -> AnalysisError {
    AnalysisError::invalid("order", format!("butterworth design failed: {e:?}"))
}

impl Butterworth {
    /// Cascade of second-order sections realizing this design, at rest.
    pub(crate) fn sections(&self) -> AnalysisResult<DirectForm2Transposed> {
        let zpk = butter(self.order, filter_type(self.natural), 2.0).map_err(design_error)?;
        let sos = zpk2sos(&zpk, None).map_err(design_error)?;
        Ok(DirectForm2Transposed::new(&sos))
    }
}

/// Digital Butterworth zeros, poles and gain at the given natural frequencies.
pub fn butterworth_zpk(order: u32, natural: BandSpec) -> AnalysisResult<Butterworth> {
    natural.validate()?;
    // Sample rate 2 puts Nyquist at 1, so normalized frequencies pass through.
    let zpk = butter(order, filter_type(natural), 2.0).map_err(design_error)?;
    let zeros: Vec<Complex64> = zpk.z.iter().map(|c| Complex64::new(c.re, c.im)).collect();
    let poles: Vec<Complex64> = zpk.p.iter().map(|c| Complex64::new(c.re, c.im)).collect();
    if let Some(p) = poles.iter().find(|p| !p.norm().is_finite() || p.norm() >= 1.0) {
        return Err(AnalysisError::invalid(
            "order",
            format!("pole {p} of the order {order} design is not inside the unit circle"),
        ));
    }
    Ok(Butterworth {
        order,
        natural,
        zeros,
        poles,
        gain: zpk.k,
    })
}

/// Expand a zero/pole/gain design into `(b, a)` taps.
fn expand(design: Butterworth) -> FilterCoefficients {
    let a: Vec<f64> = poly(&design.poles).iter().map(|c| c.re).collect();
    let mut b: Vec<f64> = poly(&design.zeros)
        .iter()
        .map(|c| c.re * design.gain)
        .collect();
    if b.len() < a.len() {
        let mut padded = vec![0.0; a.len() - b.len()];
        padded.append(&mut b);
        b = padded;
    }
    FilterCoefficients {
        b,
        a,
        butterworth: Some(design),
    }
}

/// Minimum-order Butterworth design meeting 1 dB ripple / 40 dB attenuation.
///
/// The returned taps are informational for narrow bands; application and
/// [`FilterCoefficients::response_at`] use the zero/pole form.
pub fn design_iir(spec: IirSpec) -> AnalysisResult<FilterCoefficients> {
    spec.validate()?;
    let (order, natural) = butterworth_order(&spec)?;
    debug!("butterworth order {order}, natural frequencies {natural:?}");
    Ok(expand(butterworth_zpk(order, natural)?))
}

pub fn low_pass_iir(pass: f64, stop: f64) -> AnalysisResult<FilterCoefficients> {
    design_iir(IirSpec::LowPass { pass, stop })
}

pub fn high_pass_iir(pass: f64, stop: f64) -> AnalysisResult<FilterCoefficients> {
    design_iir(IirSpec::HighPass { pass, stop })
}

pub fn band_pass_iir(pass: [f64; 2], stop: [f64; 2]) -> AnalysisResult<FilterCoefficients> {
    design_iir(IirSpec::BandPass { pass, stop })
}
