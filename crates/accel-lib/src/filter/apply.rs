use super::FilterCoefficients;
use crate::error::{AnalysisError, AnalysisResult};
use iir_filters::filter::{DirectForm2Transposed, Filter};

/// Causal FIR filter with zero initial state, one sample at a time.
#[derive(Debug, Clone)]
pub struct FirFilter {
    taps: Vec<f64>,
    history: Vec<f64>,
}

impl FirFilter {
    pub fn new(taps: &[f64]) -> AnalysisResult<Self> {
        if taps.is_empty() {
            return Err(AnalysisError::EmptyInput("FIR filter taps"));
        }
        Ok(Self {
            taps: taps.to_vec(),
            history: vec![0.0; taps.len()],
        })
    }

    /// `y[n] = Σ b[j]·x[n-j]`
    pub fn process(&mut self, x: f64) -> f64 {
        self.history.rotate_right(1);
        self.history[0] = x;
        self.taps
            .iter()
            .zip(&self.history)
            .map(|(b, x)| b * x)
            .sum()
    }

    pub fn reset(&mut self) {
        self.history.fill(0.0);
    }
}

enum Recursion {
    /// Input and output histories are kept in separate buffers, so a delayed
    /// output is never overwritten while the current output is being formed.
    Direct {
        b: Vec<f64>,
        a: Vec<f64>,
        x_history: Vec<f64>,
        y_history: Vec<f64>,
    },
    Sections(DirectForm2Transposed),
}

impl Recursion {
    fn new(coeffs: &FilterCoefficients) -> AnalysisResult<Self> {
        if let Some(design) = &coeffs.butterworth {
            return Ok(Self::Sections(design.sections()?));
        }
        if coeffs.b.is_empty() {
            return Err(AnalysisError::EmptyInput("IIR numerator"));
        }
        let a0 = match coeffs.a.first() {
            Some(&a0) if a0 != 0.0 && a0.is_finite() => a0,
            _ => {
                return Err(AnalysisError::invalid(
                    "a",
                    "leading denominator coefficient must be finite and non-zero",
                ))
            }
        };
        let b: Vec<f64> = coeffs.b.iter().map(|c| c / a0).collect();
        let a: Vec<f64> = coeffs.a.iter().map(|c| c / a0).collect();
        Ok(Self::Direct {
            x_history: vec![0.0; b.len()],
            y_history: vec![0.0; a.len().saturating_sub(1)],
            b,
            a,
        })
    }
}

/// IIR filter with zero initial state.
///
/// Butterworth designs run as cascaded second-order sections; any other
/// `(b, a)` pair runs in direct form.
pub struct IirFilter {
    coeffs: FilterCoefficients,
    recursion: Recursion,
}

impl IirFilter {
    pub fn new(coeffs: &FilterCoefficients) -> AnalysisResult<Self> {
        Ok(Self {
            recursion: Recursion::new(coeffs)?,
            coeffs: coeffs.clone(),
        })
    }

    /// `y[n] = Σ b[j]·x[n-j] − Σ_{j≥1} a[j]·y[n-j]`
    pub fn process(&mut self, x: f64) -> f64 {
        match &mut self.recursion {
            Recursion::Sections(sections) => sections.filter(x),
            Recursion::Direct {
                b,
                a,
                x_history,
                y_history,
            } => {
                x_history.rotate_right(1);
                x_history[0] = x;
                let feed_forward: f64 = b.iter().zip(x_history.iter()).map(|(b, x)| b * x).sum();
                let feedback: f64 = a[1..]
                    .iter()
                    .zip(y_history.iter())
                    .map(|(a, y)| a * y)
                    .sum();
                let y = feed_forward - feedback;
                if !y_history.is_empty() {
                    y_history.rotate_right(1);
                    y_history[0] = y;
                }
                y
            }
        }
    }

    pub fn reset(&mut self) -> AnalysisResult<()> {
        self.recursion = Recursion::new(&self.coeffs)?;
        Ok(())
    }
}

/// Convolve `x` with FIR taps; output has the length of `x`.
pub fn fir_filter(taps: &[f64], x: &[f64]) -> AnalysisResult<Vec<f64>> {
    let mut filter = FirFilter::new(taps)?;
    Ok(x.iter().map(|&v| filter.process(v)).collect())
}

/// Run `x` through the recursive filter `(b, a)`; output has the length of `x`.
pub fn iir_filter(coeffs: &FilterCoefficients, x: &[f64]) -> AnalysisResult<Vec<f64>> {
    let mut filter = IirFilter::new(coeffs)?;
    Ok(x.iter().map(|&v| filter.process(v)).collect())
}

/// Apply any coefficient set, picking the cheaper FIR path when `a = [1]`.
pub fn apply_filter(coeffs: &FilterCoefficients, x: &[f64]) -> AnalysisResult<Vec<f64>> {
    if coeffs.is_fir() && coeffs.a[0] == 1.0 {
        fir_filter(&coeffs.b, x)
    } else {
        iir_filter(coeffs, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::design::{band_pass_iir, low_pass_fir, low_pass_iir};
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::f64::consts::PI;

    fn impulse(n: usize) -> Vec<f64> {
        let mut x = vec![0.0; n];
        x[0] = 1.0;
        x
    }

    /// The difference equation written out term by term.
    fn difference_equation(b: &[f64], a: &[f64], x: &[f64]) -> Vec<f64> {
        let mut y = vec![0.0; x.len()];
        for n in 0..x.len() {
            let mut acc = 0.0;
            for (j, bj) in b.iter().enumerate() {
                if j <= n {
                    acc += bj * x[n - j];
                }
            }
            for (j, aj) in a.iter().enumerate().skip(1) {
                if j <= n {
                    acc -= aj * y[n - j];
                }
            }
            y[n] = acc / a[0];
        }
        y
    }

    #[test]
    fn fir_impulse_response_is_the_taps() {
        let taps = low_pass_fir(12, 0.3).unwrap().b;
        let y = fir_filter(&taps, &impulse(20)).unwrap();
        assert_eq!(y.len(), 20);
        assert_eq!(&y[..taps.len()], taps.as_slice());
        assert!(y[taps.len()..].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn fir_shorter_input_than_taps() {
        let y = fir_filter(&[1.0, 2.0, 3.0], &[1.0, 1.0]).unwrap();
        assert_eq!(y, vec![1.0, 3.0]);
    }

    #[test]
    fn iir_identity_reproduces_input() {
        let x = vec![0.5, -1.0, 3.25, 0.0, 7.0];
        let identity = FilterCoefficients::new(vec![1.0], vec![1.0]);
        assert_eq!(iir_filter(&identity, &x).unwrap(), x);
    }

    #[test]
    fn iir_one_pole_recursion() {
        let coeffs = FilterCoefficients::new(vec![1.0], vec![1.0, -0.5]);
        let y = iir_filter(&coeffs, &impulse(4)).unwrap();
        assert_eq!(y, vec![1.0, 0.5, 0.25, 0.125]);
    }

    #[test]
    fn iir_normalizes_leading_denominator() {
        let scaled = FilterCoefficients::new(vec![2.0, 2.0], vec![2.0, -1.0]);
        let unit = FilterCoefficients::new(vec![1.0, 1.0], vec![1.0, -0.5]);
        let x = [1.0, 2.0, -1.0, 0.5];
        assert_eq!(iir_filter(&scaled, &x).unwrap(), iir_filter(&unit, &x).unwrap());
    }

    #[test]
    fn iir_rejects_zero_leading_denominator() {
        let bad = FilterCoefficients::new(vec![1.0], vec![0.0, 1.0]);
        assert!(matches!(
            iir_filter(&bad, &[1.0]),
            Err(AnalysisError::InvalidParameter { name: "a", .. })
        ));
        assert!(fir_filter(&[], &[1.0]).is_err());
    }

    #[test]
    fn fir_coefficients_through_iir_path_match_convolution() {
        let coeffs = low_pass_fir(8, 0.4).unwrap();
        let x: Vec<f64> = (0..50).map(|i| (i as f64 * 0.7).sin()).collect();
        let direct = fir_filter(&coeffs.b, &x).unwrap();
        let recursive = iir_filter(&coeffs, &x).unwrap();
        for (d, r) in direct.iter().zip(&recursive) {
            assert!((d - r).abs() < 1e-12);
        }
    }

    #[test]
    fn random_taps_follow_the_difference_equation() {
        let mut rng = StdRng::seed_from_u64(3);
        let x: Vec<f64> = (0..300).map(|_| rng.gen_range(-1.0..1.0)).collect();
        for _ in 0..5 {
            let taps: Vec<f64> = (0..9).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let y = fir_filter(&taps, &x).unwrap();
            let expected = difference_equation(&taps, &[1.0], &x);
            for (got, want) in y.iter().zip(&expected) {
                assert!((got - want).abs() < 1e-12);
            }

            // Two real poles inside the unit circle keep the recursion bounded.
            let (p1, p2): (f64, f64) = (rng.gen_range(-0.9..0.9), rng.gen_range(-0.9..0.9));
            let a0 = rng.gen_range(0.5..2.0);
            let a = vec![a0, -a0 * (p1 + p2), a0 * p1 * p2];
            let b: Vec<f64> = (0..4).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let y = iir_filter(&FilterCoefficients::new(b.clone(), a.clone()), &x).unwrap();
            let expected = difference_equation(&b, &a, &x);
            for (got, want) in y.iter().zip(&expected) {
                assert!((got - want).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn butterworth_sections_follow_the_difference_equation() {
        let mut rng = StdRng::seed_from_u64(11);
        let x: Vec<f64> = (0..400).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let coeffs = low_pass_iir(0.2, 0.4).unwrap();
        assert!(coeffs.butterworth.is_some());
        let y = iir_filter(&coeffs, &x).unwrap();
        let expected = difference_equation(&coeffs.b, &coeffs.a, &x);
        for (got, want) in y.iter().zip(&expected) {
            assert!((got - want).abs() < 1e-9, "{got} vs {want}");
        }
    }

    #[test]
    fn narrow_low_pass_step_response_settles() {
        let step = vec![1.0; 20_000];
        for (pass, stop, tol) in [(0.005, 0.01, 1e-6), (0.002, 0.004, 1e-4), (0.001, 0.0015, 2e-2)] {
            let coeffs = low_pass_iir(pass, stop).unwrap();
            let y = iir_filter(&coeffs, &step).unwrap();
            assert!(y.iter().all(|v| v.is_finite() && v.abs() < 1.5), "{pass}/{stop}");
            let last = y[y.len() - 1];
            assert!((last - 1.0).abs() < tol, "{pass}/{stop}: settled at {last}");
        }
    }

    #[test]
    fn narrow_band_pass_keeps_centre_tone() {
        let coeffs = band_pass_iir([0.01, 0.02], [0.005, 0.04]).unwrap();
        let x: Vec<f64> = (0..20_000).map(|n| (PI * 0.015 * n as f64).sin()).collect();
        let y = iir_filter(&coeffs, &x).unwrap();
        let tail = y[10_000..].iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(tail > 0.85 && tail < 1.05, "tail amplitude {tail}");
    }

    #[test]
    fn reset_restores_zero_state() {
        let coeffs = low_pass_iir(0.3, 0.6).unwrap();
        let mut filter = IirFilter::new(&coeffs).unwrap();
        let first: Vec<f64> = impulse(10).iter().map(|&v| filter.process(v)).collect();
        filter.reset().unwrap();
        let second: Vec<f64> = impulse(10).iter().map(|&v| filter.process(v)).collect();
        assert_eq!(first, second);

        let mut fir = FirFilter::new(&[0.25, 0.5, 0.25]).unwrap();
        let first: Vec<f64> = impulse(5).iter().map(|&v| fir.process(v)).collect();
        fir.reset();
        let second: Vec<f64> = impulse(5).iter().map(|&v| fir.process(v)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn low_pass_settles_to_dc_level() {
        let coeffs = low_pass_iir(0.1, 0.3).unwrap();
        let y = iir_filter(&coeffs, &vec![2.0; 400]).unwrap();
        assert_eq!(y.len(), 400);
        assert!((y[399] - 2.0).abs() < 1e-6);
    }
}
