use crate::{
    filter::FilterKind,
    peaks::ScanMode,
    sampling::VerificationWindow,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pass band of the filtering view, in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum BandHz {
    LowPass { cutoff_hz: f64 },
    HighPass { cutoff_hz: f64 },
    BandPass { low_hz: f64, high_hz: f64 },
}

/// FIR settings of the filtering view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirSettings {
    pub order: usize,
    pub band: BandHz,
}

impl Default for FirSettings {
    fn default() -> Self {
        Self {
            order: 64,
            band: BandHz::LowPass { cutoff_hz: 5.0 },
        }
    }
}

/// IIR pass/stop edges of the filtering view, in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum IirSettings {
    LowPass { pass_hz: f64, stop_hz: f64 },
    HighPass { pass_hz: f64, stop_hz: f64 },
    BandPass { pass_hz: [f64; 2], stop_hz: [f64; 2] },
}

impl Default for IirSettings {
    fn default() -> Self {
        Self::LowPass {
            pass_hz: 5.0,
            stop_hz: 10.0,
        }
    }
}

/// Immutable parameters of an analysis session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub filter: FilterKind,
    pub verification: VerificationWindow,
    pub scan: ScanMode,
    pub fir: FirSettings,
    pub iir: IirSettings,
    pub histogram_bins: usize,
    /// Upper bound on points per plotted series
    pub max_plot_points: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            filter: FilterKind::Fir,
            verification: VerificationWindow::Full,
            scan: ScanMode::SkipAdjacent,
            fir: FirSettings::default(),
            iir: IirSettings::default(),
            histogram_bins: 10,
            max_plot_points: 4096,
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("parsing analysis config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn with_filter(self, filter: FilterKind) -> Self {
        Self { filter, ..self }
    }
}
