use thiserror::Error;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Failures surfaced by the analysis stages.
///
/// I/O problems are not represented here; ingestion reports them through
/// `anyhow` with file context instead.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalysisError {
    #[error("timestamp at index {index} is malformed: {value:?} (expected YYYY-MM-DD HH:MM:SS.ffffff)")]
    Format { index: usize, value: String },
    #[error("timestamp at index {index} is earlier than its predecessor")]
    NotMonotonic { index: usize },
    #[error("series of {len} samples is too short, at least {min} are required")]
    TooShort { len: usize, min: usize },
    #[error("sampling period could not be estimated from {len} timestamps")]
    EstimationFailure { len: usize },
    #[error("{0} produced no result")]
    EmptyResult(&'static str),
    #[error("{0} requires a non-empty input")]
    EmptyInput(&'static str),
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl AnalysisError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
