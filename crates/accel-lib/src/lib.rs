pub mod config;
pub mod error;
pub mod filter;
pub mod io;
pub mod peaks;
pub mod plot;
pub mod sampling;
pub mod session;
pub mod signal;
pub mod spectrum;
pub mod stats;
pub mod timestamp;

pub use error::{AnalysisError, AnalysisResult};
pub use signal::*;
