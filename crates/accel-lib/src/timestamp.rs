//! Conversion of calendar timestamps to microsecond and millisecond scales.

use crate::error::{AnalysisError, AnalysisResult};
use chrono::NaiveDateTime;

/// Layout of every timestamp in the input log.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const MAX_FRACTION_DIGITS: usize = 6;

/// Parse one `YYYY-MM-DD HH:MM:SS.ffffff` timestamp into whole microseconds
/// since the Unix epoch. The calendar time is read as UTC.
pub fn parse_timestamp_us(text: &str) -> Option<i64> {
    let text = text.trim();
    let (_, fraction) = text.rsplit_once('.')?;
    if fraction.is_empty()
        || fraction.len() > MAX_FRACTION_DIGITS
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let parsed = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()?;
    Some(parsed.and_utc().timestamp_micros())
}

/// Milliseconds since the Unix epoch.
///
/// Near the present epoch one `f64` step is about 0.24 µs, so sub-millisecond
/// differences of absolute values are not exact. Arithmetic on deltas should
/// start from [`normalize_timestamps_us`].
pub fn parse_timestamp_ms(text: &str) -> Option<f64> {
    parse_timestamp_us(text).map(|us| us as f64 / 1000.0)
}

/// Parse and order-check a timestamp sequence, keeping index correspondence.
pub fn normalize_timestamps_us<'a, I>(timestamps: I) -> AnalysisResult<Vec<i64>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out: Vec<i64> = Vec::new();
    for (index, text) in timestamps.into_iter().enumerate() {
        let us = parse_timestamp_us(text).ok_or_else(|| AnalysisError::Format {
            index,
            value: text.to_string(),
        })?;
        if out.last().is_some_and(|prev| us < *prev) {
            return Err(AnalysisError::NotMonotonic { index });
        }
        out.push(us);
    }
    Ok(out)
}

/// Normalize an ordered sequence of timestamps to epoch milliseconds.
pub fn normalize_timestamps<'a, I>(timestamps: I) -> AnalysisResult<Vec<f64>>
where
    I: IntoIterator<Item = &'a str>,
{
    Ok(normalize_timestamps_us(timestamps)?
        .into_iter()
        .map(|us| us as f64 / 1000.0)
        .collect())
}

/// Milliseconds elapsed since `origin_us`, exact to the microsecond for any
/// realistic log length.
pub fn relative_ms(timestamps_us: &[i64], origin_us: i64) -> Vec<f64> {
    timestamps_us
        .iter()
        .map(|&us| (us - origin_us) as f64 / 1000.0)
        .collect()
}
