use crate::signal::{Recording, Sample};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Parse headerless `timestamp,value` records, one per line.
pub fn parse_samples<R: Read>(source: R) -> Result<Vec<Sample>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .flexible(false)
        .from_reader(source);
    let mut samples = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading record {}", idx + 1))?;
        let timestamp = record
            .get(0)
            .ok_or_else(|| anyhow::anyhow!("record {} has no timestamp", idx + 1))?;
        let value = record
            .get(1)
            .ok_or_else(|| anyhow::anyhow!("record {} has no value", idx + 1))?
            .parse::<f64>()
            .with_context(|| format!("record {} value is not a number", idx + 1))?;
        samples.push(Sample {
            timestamp: timestamp.to_string(),
            value,
        });
    }
    if samples.is_empty() {
        anyhow::bail!("no samples found");
    }
    Ok(samples)
}

/// Read every record of an acceleration log from disk.
pub fn read_samples(path: &Path) -> Result<Vec<Sample>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_samples(file).with_context(|| format!("parsing {}", path.display()))
}

/// Read a log and normalize its timestamps.
pub fn load_recording(path: &Path) -> Result<Recording> {
    let samples = read_samples(path)?;
    let recording = Recording::from_samples(&samples)
        .with_context(|| format!("normalizing timestamps of {}", path.display()))?;
    Ok(recording)
}
