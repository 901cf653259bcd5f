use std::{fs::File, io::Read, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use steps::SensorSample;

/// One line of a recording as exported from the phone.
///
#[derive(Debug, Deserialize)]
struct RecordedSample {
    time: u64,
    x: f32,
    y: f32,
    z: f32,
}

pub fn read_recording(path: &Path) -> Result<Vec<SensorSample>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open recording {}", path.display()))?;
    parse_recording(file)
        .with_context(|| format!("Failed to read recording {}", path.display()))
}

pub fn parse_recording<R: Read>(input: R) -> Result<Vec<SensorSample>> {
    let mut reader = csv::Reader::from_reader(input);
    let mut samples = Vec::new();
    for (i, result) in reader.deserialize::<RecordedSample>().enumerate() {
        let row = result.with_context(|| format!("Malformed sample on data row {}", i + 1))?;
        samples.push(SensorSample::from_axes(row.x, row.y, row.z, row.time));
    }

    if samples.windows(2).any(|pair| pair[1].timestamp_ms < pair[0].timestamp_ms) {
        log::warn!("Timestamps go backwards in places, samples are replayed in file order");
    }
    Ok(samples)
}
