use std::{fs::File, io::Write, path::Path};

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::time::Instant;
use tracker::{Presentation, Readout};

#[derive(Debug, Serialize)]
struct ReadoutRow {
    elapsed_ms: u64,
    steps: u32,
    active: bool,
    calories: String,
}

/// Presentation that appends every readout to a CSV file, timed from the start of the replay.
///
pub struct CsvPresentation<W: Write>
{
    writer: csv::Writer<W>,
    start: Instant,
}

impl CsvPresentation<File> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(CsvPresentation::new(file))
    }
}

impl<W: Write> CsvPresentation<W> {
    pub fn new(out: W) -> Self {
        CsvPresentation {
            writer: csv::Writer::from_writer(out),
            start: Instant::now(),
        }
    }

    fn write(&mut self, readout: &Readout) -> csv::Result<()> {
        self.writer.serialize(ReadoutRow {
            elapsed_ms: self.start.elapsed().as_millis() as u64,
            steps: readout.steps,
            active: readout.active,
            calories: readout.calories.to_string(),
        })?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> Presentation for CsvPresentation<W> {
    fn render(&mut self, readout: &Readout) {
        log::debug!("{} steps, {} kcal, {:?}", readout.steps, readout.calories, readout.pose());
        if let Err(err) = self.write(readout) {
            log::error!("Failed to write readout: {}", err);
        }
    }
}
