use std::{fs, process};

use anyhow::{Context, Result};
use clap::Parser;
use steps::Calories;
use tracker::{ReplaySource, Tracker};

mod args;
mod recording;
mod report;

use args::Cli;
use report::CsvPresentation;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let samples = recording::read_recording(&cli.input)?;
    if samples.is_empty() {
        log::warn!("{} contains no samples", cli.input.display());
    }
    log::info!("Loaded {} samples from {}", samples.len(), cli.input.display());

    // Every input CSV file gets its own folder in the results directory.
    let name = cli.input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .context("Input file has no usable name")?;
    let out_dir = cli.out_dir.join(name);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let out_path = out_dir.join("readouts.csv");

    // With a paused clock the timers auto-advance, so the recording replays instantly while the
    // tracker still sees the recorded spacing between samples.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(!cli.realtime)
        .build()
        .context("Failed to start runtime")?;

    let summary = runtime.block_on(async {
        let presentation = CsvPresentation::create(&out_path)?;
        let handle = Tracker::start(ReplaySource::new(samples), presentation);
        anyhow::Ok(handle.join().await?)
    })?;

    println!(
        "{} steps, {} kcal ({} samples, {} discarded)",
        summary.steps,
        Calories::from_steps(summary.steps),
        summary.samples_seen,
        summary.samples_discarded,
    );
    println!("Readouts written to {}", out_path.display());
    Ok(())
}
