use std::path::PathBuf;

use clap::Parser;

pub static RESULTS_DIR: &str = "analysis";

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Replays a recorded accelerometer CSV through the step tracker.")]
pub struct Cli {
    /// CSV file with `time,x,y,z` columns, time in milliseconds.
    #[arg(index = 1)]
    pub input: PathBuf,

    /// Every recording gets its own folder in this directory.
    #[arg(long, default_value = RESULTS_DIR)]
    pub out_dir: PathBuf,

    /// Replay at wall clock speed instead of as fast as possible.
    #[arg(long)]
    pub realtime: bool,
}
