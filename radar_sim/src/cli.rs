use clap::Parser;
use std::path::PathBuf;

/// radar-sim: drives simulated automotive radars through a scripted scene.
///
/// This struct defines the command-line arguments that can be passed to the
/// `radar-sim` binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/00_highway.toml")]
    pub scenario: PathBuf,

    /// Directory holding the prefab catalog.
    #[arg(short, long, default_value = "assets/catalog")]
    pub catalog: PathBuf,

    /// Number of steps to run instead of the scenario's duration.
    #[arg(long)]
    pub steps: Option<u64>,

    /// Print the resolved scenario as TOML and exit.
    #[arg(long, default_value_t = false)]
    pub dump_config: bool,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    pub log: String,
}
