use clap::{Parser, Subcommand};

pub mod common;
pub mod run;
pub use common::*;
pub use run::*;

#[derive(Parser)]
#[command(
    name = "inferprobe",
    version,
    about = "Evaluate a deployed ML inference endpoint against labelled payloads"
)]
pub struct Cli {
    /// Log output format (stderr)
    #[arg(long, value_enum, default_value_t, global = true, env = "INFERPROBE_LOG_FORMAT")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Send every test case to the endpoint and write mismatches
    Run(RunArgs),
    /// Load and check the input file without calling the endpoint
    Validate(ValidateArgs),
    Version,
}
