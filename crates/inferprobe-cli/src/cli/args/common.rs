//! Shared argument types used across multiple commands.

use std::path::PathBuf;

use clap::ValueEnum;
use inferprobe_core::ProbeConfig;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Where payload and label live in the input file.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct ShapeArgs {
    /// Input field holding the expected label [default: ground_truth]
    #[arg(long, env = "INFERPROBE_LABEL_FIELD")]
    pub label_field: Option<String>,

    /// Input field holding the payload object [default: payload]
    #[arg(long, conflicts_with = "flat")]
    pub payload_key: Option<String>,

    /// Flattened input: each element is the payload, the label embedded in it
    #[arg(long)]
    pub flat: bool,
}

impl ShapeArgs {
    pub fn apply(&self, cfg: &mut ProbeConfig) {
        if let Some(field) = &self.label_field {
            cfg.label_field = field.clone();
        }
        if let Some(key) = &self.payload_key {
            cfg.payload_key = key.clone();
            cfg.flat = false;
        }
        if self.flat {
            cfg.flat = true;
        }
    }
}

#[derive(clap::Args, Clone, Debug)]
pub struct ValidateArgs {
    /// JSON file with labelled test cases
    #[arg(long, default_value = "input.json")]
    pub input: PathBuf,

    /// YAML config file (shape settings are read from it)
    #[arg(long, env = "INFERPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub shape: ShapeArgs,
}
