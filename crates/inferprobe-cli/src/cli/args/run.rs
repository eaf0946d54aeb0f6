//! Run command arguments.

use std::path::PathBuf;

use clap::Parser;
use inferprobe_core::ProbeConfig;

use super::ShapeArgs;

/// Flags override the config file; unset flags keep file values.
#[derive(Parser, Clone, Debug)]
pub struct RunArgs {
    /// JSON file with labelled test cases
    #[arg(long, default_value = "input.json")]
    pub input: PathBuf,

    /// YAML config file
    #[arg(long, env = "INFERPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Inference endpoint URL
    #[arg(long, env = "INFERPROBE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Bearer token sent in the Authorization header
    #[arg(long, env = "INFERPROBE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Response field holding the predicted label
    #[arg(long, env = "INFERPROBE_COMPARISON_FIELD")]
    pub comparison_field: Option<String>,

    #[command(flatten)]
    pub shape: ShapeArgs,

    /// Maximum number of requests in flight [default: 10]
    #[arg(long, env = "INFERPROBE_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds [default: 30]
    #[arg(long, env = "INFERPROBE_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// CSV file for failed predictions [default: fail_predictions.csv]
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Also write failed predictions as JSON
    #[arg(long)]
    pub json_output: Option<PathBuf>,

    /// Write a machine-readable run summary
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

impl RunArgs {
    /// Overlay flags onto `cfg`.
    pub fn apply(&self, cfg: &mut ProbeConfig) {
        if let Some(endpoint) = &self.endpoint {
            cfg.endpoint = Some(endpoint.clone());
        }
        if let Some(token) = &self.token {
            cfg.token = Some(token.clone());
        }
        if let Some(field) = &self.comparison_field {
            cfg.comparison_field = Some(field.clone());
        }
        self.shape.apply(cfg);
        if let Some(concurrency) = self.concurrency {
            cfg.concurrency = concurrency;
        }
        if let Some(timeout) = self.timeout_secs {
            cfg.timeout_secs = timeout;
        }
        if let Some(output) = &self.output {
            cfg.output = output.clone();
        }
        if let Some(json_output) = &self.json_output {
            cfg.json_output = Some(json_output.clone());
        }
        if let Some(summary) = &self.summary {
            cfg.summary = Some(summary.clone());
        }
    }
}
