//! Run configuration.
//!
//! Values come from an optional YAML file; the CLI overlays flags and
//! environment variables on top. Nothing here carries a default endpoint or
//! credential.
//!
//! ```yaml
//! endpoint: https://model.example.run.app/predict
//! comparison_field: riesgo
//! label_field: riesgo
//! flat: true
//! concurrency: 10
//! timeout_secs: 30
//! output: fail_predictions.csv
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::{EvalSettings, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_SECS};
use crate::error::{ProbeError, ProbeResult};
use crate::source::InputShape;

#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeConfig {
    /// Inference endpoint URL.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token. Prefer the environment over the file.
    #[serde(default)]
    pub token: Option<String>,

    /// Response field holding the predicted label.
    #[serde(default)]
    pub comparison_field: Option<String>,

    /// Input field holding the expected label.
    #[serde(default = "default_label_field")]
    pub label_field: String,

    /// Input field holding the payload object (nested shape).
    #[serde(default = "default_payload_key")]
    pub payload_key: String,

    /// Flattened input shape: the element is the payload.
    #[serde(default)]
    pub flat: bool,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// CSV of failure rows.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Optional JSON dump of failure rows.
    #[serde(default)]
    pub json_output: Option<PathBuf>,

    /// Optional summary.json.
    #[serde(default)]
    pub summary: Option<PathBuf>,
}

fn default_label_field() -> String {
    "ground_truth".to_string()
}

fn default_payload_key() -> String {
    "payload".to_string()
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_output() -> PathBuf {
    PathBuf::from("fail_predictions.csv")
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: None,
            comparison_field: None,
            label_field: default_label_field(),
            payload_key: default_payload_key(),
            flat: false,
            concurrency: default_concurrency(),
            timeout_secs: default_timeout(),
            output: default_output(),
            json_output: None,
            summary: None,
        }
    }
}

impl std::fmt::Debug for ProbeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("comparison_field", &self.comparison_field)
            .field("label_field", &self.label_field)
            .field("payload_key", &self.payload_key)
            .field("flat", &self.flat)
            .field("concurrency", &self.concurrency)
            .field("timeout_secs", &self.timeout_secs)
            .field("output", &self.output)
            .field("json_output", &self.json_output)
            .field("summary", &self.summary)
            .finish()
    }
}

/// Endpoint settings checked by [`ProbeConfig::validate`].
#[derive(Clone)]
pub struct RunTarget {
    pub endpoint: String,
    pub token: String,
    pub comparison_field: String,
}

impl std::fmt::Debug for RunTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunTarget")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .field("comparison_field", &self.comparison_field)
            .finish()
    }
}

fn required(value: &Option<String>, message: &str) -> ProbeResult<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ProbeError::config(message)),
    }
}

impl ProbeConfig {
    /// Parse a YAML (or JSON) config file.
    pub fn from_file(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ProbeError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        serde_yaml::from_str(&text).map_err(|e| {
            ProbeError::config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_comparison_field(mut self, field: impl Into<String>) -> Self {
        self.comparison_field = Some(field.into());
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Input shape for the payload source.
    pub fn input_shape(&self) -> InputShape {
        if self.flat {
            InputShape::flat(self.label_field.clone())
        } else {
            InputShape::nested(self.payload_key.clone(), self.label_field.clone())
        }
    }

    pub fn eval_settings(&self) -> EvalSettings {
        EvalSettings {
            concurrency: self.concurrency,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// Check everything needed for a live run.
    pub fn validate(&self) -> ProbeResult<RunTarget> {
        let endpoint = required(
            &self.endpoint,
            "endpoint URL is required (--endpoint or INFERPROBE_ENDPOINT)",
        )?;
        let token = required(
            &self.token,
            "bearer token is required (--token or INFERPROBE_TOKEN)",
        )?;
        let comparison_field = required(
            &self.comparison_field,
            "comparison field is required (--comparison-field)",
        )?;
        self.validate_shape()?;
        if self.concurrency == 0 {
            return Err(ProbeError::config("concurrency must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(ProbeError::config("timeout_secs must be at least 1"));
        }
        Ok(RunTarget {
            endpoint,
            token,
            comparison_field,
        })
    }

    /// Check only what loading the input needs.
    pub fn validate_shape(&self) -> ProbeResult<()> {
        if self.label_field.is_empty() {
            return Err(ProbeError::config("label field is empty"));
        }
        if !self.flat && self.payload_key.is_empty() {
            return Err(ProbeError::config("payload key is empty"));
        }
        Ok(())
    }
}
