//! Evaluate a deployed ML inference endpoint against labelled payloads.
//!
//! - Payload source: labelled test cases from a JSON file, nested or flattened
//! - Concurrent evaluator: one POST per case under a concurrency bound
//! - Reports: failure rows as CSV/JSON, run summary, console progress
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use inferprobe_core::{load_test_cases, EvalSettings, Evaluator, HttpInferenceClient, InputShape};
//!
//! # async fn example() -> inferprobe_core::ProbeResult<()> {
//! let cases = load_test_cases(std::path::Path::new("input.json"), &InputShape::default())?;
//! let client = HttpInferenceClient::new(
//!     "https://model.example.run.app/predict",
//!     std::env::var("INFERPROBE_TOKEN").unwrap_or_default(),
//!     Duration::from_secs(30),
//! )?;
//! let evaluator = Evaluator::new(Arc::new(client), "riesgo", EvalSettings::default())?;
//! let report = evaluator.evaluate(&cases, None).await;
//! println!("{} of {} failed", report.failures.len(), report.total());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod report;
pub mod source;

pub use client::{EndpointResponse, HttpInferenceClient, InferenceClient};
pub use config::{ProbeConfig, RunTarget};
pub use engine::{EvalReport, EvalSettings, Evaluator};
pub use error::{ProbeError, ProbeResult, TransportError, TransportErrorKind};
pub use model::{CallStatus, FailureRecord, InferenceResult, Payload, TestCase, TransportFailure};
pub use source::{load_test_cases, parse_test_cases, InputShape};
