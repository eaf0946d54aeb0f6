//! Concurrent evaluator: one remote call per test case under a concurrency
//! bound, outcomes partitioned into results, failure records and transport
//! failures.

mod compare;
mod execute;

use std::sync::Arc;
use std::time::Duration;

use crate::client::InferenceClient;
use crate::error::{ProbeError, ProbeResult};
use crate::model::{FailureRecord, InferenceResult, TestCase, TransportFailure};
use crate::report::progress::ProgressSink;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalSettings {
    /// Maximum number of calls in flight.
    pub concurrency: usize,
    /// Deadline for a single call.
    pub timeout: Duration,
}

impl Default for EvalSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl EvalSettings {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Everything a run produced. All three collections are sorted by case index.
#[derive(Debug, Clone, Default)]
pub struct EvalReport {
    /// One entry per case whose call completed (match, mismatch or remote error).
    pub results: Vec<InferenceResult>,
    /// Results that are not a match.
    pub failures: Vec<FailureRecord>,
    /// Cases that never completed.
    pub transport_failures: Vec<TransportFailure>,
    pub elapsed_ms: u64,
}

impl EvalReport {
    pub fn total(&self) -> usize {
        self.results.len() + self.transport_failures.len()
    }

    pub fn matched(&self) -> usize {
        self.results.iter().filter(|r| r.is_match()).count()
    }

    /// Success status with a wrong or missing label.
    pub fn mismatched(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status.is_success() && !r.is_match())
            .count()
    }

    pub fn remote_errors(&self) -> usize {
        self.results
            .iter()
            .filter(|r| !r.status.is_success())
            .count()
    }

    /// Share of completed calls that matched; `None` when nothing completed.
    pub fn accuracy(&self) -> Option<f64> {
        if self.results.is_empty() {
            None
        } else {
            Some(self.matched() as f64 / self.results.len() as f64)
        }
    }

    /// No failure records and no transport failures.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.transport_failures.is_empty()
    }
}

pub struct Evaluator {
    client: Arc<dyn InferenceClient>,
    comparison_field: Arc<str>,
    settings: EvalSettings,
}

impl Evaluator {
    pub fn new(
        client: Arc<dyn InferenceClient>,
        comparison_field: impl Into<String>,
        settings: EvalSettings,
    ) -> ProbeResult<Self> {
        let comparison_field: String = comparison_field.into();
        if comparison_field.is_empty() {
            return Err(ProbeError::config("comparison field is empty"));
        }
        if settings.concurrency == 0 {
            return Err(ProbeError::config("concurrency must be at least 1"));
        }
        if settings.timeout.is_zero() {
            return Err(ProbeError::config("timeout must be greater than zero"));
        }
        Ok(Self {
            client,
            comparison_field: comparison_field.into(),
            settings,
        })
    }

    pub fn settings(&self) -> EvalSettings {
        self.settings
    }

    pub fn comparison_field(&self) -> &str {
        &self.comparison_field
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    /// Dispatch every case and wait until all of them are terminal.
    pub async fn evaluate(
        &self,
        cases: &[TestCase],
        progress: Option<ProgressSink>,
    ) -> EvalReport {
        execute::evaluate_impl(self, cases, progress).await
    }
}
