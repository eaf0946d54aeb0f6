//! summary.json: machine-readable outcome of a run.
//!
//! Counts always reconcile: `total == matched + mismatched + remote_errors +
//! transport_failures`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::EvalReport;
use crate::error::{ProbeError, ProbeResult, TransportErrorKind};

use super::write_atomic;

/// Current schema version for summary.json
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub schema_version: u32,
    pub run_id: String,
    /// RFC 3339 timestamp of when the summary was built.
    pub finished_at: String,
    pub endpoint: String,
    pub comparison_field: String,

    pub total: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub remote_errors: usize,
    pub transport_failures: usize,

    /// matched / completed calls; null when no call completed.
    pub accuracy: Option<f64>,
    pub exit_code: i32,
    pub duration_ms: u64,

    /// Cases excluded from the failure rows, with the reason.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<DroppedCase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedCase {
    pub index: usize,
    pub kind: TransportErrorKind,
    pub message: String,
}

impl RunSummary {
    pub fn from_report(
        report: &EvalReport,
        endpoint: impl Into<String>,
        comparison_field: impl Into<String>,
        exit_code: i32,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id: uuid::Uuid::new_v4().to_string(),
            finished_at: chrono::Utc::now().to_rfc3339(),
            endpoint: endpoint.into(),
            comparison_field: comparison_field.into(),
            total: report.total(),
            matched: report.matched(),
            mismatched: report.mismatched(),
            remote_errors: report.remote_errors(),
            transport_failures: report.transport_failures.len(),
            accuracy: report.accuracy(),
            exit_code,
            duration_ms: report.elapsed_ms,
            dropped: report
                .transport_failures
                .iter()
                .map(|f| DroppedCase {
                    index: f.index,
                    kind: f.kind,
                    message: f.message.clone(),
                })
                .collect(),
        }
    }
}

pub fn write_summary(summary: &RunSummary, out: &Path) -> ProbeResult<()> {
    let text = serde_json::to_string_pretty(summary).map_err(|e| ProbeError::output(out, e))?;
    write_atomic(out, text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CallStatus, InferenceResult, Payload, TransportFailure};
    use serde_json::json;

    fn result(index: usize, status: CallStatus, pred: Option<&str>) -> InferenceResult {
        InferenceResult {
            index,
            payload: Payload::new(),
            expected_label: json!("A"),
            status,
            predicted_label: pred.map(|p| json!(p)),
            duration_ms: 1,
        }
    }

    #[test]
    fn counts_reconcile_with_report() {
        let mut report = EvalReport {
            results: vec![
                result(0, CallStatus::Success, Some("A")),
                result(1, CallStatus::Success, Some("B")),
                result(2, CallStatus::RemoteError { http_status: 500 }, None),
                result(3, CallStatus::Success, Some("A")),
            ],
            transport_failures: vec![TransportFailure {
                index: 4,
                payload: Payload::new(),
                kind: TransportErrorKind::Timeout,
                message: "request timed out after 30s".into(),
            }],
            elapsed_ms: 12,
            ..Default::default()
        };
        report.failures = report
            .results
            .iter()
            .filter_map(|r| r.failure_record())
            .collect();

        let s = RunSummary::from_report(&report, "http://m/predict", "riesgo", 1);
        assert_eq!(s.total, 5);
        assert_eq!(
            s.matched + s.mismatched + s.remote_errors + s.transport_failures,
            s.total
        );
        assert_eq!((s.matched, s.mismatched, s.remote_errors), (2, 1, 1));
        assert_eq!(s.accuracy, Some(0.5));
        assert_eq!(s.dropped.len(), 1);
        assert_eq!(s.dropped[0].index, 4);

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("summary.json");
        write_summary(&s, &out).unwrap();
        let back: RunSummary =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(back.schema_version, SCHEMA_VERSION);
        assert_eq!(back.dropped, s.dropped);
    }
}
