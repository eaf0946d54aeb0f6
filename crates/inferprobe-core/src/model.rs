//! Test cases, per-case outcomes and the records written for failed cases.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{TransportError, TransportErrorKind};

/// Input object sent to the inference endpoint.
pub type Payload = Map<String, Value>;

/// Column added to every failure row holding the expected label.
pub const GROUND_TRUTH_COLUMN: &str = "ground_truth";

/// Column added to every failure row holding the predicted label.
pub const PRED_COLUMN: &str = "pred";

/// One labelled payload, loaded once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// 0-based position in the input file (submission order).
    pub index: usize,
    pub payload: Payload,
    pub expected_label: Value,
}

/// HTTP-level status of a completed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallStatus {
    Success,
    RemoteError { http_status: u16 },
}

impl CallStatus {
    pub fn from_http(status: u16) -> Self {
        if (200..300).contains(&status) {
            Self::Success
        } else {
            Self::RemoteError {
                http_status: status,
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Terminal outcome of a case whose remote call completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub index: usize,
    pub payload: Payload,
    pub expected_label: Value,
    pub status: CallStatus,
    /// Absent on a remote error or when the response lacks the comparison field.
    pub predicted_label: Option<Value>,
    pub duration_ms: u64,
}

impl InferenceResult {
    /// Success status and a predicted label exactly equal to the expected one.
    pub fn is_match(&self) -> bool {
        self.status.is_success() && self.predicted_label.as_ref() == Some(&self.expected_label)
    }

    /// `None` for a match, otherwise the annotated payload.
    pub fn failure_record(&self) -> Option<FailureRecord> {
        if self.is_match() {
            return None;
        }
        Some(FailureRecord {
            index: self.index,
            payload: self.payload.clone(),
            ground_truth: self.expected_label.clone(),
            pred: self.predicted_label.clone(),
        })
    }
}

/// Payload annotated with `ground_truth` and `pred`.
///
/// Serializes as a single flat object, the same shape as a CSV row.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRecord {
    pub index: usize,
    pub payload: Payload,
    pub ground_truth: Value,
    pub pred: Option<Value>,
}

impl FailureRecord {
    /// Flat row: payload fields, then `ground_truth` and `pred` (null when absent).
    ///
    /// A payload field with either annotation name is overwritten.
    pub fn to_row(&self) -> Payload {
        let mut row = self.payload.clone();
        row.remove(GROUND_TRUTH_COLUMN);
        row.remove(PRED_COLUMN);
        row.insert(GROUND_TRUTH_COLUMN.to_string(), self.ground_truth.clone());
        row.insert(
            PRED_COLUMN.to_string(),
            self.pred.clone().unwrap_or(Value::Null),
        );
        row
    }
}

impl Serialize for FailureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_row().serialize(serializer)
    }
}

/// A case that never produced an [`InferenceResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportFailure {
    pub index: usize,
    pub payload: Payload,
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportFailure {
    pub fn new(case: &TestCase, err: &TransportError) -> Self {
        Self {
            index: case.index,
            payload: case.payload.clone(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
