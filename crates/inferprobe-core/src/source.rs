//! Payload source: reads labelled test cases from a JSON file.
//!
//! Two input shapes are supported, resolved once by [`InputShape`]:
//!
//! - nested: `[{"payload": {...}, "ground_truth": V}, ...]`
//! - flattened: `[{...fields..., "riesgo": V}, ...]`, the label embedded in
//!   the payload (the shape produced by a warehouse table export)

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{ProbeError, ProbeResult};
use crate::model::TestCase;

/// Where the payload and the expected label live in each input element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputShape {
    /// Field holding the expected label.
    pub label_field: String,

    /// Field holding the payload object; `None` means the element itself is
    /// the payload and `label_field` is removed from it before dispatch.
    pub payload_key: Option<String>,
}

impl Default for InputShape {
    fn default() -> Self {
        Self::nested("payload", "ground_truth")
    }
}

impl InputShape {
    pub fn nested(payload_key: impl Into<String>, label_field: impl Into<String>) -> Self {
        Self {
            label_field: label_field.into(),
            payload_key: Some(payload_key.into()),
        }
    }

    pub fn flat(label_field: impl Into<String>) -> Self {
        Self {
            label_field: label_field.into(),
            payload_key: None,
        }
    }

    /// Turn one input element into a test case.
    pub fn extract(&self, index: usize, element: Value) -> Result<TestCase, String> {
        let Value::Object(mut obj) = element else {
            return Err(format!("element {} is not an object", index));
        };

        let (payload, expected_label) = match &self.payload_key {
            Some(key) => {
                let expected = obj.remove(&self.label_field).ok_or_else(|| {
                    format!("element {} is missing field '{}'", index, self.label_field)
                })?;
                let payload = match obj.remove(key) {
                    Some(Value::Object(p)) => p,
                    Some(_) => {
                        return Err(format!(
                            "element {}: field '{}' is not an object",
                            index, key
                        ))
                    }
                    None => return Err(format!("element {} is missing field '{}'", index, key)),
                };
                (payload, expected)
            }
            None => {
                let expected = obj.remove(&self.label_field).ok_or_else(|| {
                    format!("element {} is missing field '{}'", index, self.label_field)
                })?;
                (obj, expected)
            }
        };

        Ok(TestCase {
            index,
            payload,
            expected_label,
        })
    }
}

/// Parse test cases from a JSON document.
pub fn parse_test_cases(content: &str, shape: &InputShape) -> Result<Vec<TestCase>, String> {
    let doc: Value = serde_json::from_str(content).map_err(|e| format!("invalid JSON: {}", e))?;
    let Value::Array(elements) = doc else {
        return Err("top-level value must be an array of test cases".to_string());
    };
    if elements.is_empty() {
        return Err("no test cases found".to_string());
    }

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| shape.extract(index, element))
        .collect()
}

/// Load test cases from `path`. Any failure is a [`ProbeError::MalformedInput`].
pub fn load_test_cases(path: &Path, shape: &InputShape) -> ProbeResult<Vec<TestCase>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ProbeError::malformed(path, format!("failed to read file: {}", e)))?;
    let cases = parse_test_cases(&content, shape).map_err(|msg| ProbeError::malformed(path, msg))?;
    debug!(
        path = %path.display(),
        count = cases.len(),
        label_field = %shape.label_field,
        "loaded test cases"
    );
    Ok(cases)
}
