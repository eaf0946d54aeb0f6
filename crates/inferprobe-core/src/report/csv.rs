//! CSV sink for failure records.
//!
//! Columns are the union of payload fields in first-seen order, followed by
//! `ground_truth` and `pred`. The file is written to a temporary path in the
//! destination directory and persisted on success.

use std::io::BufWriter;
use std::path::Path;

use ::csv::Writer;
use serde_json::Value;

use crate::error::{ProbeError, ProbeResult};
use crate::model::{FailureRecord, GROUND_TRUTH_COLUMN, PRED_COLUMN};

use super::temp_file_for;

/// Header row for a set of records.
pub fn failure_columns(records: &[FailureRecord]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for key in record.payload.keys() {
            if key == GROUND_TRUTH_COLUMN || key == PRED_COLUMN {
                continue;
            }
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns.push(GROUND_TRUTH_COLUMN.to_string());
    columns.push(PRED_COLUMN.to_string());
    columns
}

/// Text of one cell: strings bare, null and missing empty, nested values as
/// compact JSON.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Write records to `path`, replacing any existing file.
pub fn write_failures_csv(records: &[FailureRecord], path: &Path) -> ProbeResult<()> {
    let tmp = temp_file_for(path)?;
    let mut writer = Writer::from_writer(BufWriter::new(tmp));

    let columns = failure_columns(records);
    writer
        .write_record(&columns)
        .map_err(|e| ProbeError::output(path, e))?;

    for record in records {
        let row = record.to_row();
        let cells = columns.iter().map(|c| cell_text(row.get(c)));
        writer
            .write_record(cells)
            .map_err(|e| ProbeError::output(path, e))?;
    }

    let buf = writer
        .into_inner()
        .map_err(|e| ProbeError::output(path, e.error()))?;
    let tmp = buf
        .into_inner()
        .map_err(|e| ProbeError::output(path, e.error()))?;
    tmp.persist(path)
        .map_err(|e| ProbeError::output(path, e.error))?;
    Ok(())
}
