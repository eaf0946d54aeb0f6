use std::path::Path;

use crate::error::{ProbeError, ProbeResult};
use crate::model::FailureRecord;

use super::write_atomic;

/// Pretty JSON array of failure rows, same objects as the CSV rows.
pub fn write_failures_json(records: &[FailureRecord], out: &Path) -> ProbeResult<()> {
    let text = serde_json::to_string_pretty(records).map_err(|e| ProbeError::output(out, e))?;
    write_atomic(out, text.as_bytes())
}
