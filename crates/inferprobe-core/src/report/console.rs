use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::engine::EvalReport;
use crate::report::progress::{ProgressEvent, ProgressSink};

/// Format a single progress line for display.
#[must_use]
pub fn format_progress_line(ev: ProgressEvent) -> String {
    format!(
        "Evaluated case #{} ({}/{})",
        ev.index + 1,
        ev.done,
        ev.total
    )
}

/// Write a progress line to stderr.
pub fn emit_progress_line(line: &str) {
    eprintln!("{}", line);
}

/// Minimum interval between progress updates to avoid log spam.
const PROGRESS_MIN_INTERVAL_MS: u64 = 200;

/// Small batches report every case; larger ones at most every 5%.
pub(crate) fn progress_step(total: usize) -> usize {
    if total <= 20 {
        1
    } else {
        std::cmp::max(1, total / 20)
    }
}

/// Progress sink that throttles updates and prints to stderr. Always emits
/// the first and the final case.
pub fn default_progress_sink(total: usize) -> Option<ProgressSink> {
    if total == 0 {
        return None;
    }
    let step = progress_step(total);
    let last_emit: Arc<Mutex<Option<Instant>>> = Arc::new(Mutex::new(None));
    Some(Arc::new(move |ev: ProgressEvent| {
        let now = Instant::now();
        let should_emit = {
            // A poisoned lock only loses throttling state.
            let mut last = match last_emit.lock() {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner(),
            };
            let emit_edge = ev.done == ev.total || ev.done == 1;
            let interval_ok = last
                .map(|t| {
                    now.saturating_duration_since(t)
                        >= Duration::from_millis(PROGRESS_MIN_INTERVAL_MS)
                })
                .unwrap_or(true);
            let ok = emit_edge || step == 1 || (ev.done.is_multiple_of(step) && interval_ok);
            if ok {
                *last = Some(now);
            }
            ok
        };
        if should_emit {
            emit_progress_line(&format_progress_line(ev));
        }
    }))
}

/// One-line outcome of the run.
#[must_use]
pub fn format_summary_line(report: &EvalReport) -> String {
    let accuracy = report
        .accuracy()
        .map(|a| format!("{:.1}%", a * 100.0))
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "Evaluated {} cases in {:.1}s: {} matched, {} mismatched, {} remote errors, {} transport failures (accuracy {})",
        report.total(),
        report.elapsed_ms as f64 / 1000.0,
        report.matched(),
        report.mismatched(),
        report.remote_errors(),
        report.transport_failures.len(),
        accuracy
    )
}

pub fn print_summary(report: &EvalReport) {
    eprintln!("{}", format_summary_line(report));
}
