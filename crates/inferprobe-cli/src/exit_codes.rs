//! Process exit codes. Part of the public contract for CI usage.

pub const EXIT_SUCCESS: i32 = 0;
/// At least one failed prediction or dropped case.
pub const EXIT_FAILURES: i32 = 1;
/// Invalid configuration or malformed input; nothing was sent.
pub const EXIT_CONFIG_ERROR: i32 = 2;
/// The batch ran but an output file could not be written.
pub const EXIT_OUTPUT_ERROR: i32 = 3;

/// Exit code for a finished batch.
pub fn for_report(report: &inferprobe_core::EvalReport) -> i32 {
    if report.is_clean() {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURES
    }
}
