//! Progress reporting. The evaluator emits one event per terminal case, in
//! completion order; the console layer consumes them via a sink.

use std::sync::Arc;

/// One progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Cases that reached a terminal state so far.
    pub done: usize,
    pub total: usize,
    /// Submission index of the case that just finished.
    pub index: usize,
}

/// Sink for progress events. Implementations may throttle.
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;
