use retry_executor_core::events::ExecutionEvent;
use std::time::{Duration, Instant};

/// Events emitted while the executor drives an operation.
///
/// For a single execution the sequence is always `Attempt`, then either
/// `Success`, or `AttemptFailed` followed by `Retry` (and the next `Attempt`)
/// or by `Exhausted`.
#[derive(Debug, Clone)]
pub enum RetryEvent {
    /// The operation is about to be invoked.
    Attempt {
        executor_name: String,
        timestamp: Instant,
        /// 1-based attempt number.
        attempt: usize,
        /// Retries left counting this attempt's own retry slot.
        retries_remaining: usize,
    },
    /// An attempt returned an error.
    AttemptFailed {
        executor_name: String,
        timestamp: Instant,
        attempt: usize,
        retries_remaining: usize,
        message: String,
    },
    /// The executor is about to wait before the next attempt.
    Retry {
        executor_name: String,
        timestamp: Instant,
        /// The attempt that just failed.
        attempt: usize,
        delay: Duration,
    },
    /// The operation succeeded.
    Success {
        executor_name: String,
        timestamp: Instant,
        attempts: usize,
    },
    /// The final permitted attempt failed.
    Exhausted {
        executor_name: String,
        timestamp: Instant,
        attempts: usize,
        max_retries: usize,
        message: String,
    },
}

impl ExecutionEvent for RetryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RetryEvent::Attempt { .. } => "Attempt",
            RetryEvent::AttemptFailed { .. } => "AttemptFailed",
            RetryEvent::Retry { .. } => "Retry",
            RetryEvent::Success { .. } => "Success",
            RetryEvent::Exhausted { .. } => "Exhausted",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RetryEvent::Attempt { timestamp, .. }
            | RetryEvent::AttemptFailed { timestamp, .. }
            | RetryEvent::Retry { timestamp, .. }
            | RetryEvent::Success { timestamp, .. }
            | RetryEvent::Exhausted { timestamp, .. } => *timestamp,
        }
    }

    fn executor_name(&self) -> &str {
        match self {
            RetryEvent::Attempt { executor_name, .. }
            | RetryEvent::AttemptFailed { executor_name, .. }
            | RetryEvent::Retry { executor_name, .. }
            | RetryEvent::Success { executor_name, .. }
            | RetryEvent::Exhausted { executor_name, .. } => executor_name,
        }
    }
}
