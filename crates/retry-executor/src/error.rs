//! Error type for exhausted executions.

use std::fmt;

/// The terminal failure of an execution whose every attempt failed.
///
/// Intermediate failures are dropped as the executor retries; only the error
/// from the final attempt is kept.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Failed to fetch data after {max_retries} retries. Reason: {last_error}")]
pub struct RetryError<E> {
    attempts: usize,
    max_retries: usize,
    #[source]
    last_error: E,
}

impl<E> RetryError<E> {
    pub(crate) fn new(attempts: usize, max_retries: usize, last_error: E) -> Self {
        Self {
            attempts,
            max_retries,
            last_error,
        }
    }

    /// Total number of times the operation was invoked.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// The retry budget the execution ran with.
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// The error returned by the final attempt.
    pub fn last_error(&self) -> &E {
        &self.last_error
    }

    /// Consumes the failure, returning the final attempt's error.
    pub fn into_inner(self) -> E {
        self.last_error
    }
}

impl<E: fmt::Display> RetryError<E> {
    /// The message of the final attempt's error.
    pub fn message(&self) -> String {
        self.last_error.to_string()
    }
}
