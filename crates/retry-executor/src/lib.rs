//! Fixed-delay retry for asynchronous operations.
//!
//! A [`RetryExecutor`] invokes an operation, and when it fails, waits a fixed
//! delay and invokes it again, up to a retry budget. If every permitted attempt
//! fails, the caller gets a single [`RetryError`] carrying the budget and the
//! last failure; earlier failures are only visible through events.
//!
//! # Features
//!
//! - **Fixed delay**: the same wait between every pair of attempts
//! - **Sequential attempts**: an attempt never overlaps the previous one
//! - **Event system**: observe attempts, failures, retries and exhaustion
//! - **Tower adapter**: [`RetryLayer`] wraps any cloneable service
//!
//! # Examples
//!
//! ```
//! use retry_executor::RetryExecutor;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let executor = RetryExecutor::builder()
//!     .max_retries(3)
//!     .delay(Duration::from_millis(200))
//!     .on_retry(|attempt, delay| {
//!         println!("Attempt {} failed, retrying in {:?}", attempt, delay);
//!     })
//!     .build();
//!
//! let result = executor
//!     .execute(|| async { Ok::<_, std::io::Error>("Response from Sample-Resource") })
//!     .await;
//!
//! assert_eq!(result.unwrap(), "Response from Sample-Resource");
//! # }
//! ```

mod config;
mod error;
mod events;
mod layer;

pub use config::{RetryConfig, RetryConfigBuilder, DEFAULT_DELAY, DEFAULT_MAX_RETRIES};
pub use error::RetryError;
pub use events::RetryEvent;
pub use layer::{Retry, RetryLayer};

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_histogram, histogram};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Drives an operation until it succeeds or its retry budget runs out.
///
/// The executor only holds configuration, so one instance can serve any number
/// of concurrent executions. Cloning is cheap.
#[derive(Clone)]
pub struct RetryExecutor {
    config: Arc<RetryConfig>,
}

impl RetryExecutor {
    /// Creates an executor from the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        #[cfg(feature = "metrics")]
        {
            describe_counter!(
                "retry_calls_total",
                "Total number of executions (success or exhausted)"
            );
            describe_counter!(
                "retry_attempts_total",
                "Total number of operation invocations, including retries"
            );
            describe_histogram!("retry_attempts", "Number of attempts per execution");
        }

        Self {
            config: Arc::new(config),
        }
    }

    /// Creates a new builder for configuring an executor.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Returns the executor's configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Invokes `operation` until it succeeds or `max_retries + 1` attempts
    /// have failed.
    ///
    /// A success is returned as soon as it happens, even on the last permitted
    /// attempt. A failed attempt that is not the last one is followed by the
    /// configured delay; the last one is turned into a [`RetryError`] right
    /// away. The operation is never invoked again while a previous invocation
    /// is still pending, and there is no per-attempt timeout.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let config = &*self.config;
        let max_attempts = config.max_attempts();
        let mut attempt = 1;

        loop {
            let retries_remaining = config.retries_remaining(attempt);
            config.event_listeners.emit(&RetryEvent::Attempt {
                executor_name: config.name.clone(),
                timestamp: Instant::now(),
                attempt,
                retries_remaining,
            });

            #[cfg(feature = "metrics")]
            counter!("retry_attempts_total", "retry" => config.name.clone()).increment(1);

            match operation().await {
                Ok(value) => {
                    config.event_listeners.emit(&RetryEvent::Success {
                        executor_name: config.name.clone(),
                        timestamp: Instant::now(),
                        attempts: attempt,
                    });

                    #[cfg(feature = "metrics")]
                    {
                        counter!("retry_calls_total", "retry" => config.name.clone(), "result" => "success").increment(1);
                        histogram!("retry_attempts", "retry" => config.name.clone())
                            .record(attempt as f64);
                    }

                    #[cfg(feature = "tracing")]
                    debug!(retry = %config.name, attempts = attempt, "Operation succeeded");

                    return Ok(value);
                }
                Err(error) => {
                    let message = error.to_string();

                    #[cfg(feature = "tracing")]
                    warn!(
                        retry = %config.name,
                        attempt,
                        retries_remaining,
                        error = %message,
                        "Attempt failed"
                    );

                    config.event_listeners.emit(&RetryEvent::AttemptFailed {
                        executor_name: config.name.clone(),
                        timestamp: Instant::now(),
                        attempt,
                        retries_remaining,
                        message: message.clone(),
                    });

                    if attempt >= max_attempts {
                        config.event_listeners.emit(&RetryEvent::Exhausted {
                            executor_name: config.name.clone(),
                            timestamp: Instant::now(),
                            attempts: attempt,
                            max_retries: config.max_retries,
                            message,
                        });

                        #[cfg(feature = "metrics")]
                        {
                            counter!("retry_calls_total", "retry" => config.name.clone(), "result" => "exhausted").increment(1);
                            histogram!("retry_attempts", "retry" => config.name.clone())
                                .record(attempt as f64);
                        }

                        #[cfg(feature = "tracing")]
                        warn!(
                            retry = %config.name,
                            attempts = attempt,
                            max_retries = config.max_retries,
                            "Retries exhausted"
                        );

                        return Err(RetryError::new(attempt, config.max_retries, error));
                    }
                    drop(error);

                    config.event_listeners.emit(&RetryEvent::Retry {
                        executor_name: config.name.clone(),
                        timestamp: Instant::now(),
                        attempt,
                        delay: config.delay,
                    });

                    #[cfg(feature = "tracing")]
                    debug!(
                        retry = %config.name,
                        attempt,
                        delay_ms = config.delay.as_millis() as u64,
                        "Retrying after delay"
                    );

                    tokio::time::sleep(config.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("name", &self.config.name)
            .field("max_retries", &self.config.max_retries)
            .field("delay", &self.config.delay)
            .field("listeners", &self.config.event_listeners.len())
            .finish()
    }
}

/// Runs `operation` with `max_retries` retries and the default one second
/// delay.
///
/// ```
/// # async fn example() {
/// let data = retry_executor::execute_with_retry(
///     || async { Ok::<_, String>("Response from Sample-Resource") },
///     3,
/// )
/// .await;
/// assert!(data.is_ok());
/// # }
/// ```
pub async fn execute_with_retry<F, Fut, T, E>(
    operation: F,
    max_retries: usize,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    RetryExecutor::builder()
        .max_retries(max_retries)
        .build()
        .execute(operation)
        .await
}
