use crate::events::RetryEvent;
use crate::{RetryExecutor, RetryLayer};
use retry_executor_core::events::{EventListener, EventListeners, FnListener};
use std::time::Duration;

/// Retries granted after the first attempt when none are configured.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Wait between a failed attempt and the next one when none is configured.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// Configuration for a [`RetryExecutor`].
pub struct RetryConfig {
    pub(crate) max_retries: usize,
    pub(crate) delay: Duration,
    pub(crate) event_listeners: EventListeners<RetryEvent>,
    pub(crate) name: String,
}

impl RetryConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Retries permitted after the initial attempt.
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Total invocations permitted for one execution.
    pub fn max_attempts(&self) -> usize {
        self.max_retries.saturating_add(1)
    }

    /// The fixed wait between attempts.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The instance name reported in events, logs and metrics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Retries left once `attempt` (1-based) has started.
    pub(crate) fn retries_remaining(&self, attempt: usize) -> usize {
        self.max_retries.saturating_sub(attempt - 1)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfigBuilder::new().into_config()
    }
}

/// Builder for [`RetryConfig`].
pub struct RetryConfigBuilder {
    max_retries: usize,
    delay: Duration,
    event_listeners: EventListeners<RetryEvent>,
    name: String,
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryConfigBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - max_retries: 3 (four attempts in total)
    /// - delay: 1 second
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_DELAY,
            event_listeners: EventListeners::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets how many times a failed operation is retried.
    ///
    /// This excludes the initial attempt, so `max_retries(2)` allows three
    /// invocations and `max_retries(0)` allows exactly one.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the fixed wait between a failed attempt and the next one.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the name for this executor (used in events, logs and metrics).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a listener that receives every [`RetryEvent`].
    pub fn listener<L>(mut self, listener: L) -> Self
    where
        L: EventListener<RetryEvent> + 'static,
    {
        self.event_listeners.add(listener);
        self
    }

    /// Registers a callback invoked right before each attempt.
    ///
    /// # Callback Signature
    /// `Fn(usize, usize)` - the 1-based attempt number and the retries
    /// remaining (`max_retries - (attempt - 1)`).
    ///
    /// # Example
    /// ```rust
    /// use retry_executor::RetryExecutor;
    ///
    /// let executor = RetryExecutor::builder()
    ///     .max_retries(3)
    ///     .on_attempt(|attempt, remaining| {
    ///         println!("attempt {} ({} retries left)", attempt, remaining);
    ///     })
    ///     .build();
    /// ```
    pub fn on_attempt<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Attempt {
                attempt,
                retries_remaining,
                ..
            } = event
            {
                f(*attempt, *retries_remaining);
            }
        }));
        self
    }

    /// Registers a callback invoked whenever an attempt fails, including the
    /// final one.
    ///
    /// # Callback Signature
    /// `Fn(usize, usize, &str)` - the attempt number, the retries remaining
    /// and the failure message.
    pub fn on_attempt_failed<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::AttemptFailed {
                attempt,
                retries_remaining,
                message,
                ..
            } = event
            {
                f(*attempt, *retries_remaining, message);
            }
        }));
        self
    }

    /// Registers a callback invoked before the executor waits to retry.
    ///
    /// Never invoked after the final attempt or after a success.
    ///
    /// # Callback Signature
    /// `Fn(usize, Duration)` - the attempt that just failed and the delay
    /// before the next one.
    ///
    /// # Example
    /// ```rust
    /// use retry_executor::RetryExecutor;
    /// use std::time::Duration;
    ///
    /// let executor = RetryExecutor::builder()
    ///     .delay(Duration::from_millis(250))
    ///     .on_retry(|attempt, delay| {
    ///         println!("attempt {} failed, retrying in {:?}", attempt, delay);
    ///     })
    ///     .build();
    /// ```
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Retry { attempt, delay, .. } = event {
                f(*attempt, *delay);
            }
        }));
        self
    }

    /// Registers a callback invoked when the operation succeeds.
    ///
    /// # Callback Signature
    /// `Fn(usize)` - the total number of attempts made, 1 meaning success on
    /// the first try.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Success { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback invoked when the final permitted attempt fails.
    ///
    /// # Callback Signature
    /// `Fn(usize, &str)` - the total number of attempts and the message of the
    /// last failure.
    ///
    /// # Example
    /// ```rust
    /// use retry_executor::RetryExecutor;
    ///
    /// let executor = RetryExecutor::builder()
    ///     .max_retries(1)
    ///     .on_exhausted(|attempts, reason| {
    ///         eprintln!("gave up after {} attempts: {}", attempts, reason);
    ///     })
    ///     .build();
    /// ```
    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, &str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Exhausted {
                attempts, message, ..
            } = event
            {
                f(*attempts, message);
            }
        }));
        self
    }

    fn into_config(self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            delay: self.delay,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }

    /// Builds the executor.
    pub fn build(self) -> RetryExecutor {
        RetryExecutor::new(self.into_config())
    }

    /// Builds a tower layer running every request through the executor.
    pub fn layer(self) -> RetryLayer {
        RetryLayer::new(self.build())
    }
}
