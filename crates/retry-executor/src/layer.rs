use crate::{RetryError, RetryExecutor};
use futures::future::BoxFuture;
use std::fmt;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceExt};

/// A Tower [`Layer`] that runs every request through a [`RetryExecutor`].
///
/// # Examples
///
/// ```
/// use retry_executor::RetryLayer;
/// use tower::ServiceBuilder;
/// use std::time::Duration;
///
/// # async fn example() {
/// let retry_layer = RetryLayer::builder()
///     .max_retries(3)
///     .delay(Duration::from_millis(100))
///     .layer();
///
/// let _service = ServiceBuilder::new()
///     .layer(retry_layer)
///     .service(tower::service_fn(|url: String| async move {
///         Ok::<_, std::io::Error>(format!("Response from {}", url))
///     }));
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct RetryLayer {
    executor: RetryExecutor,
}

impl RetryLayer {
    /// Creates a layer sharing the given executor's configuration.
    pub fn new(executor: RetryExecutor) -> Self {
        Self { executor }
    }

    /// Creates a new builder for configuring a retry layer.
    pub fn builder() -> crate::RetryConfigBuilder {
        crate::RetryConfigBuilder::new()
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = Retry<S>;

    fn layer(&self, service: S) -> Self::Service {
        Retry {
            inner: service,
            executor: self.executor.clone(),
        }
    }
}

/// A Tower [`Service`] that retries failed requests.
///
/// Each attempt calls a fresh clone of the inner service with a clone of the
/// request, waiting for readiness first.
#[derive(Clone)]
pub struct Retry<S> {
    inner: S,
    executor: RetryExecutor,
}

impl<S> Retry<S> {
    /// Creates a new `Retry` service wrapping the given service.
    pub fn new(inner: S, executor: RetryExecutor) -> Self {
        Self { inner, executor }
    }

    /// Returns a reference to the wrapped service.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S: fmt::Debug> fmt::Debug for Retry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("inner", &self.inner)
            .field("executor", &self.executor)
            .finish()
    }
}

impl<S, Req> Service<Req> for Retry<S>
where
    S: Service<Req> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    S::Error: fmt::Display + Send + 'static,
    Req: Clone + Send + 'static,
{
    type Response = S::Response;
    type Error = RetryError<S::Error>;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Readiness is awaited per attempt on the clone that serves it.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let service = self.inner.clone();
        let executor = self.executor.clone();

        Box::pin(async move {
            executor
                .execute(move || service.clone().oneshot(req.clone()))
                .await
        })
    }
}
