//! Tower adapter tests.
//!
//! Tests the `RetryLayer` including:
//! - The same request is replayed on every attempt
//! - Exhaustion surfaces a `RetryError` from the service
//! - Composition with `ServiceBuilder`
//! - Shared configuration across cloned services

use retry_executor::{RetryExecutor, RetryLayer};
use retry_executor_core::RecordingListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tower::{Layer, Service, ServiceBuilder, ServiceExt};

#[derive(Debug, Clone)]
struct TestError(String);

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TestError {}

#[tokio::test]
async fn request_replayed_on_every_attempt() {
    let received = Arc::new(std::sync::Mutex::new(Vec::new()));
    let rr = Arc::clone(&received);

    let service = tower::service_fn(move |req: String| {
        let rr = Arc::clone(&rr);
        async move {
            let mut seen = rr.lock().unwrap();
            seen.push(req.clone());
            if seen.len() < 3 {
                Err(TestError(format!("Could not fetch {}", req)))
            } else {
                Ok(format!("Response from {}", req))
            }
        }
    });

    let layer = RetryLayer::builder()
        .max_retries(3)
        .delay(Duration::from_millis(5))
        .layer();
    let mut service = layer.layer(service);

    let response = service
        .ready()
        .await
        .unwrap()
        .call("Sample-Resource".to_string())
        .await
        .unwrap();

    assert_eq!(response, "Response from Sample-Resource");
    let seen = received.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|r| r == "Sample-Resource"));
}

#[tokio::test]
async fn exhausted_request_returns_retry_error() {
    let call_count = Arc::new(AtomicUsize::new(0));
    let cc = Arc::clone(&call_count);

    let service = tower::service_fn(move |req: u64| {
        let cc = Arc::clone(&cc);
        async move {
            cc.fetch_add(1, Ordering::SeqCst);
            Err::<u64, _>(TestError(format!("resource {} unavailable", req)))
        }
    });

    let mut service = ServiceBuilder::new()
        .layer(
            RetryLayer::builder()
                .max_retries(2)
                .delay(Duration::from_millis(5))
                .layer(),
        )
        .service(service);

    let err = service.ready().await.unwrap().call(7).await.unwrap_err();

    assert_eq!(call_count.load(Ordering::SeqCst), 3);
    assert_eq!(err.attempts(), 3);
    assert_eq!(err.last_error().0, "resource 7 unavailable");
    assert_eq!(
        err.to_string(),
        "Failed to fetch data after 2 retries. Reason: resource 7 unavailable"
    );
}

#[tokio::test]
async fn error_converts_into_box_error() {
    let service =
        tower::service_fn(|_req: ()| async { Err::<(), _>(TestError("down".to_string())) });

    let mut service = RetryLayer::builder().max_retries(0).layer().layer(service);

    let err = service.ready().await.unwrap().call(()).await.unwrap_err();
    let boxed: tower::BoxError = err.into();

    assert_eq!(
        boxed.to_string(),
        "Failed to fetch data after 0 retries. Reason: down"
    );
    assert_eq!(boxed.source().map(|s| s.to_string()).as_deref(), Some("down"));
}

#[tokio::test]
async fn cloned_services_share_listeners() {
    let recorder = RecordingListener::new();
    let executor = RetryExecutor::builder()
        .name("shared")
        .max_retries(1)
        .delay(Duration::from_millis(5))
        .listener(recorder.clone())
        .build();

    let service = tower::service_fn(|_req: ()| async { Ok::<_, TestError>("ok") });
    let mut first = RetryLayer::new(executor).layer(service);
    let mut second = first.clone();

    first.ready().await.unwrap().call(()).await.unwrap();
    second.ready().await.unwrap().call(()).await.unwrap();

    assert_eq!(
        recorder.event_types(),
        vec!["Attempt", "Success", "Attempt", "Success"]
    );
}
