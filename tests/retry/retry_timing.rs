//! Delay scheduling tests.
//!
//! All tests run on a paused tokio clock, so sleeps complete instantly while
//! the virtual elapsed time stays exact enough to assert on.

use retry_executor::RetryExecutor;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Returns an operation that fails `failures` times and records the virtual
/// time of every invocation.
fn recorded_operation(
    failures: usize,
    calls: Arc<Mutex<Vec<Instant>>>,
) -> impl FnMut() -> futures::future::Ready<Result<&'static str, String>> {
    move || {
        let mut calls = calls.lock().unwrap();
        calls.push(Instant::now());
        futures::future::ready(if calls.len() > failures {
            Ok("ok")
        } else {
            Err(format!("failure {}", calls.len()))
        })
    }
}

fn assert_close(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(50),
        "expected ~{:?}, got {:?}",
        expected,
        actual
    );
}

#[tokio::test(start_paused = true)]
async fn two_failures_then_success_waits_two_delays() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let executor = RetryExecutor::builder().max_retries(2).build();

    let start = Instant::now();
    let result = executor
        .execute(recorded_operation(2, Arc::clone(&calls)))
        .await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(calls.lock().unwrap().len(), 3);
    assert_close(start.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn delay_is_constant_between_attempts() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let executor = RetryExecutor::builder()
        .max_retries(4)
        .delay(Duration::from_millis(250))
        .build();

    let _ = executor
        .execute(recorded_operation(usize::MAX, Arc::clone(&calls)))
        .await;

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 5);
    for pair in calls.windows(2) {
        assert_close(pair[1] - pair[0], Duration::from_millis(250));
    }
}

#[tokio::test(start_paused = true)]
async fn no_delay_after_final_failure() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let executor = RetryExecutor::builder().max_retries(1).build();

    let start = Instant::now();
    let _ = executor
        .execute(recorded_operation(usize::MAX, Arc::clone(&calls)))
        .await;

    // One delay between the two attempts, none after the second.
    assert_eq!(calls.lock().unwrap().len(), 2);
    assert_close(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn zero_retries_fails_without_waiting() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let executor = RetryExecutor::builder().max_retries(0).build();

    let start = Instant::now();
    let result = executor
        .execute(recorded_operation(1, Arc::clone(&calls)))
        .await;

    assert!(result.is_err());
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn no_delay_after_success() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let executor = RetryExecutor::builder().max_retries(3).build();

    let start = Instant::now();
    let result = executor
        .execute(recorded_operation(0, Arc::clone(&calls)))
        .await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn attempt_latency_is_not_overlapped() {
    let in_flight = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let max_in_flight = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let executor = RetryExecutor::builder()
        .max_retries(3)
        .delay(Duration::from_millis(100))
        .build();

    let (current, peak) = (Arc::clone(&in_flight), Arc::clone(&max_in_flight));
    let start = Instant::now();
    let result = executor
        .execute(move || {
            let current = Arc::clone(&current);
            let peak = Arc::clone(&peak);
            async move {
                use std::sync::atomic::Ordering;
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(300)).await;
                current.fetch_sub(1, Ordering::SeqCst);
                Err::<(), _>("simulated failure")
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(max_in_flight.load(std::sync::atomic::Ordering::SeqCst), 1);
    // Four 300ms attempts plus three 100ms delays.
    assert_close(start.elapsed(), Duration::from_millis(1500));
}
