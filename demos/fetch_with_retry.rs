//! Fetching from a flaky mock endpoint through the retry executor.
//!
//! Run with: cargo run --example fetch_with_retry --features tracing

use retry_executor::RetryExecutor;
use std::time::Duration;

/// Failure reported by the mock endpoint.
#[derive(Debug, Clone)]
struct FetchError {
    url: String,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Could not fetch {}", self.url)
    }
}

impl std::error::Error for FetchError {}

/// Simulates an unstable network call: 300ms of latency, then roughly a 60%
/// chance of success.
async fn mock_fetch(url: String) -> Result<String, FetchError> {
    println!("  Fetching: {}", url);
    tokio::time::sleep(Duration::from_millis(300)).await;

    if rand::random::<f64>() > 0.4 {
        println!("  Request succeeded");
        Ok(format!("Response from {}", url))
    } else {
        println!("  Request failed (simulated)");
        Err(FetchError { url })
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .init();

    println!("Fetch With Retry Example");
    println!("========================\n");

    let executor = RetryExecutor::builder()
        .name("mock-fetch")
        .max_retries(3)
        .delay(Duration::from_secs(1))
        .on_attempt_failed(|attempt, remaining, _| {
            println!(
                "  Attempt {} failed. Remaining retries: {}",
                attempt, remaining
            );
        })
        .on_retry(|_, delay| {
            println!("  Retrying in {:?}...", delay);
        })
        .build();

    let url = "Sample-Resource";
    match executor.execute(|| mock_fetch(url.to_string())).await {
        Ok(data) => println!("\nFinal Result: {}", data),
        Err(err) => println!("\nFinal Error: {}", err),
    }
}
