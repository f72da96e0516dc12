use anyhow::{Error, anyhow};
use reqwest::Response;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retries an HTTP request on transport errors and 5xx responses.
///
/// # Parameters
/// - `operation`: Closure returning the request future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// The first response that is neither a transport error nor a server error,
/// or the last error once the attempts are used up. Client errors (4xx) are
/// returned as responses without retrying.
pub async fn with_retry<F, Fut>(mut operation: F, retries: usize, delay_ms: u64) -> Result<Response, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        let err = match operation().await {
            Ok(response) if !response.status().is_server_error() => return Ok(response),
            Ok(response) => anyhow!("HTTP error: {}", response.status()),
            Err(e) => Error::from(e),
        };
        if attempt > retries {
            return Err(err);
        }
        debug!(
            "Attempt {}/{} failed: {}. Retrying...",
            attempt, retries, err
        );
        attempt += 1;
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
