//! Shared HTTP plumbing for provider clients: client construction and retry

use reqwest::header::HeaderMap;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{Error, Result};

/// Build a pooled HTTP client with a request timeout
pub fn build_client(timeout_secs: u64, headers: HeaderMap) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .pool_max_idle_per_host(5)
        .default_headers(headers)
        .build()
        .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))
}

/// Retry a request with exponential backoff (1s, 2s, 4s, ...)
///
/// This is the provider's own policy; the pipeline itself never retries.
pub async fn retry_request<F, Fut, T>(max_retries: u32, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 0..=max_retries {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if attempt < max_retries {
                    let delay = Duration::from_secs(2u64.pow(attempt));
                    tracing::warn!(
                        "Request failed (attempt {}/{}): {}, retrying in {:?}",
                        attempt + 1,
                        max_retries + 1,
                        e,
                        delay
                    );
                    sleep(delay).await;
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| Error::internal("retry loop ran zero attempts")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_no_retry_returns_first_error() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_request(0, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::generation("down")) }
        })
        .await;

        assert!(matches!(result, Err(Error::Generation(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let calls = AtomicU32::new(0);
        let result = retry_request(2, || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(Error::embedding("flaky"))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
