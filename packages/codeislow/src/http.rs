//! HTTP client wrapper for the Legifrance API.

use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};

use crate::error::{CodeislowError, Result};

/// User agent string identifying this client.
const USER_AGENT: &str = concat!("codeislow/", env!("CARGO_PKG_VERSION"));

/// Maximum number of attempts for transient failures.
pub const MAX_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
pub const RETRY_BASE_DELAY_MS: u64 = 500;

/// Retry settings for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Delay before the given attempt (0-based): 0, base, 2*base, 4*base...
    #[must_use]
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.base_delay
            .saturating_mul(1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX))
    }
}

/// Create a configured HTTP client.
///
/// # Arguments
/// * `timeout_secs` - Per-request timeout in seconds
///
/// # Returns
/// A blocking client carrying the crate user agent
pub fn create_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Send a request, retrying connection errors, timeouts and 5xx answers.
///
/// `build` is called once per attempt since a blocking request cannot be
/// replayed. Any non-5xx response is handed back to the caller, which
/// decides what a 4xx means for its endpoint.
///
/// # Arguments
/// * `policy` - Attempt count and backoff base
/// * `build` - Builds a fresh request for each attempt
///
/// # Returns
/// The first response that is not a 5xx, or `RetriesExhausted`
pub fn send_with_retry<F>(policy: &RetryPolicy, build: F) -> Result<Response>
where
    F: Fn() -> RequestBuilder,
{
    let mut last_error: Option<String> = None;

    for attempt in 0..policy.max_attempts {
        if attempt > 0 {
            let delay = policy.delay_before(attempt);
            tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying after delay");
            thread::sleep(delay);
        }

        match build().send() {
            Ok(response) => {
                let status = response.status();
                if status.is_server_error() {
                    tracing::warn!(
                        status = %status,
                        attempt = attempt + 1,
                        max_attempts = policy.max_attempts,
                        "Server error, will retry"
                    );
                    last_error = Some(format!("Server error: {status}"));
                    continue;
                }
                return Ok(response);
            }
            Err(e) => {
                if e.is_connect() || e.is_timeout() {
                    tracing::warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max_attempts = policy.max_attempts,
                        "Connection error, will retry"
                    );
                    last_error = Some(e.to_string());
                    continue;
                }
                return Err(CodeislowError::Http(e));
            }
        }
    }

    Err(CodeislowError::RetriesExhausted {
        attempts: policy.max_attempts,
        message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

/// Turn a 4xx response into `LookupFailed`, passing successes through.
pub fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .unwrap_or_default()
        .chars()
        .take(200)
        .collect::<String>();
    Err(CodeislowError::LookupFailed {
        status: status.as_u16(),
        message,
    })
}
