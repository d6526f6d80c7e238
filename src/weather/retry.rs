//! HTTP retry with exponential backoff for the weather archive.
//!
//! Rate limiting (429), gateway/server errors (500, 502, 503, 504) and
//! timeout/connect failures are retried; any other status fails at once.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::warn;

use crate::error::FetchError;

/// Sends the request built by `build_request`, retrying up to `max_retries`
/// times after the first attempt. The n-th retry waits `backoff * 2^n`.
pub async fn send_with_retry<F>(
    client: &Client,
    build_request: F,
    max_retries: u32,
    backoff: Duration,
    context: &str,
) -> Result<Response, FetchError>
where
    F: Fn(&Client) -> RequestBuilder,
{
    let mut attempt = 0;

    loop {
        let failure = match build_request(client).send().await {
            Ok(resp) if resp.status().is_success() => return Ok(resp),
            Ok(resp) => {
                let status = resp.status();
                if !is_retriable(status) {
                    warn!("{}: non-retriable status ({})", context, status);
                    return Err(FetchError::Status(status.as_u16()));
                }
                FetchError::Status(status.as_u16())
            }
            Err(e) if e.is_timeout() || e.is_connect() => FetchError::Transport(e.to_string()),
            Err(e) => {
                warn!("{}: request failed: {}", context, e);
                return Err(FetchError::Transport(e.to_string()));
            }
        };

        if attempt >= max_retries {
            warn!("{}: giving up after {} attempts: {}", context, attempt + 1, failure);
            return Err(failure);
        }

        let delay = backoff_delay(backoff, attempt);
        warn!("{}: {}, retrying in {:?}", context, failure, delay);
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

fn is_retriable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32 << attempt.min(16))
}
