//! Response handling shared by the resolver client and the channels.

use soawatch_core::{Result, WatchError};
use tracing::warn;

/// Convert a transport error, recognising timeouts
pub(crate) fn map_send_error(err: &reqwest::Error, timeout_ms: u64) -> WatchError {
    if err.is_timeout() {
        WatchError::Timeout(timeout_ms)
    } else {
        WatchError::Http(err.to_string())
    }
}

/// Pass through success responses; turn anything else into `WatchError::Status`
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("unknown status").to_string()
    } else {
        body
    };

    if status.as_u16() == 429 {
        warn!("rate limited by remote endpoint");
    }

    Err(WatchError::Status {
        code: status.as_u16(),
        message,
    })
}
