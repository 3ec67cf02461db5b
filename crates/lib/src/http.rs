//! Shared HTTP plumbing for the external services augmentation depends on.

use std::time::Duration;

/// Per-call timeout for translation and encyclopedia requests.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn build_client(
    timeout: Duration,
    user_agent: Option<&str>,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder().timeout(timeout);
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua.to_string());
    }
    builder.build()
}

/// Rate limiting and server-side failures are worth retrying; other statuses are not.
pub(crate) fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Timeouts and connection problems are transient; body decoding and builder errors are not.
pub(crate) fn is_transient_request(err: &reqwest::Error) -> bool {
    if err.is_decode() || err.is_builder() {
        return false;
    }
    if let Some(status) = err.status() {
        return is_transient_status(status.as_u16());
    }
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_statuses() {
        assert!(is_transient_status(429));
        assert!(is_transient_status(503));
        assert!(!is_transient_status(400));
        assert!(!is_transient_status(404));
    }
}
