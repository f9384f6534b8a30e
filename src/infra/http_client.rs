//! HTTP client factory with consistent timeout configuration.
//!
//! Outbound calls (Resend, the verification API) go through clients built
//! here rather than `reqwest::Client::new()`, so that no request can hang a
//! handler indefinitely.

use reqwest::Client;
use std::time::Duration;

/// Default connect timeout (TCP handshake + TLS).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default request timeout (total request/response time).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build an HTTP client with default timeouts.
pub fn build_client() -> Result<Client, reqwest::Error> {
    build_client_with_timeout(DEFAULT_REQUEST_TIMEOUT)
}

/// Build an HTTP client whose whole request/response cycle is bounded by
/// `timeout`. The connect timeout never exceeds it.
pub fn build_client_with_timeout(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(timeout))
        .timeout(timeout)
        .build()
}
