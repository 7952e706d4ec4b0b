//! Limits applied by the middleware stack in [`super::router`].

use std::time::Duration;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cap on request bodies. Save files are rarely above a few MiB.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Request limits enforced by tower layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Limits {
    pub fn new(request_timeout_secs: u64, max_body_bytes: usize) -> Self {
        Self {
            request_timeout: Duration::from_secs(request_timeout_secs),
            max_body_bytes,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            request_timeout: REQUEST_TIMEOUT,
            max_body_bytes: MAX_BODY_BYTES,
        }
    }
}
