//! Retry policy shared by the connection manager and read/write
//! primitives.

use std::time::Duration;

use crate::constants::{
    CONNECT_TIMEOUT, DEFAULT_MAX_RETRIES, DEFAULT_READ_TIMEOUT, DEFAULT_RETRY_DELAY,
};

/// Immutable retry configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Full passes over the candidate host list before giving up.
    pub max_attempts: u32,
    /// Delay between full passes (not applied after the final pass).
    pub retry_delay: Duration,
    /// Overall budget for one host connection attempt.
    pub connect_timeout: Duration,
    /// Default per-operation read timeout.
    pub read_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            connect_timeout: CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of host-list passes.
    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max;
        self
    }

    /// Set the delay between passes.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the per-host connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}
