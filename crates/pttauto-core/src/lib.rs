//! pttauto-core: Shared library for the pttauto BBS session client.
//!
//! This crate provides:
//! - Error taxonomy for transport and session operations
//! - Timing and protocol constants
//! - Retry policy configuration
//! - Terminal output normalization (escape-sequence stripping)
//! - The prompt-signature vocabulary and screen classification
//! - Logging setup

pub mod constants;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod retry;
pub mod signatures;

pub use error::{Error, Result};
pub use logging::{LogFormat, init_logging};
pub use retry::RetryPolicy;
