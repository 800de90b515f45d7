//! Error types for pttauto-core.

use thiserror::Error;

/// Main error type for pttauto operations.
///
/// Transport-layer errors are converted to booleans at the connection
/// manager boundary; nothing above it is expected to match on these
/// variants except for logging.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from underlying system calls.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation timed out.
    #[error("operation timed out")]
    Timeout,

    /// Transport layer error (SSH connect, channel, write).
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Connection was closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// SSH-level authentication failed (the `bbs` front-end user, not
    /// the BBS account itself).
    #[error("ssh authentication failed: {message}")]
    Auth { message: String },
}

impl Error {
    /// Returns true if this error is transient and reconnection may help.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. } | Error::ConnectionClosed | Error::Timeout | Error::Io(_)
        )
    }

    /// Returns true if this error is fatal and reconnection won't help.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Auth { .. })
    }
}

/// Convenience result type for pttauto operations.
pub type Result<T> = std::result::Result<T, Error>;
