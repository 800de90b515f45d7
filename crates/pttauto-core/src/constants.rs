//! Protocol and timing constants for pttauto.
//!
//! The remote is a menu-driven Big5 text UI with no framing; most of
//! these values are settle delays that give it time to redraw before
//! the next read is meaningful.

use std::time::Duration;

// =============================================================================
// Remote Interface Constants
// =============================================================================

/// Default BBS host.
pub const DEFAULT_HOST: &str = "ptt.cc";

/// SSH port on the BBS front-end.
pub const SSH_PORT: u16 = 22;

/// SSH user accepted by the BBS front-end without credentials.
pub const SSH_USER: &str = "bbs";

/// Terminal type negotiated at connect time, fixed for the session.
pub const TERM_TYPE: &str = "vt100";

/// Terminal columns.
pub const TERM_COLS: u32 = 80;

/// Terminal rows.
pub const TERM_ROWS: u32 = 24;

/// Locale advertised to the remote (Big5 is the wire encoding).
pub const REMOTE_LOCALE: &str = "zh_TW.Big5";

/// Maximum bytes consumed per read.
pub const READ_CHUNK_SIZE: usize = 4096;

// =============================================================================
// Timing Constants
// =============================================================================

/// Overall budget for one host connection attempt (TCP + SSH + shell).
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// SSH keepalive interval.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Default read timeout; an empty result here is routine, not a fault.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(3);

/// Extended read timeout for the initial welcome screen.
pub const WELCOME_READ_TIMEOUT: Duration = Duration::from_secs(8);

/// Extended read timeout after submitting credentials.
pub const LOGIN_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Once the first bytes of a read arrive, keep draining for this long.
pub const READ_DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Bounded flush window for a single write.
pub const WRITE_FLUSH_TIMEOUT: Duration = Duration::from_secs(3);

/// Bounded wait for channel/connection teardown.
pub const CLOSE_WAIT_TIMEOUT: Duration = Duration::from_secs(3);

/// Settle after the transport opens, before reading the welcome screen.
pub const CONNECT_SETTLE: Duration = Duration::from_secs(3);

/// Gap between the account and password writes, so the remote does not
/// fold them into one line.
pub const CREDENTIAL_GAP: Duration = Duration::from_secs(1);

/// Settle after the password write, before the post-login read.
pub const PASSWORD_SETTLE: Duration = Duration::from_secs(3);

// =============================================================================
// Retry Defaults
// =============================================================================

/// Default full passes over the candidate host list.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay between full host-list passes.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

// =============================================================================
// Notifier Constants
// =============================================================================

/// Telegram Bot API base URL.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Timeout for one notification delivery.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_constants_are_ordered() {
        assert!(DEFAULT_READ_TIMEOUT < WELCOME_READ_TIMEOUT);
        assert!(READ_DRAIN_GRACE < DEFAULT_READ_TIMEOUT);
        assert!(CONNECT_SETTLE < CONNECT_TIMEOUT);
    }

    #[test]
    fn terminal_geometry_is_bbs_standard() {
        assert_eq!((TERM_COLS, TERM_ROWS), (80, 24));
        assert_eq!(TERM_TYPE, "vt100");
    }
}
