//! Keystroke scripts for posting and logout.
//!
//! Each script is a fixed sequence of write + settle-delay steps over
//! the guarded write primitive. A post aborts at the first failing
//! step with no rollback; logout is best-effort and always ends in a
//! disconnect.

use tokio::time::{Duration, sleep};
use tracing::{info, warn};

use crate::connection::BbsSession;
use crate::transport::Dialer;

/// Settle after selecting the target board.
const BOARD_ENTRY_SETTLE: Duration = Duration::from_secs(1);
/// Settle after leaving the article listing.
const LISTING_EXIT_SETTLE: Duration = Duration::from_secs(2);
/// Settle after submitting the title.
const TITLE_SETTLE: Duration = Duration::from_secs(1);
/// Settle after the body and save control byte.
const BODY_SETTLE: Duration = Duration::from_secs(1);
/// Settle after the logout keystrokes.
const LOGOUT_SETTLE: Duration = Duration::from_secs(1);

/// Ctrl-P: open the article composer.
const COMPOSER_KEY: &str = "\x10";
/// Ctrl-X: leave the editor and prompt for save.
const SAVE_KEY: &str = "\x18";
/// Back out to the top menu (`q` repeated), then (G)oodbye with
/// confirmation.
const LOGOUT_KEYS: &str = "qqqqqqqqqg\r\ny\r\n";

fn abort(step: &str) -> bool {
    warn!(step, "post aborted at failing step");
    false
}

/// Post an article to the given board.
///
/// Strict ordered script; returns false at the first failing step.
/// The remote's posting state after a partial script is indeterminate
/// by design, which is why the orchestrator skips the logout
/// keystrokes on failure.
pub async fn post<D: Dialer>(
    session: &mut BbsSession<D>,
    board: &str,
    title: &str,
    body: &str,
) -> bool {
    info!(board, "posting article");

    if !session.write_guarded("s", true).await {
        return abort("open board search");
    }
    if !session.write_guarded(&format!("{board}\r\n"), true).await {
        return abort("select board");
    }
    sleep(BOARD_ENTRY_SETTLE).await;

    if !session.write_guarded("q", true).await {
        return abort("leave article listing");
    }
    sleep(LISTING_EXIT_SETTLE).await;

    if !session.write_guarded(COMPOSER_KEY, true).await {
        return abort("open composer");
    }
    if !session.write_guarded("1\r\n", true).await {
        return abort("pick category");
    }
    if !session.write_guarded(&format!("{title}\r\n"), true).await {
        return abort("enter title");
    }
    sleep(TITLE_SETTLE).await;

    if !session.write_guarded(&format!("{body}{SAVE_KEY}"), true).await {
        return abort("enter body");
    }
    sleep(BODY_SETTLE).await;

    if !session.write_guarded("s\r\n", true).await {
        return abort("save article");
    }
    if !session.write_guarded("0\r\n", true).await {
        return abort("skip signature file");
    }

    info!(board, "article posted");
    true
}

/// Back out of the menus and quit, then disconnect unconditionally.
///
/// The keystrokes are best-effort: a failed write still ends in a
/// disconnect.
pub async fn logout<D: Dialer>(session: &mut BbsSession<D>) {
    info!("logging out");
    if session.write_guarded(LOGOUT_KEYS, true).await {
        sleep(LOGOUT_SETTLE).await;
    }
    session.disconnect().await;
    info!("logout complete");
}

// =============================================================================
// Tests
// =============================================================================
