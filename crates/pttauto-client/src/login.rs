//! The login negotiation state machine.
//!
//! Operates on the latest normalized screen buffer: submit
//! credentials at the login prompt, then walk the obstacle table in
//! its fixed priority order until the main menu (or a terminal
//! failure) is reached. Each corrective row fires at most once; a
//! screen that persists after its correction resolves to `Ambiguous`.

use tokio::time::sleep;
use tracing::{debug, info, warn};

use pttauto_core::constants::{
    CREDENTIAL_GAP, LOGIN_READ_TIMEOUT, PASSWORD_SETTLE,
};
use pttauto_core::signatures::{self, Obstacle};

use crate::connection::BbsSession;
use crate::notify::Notifier;
use crate::transport::Dialer;

/// Terminal result of one login negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The main menu was reached.
    Authenticated,
    /// Bad credentials; the connection has been torn down.
    Rejected,
    /// No login prompt in the welcome screen; remote busy or broken.
    NoPrompt,
    /// No recognized end-state signature after all corrections.
    Ambiguous,
}

impl LoginOutcome {
    /// Whether this outcome represents a usable authenticated session.
    pub fn is_success(self) -> bool {
        matches!(self, LoginOutcome::Authenticated)
    }
}

/// Run the login negotiation against the current welcome screen.
///
/// Emits exactly one notification for each terminal outcome it owns
/// (`Authenticated`, `Rejected`, `Ambiguous`); `NoPrompt` is reported
/// by the orchestrator, which also decides whether to retry.
pub async fn negotiate<D: Dialer>(
    session: &mut BbsSession<D>,
    account: &str,
    secret: &str,
    notifier: &dyn Notifier,
) -> LoginOutcome {
    if !signatures::has_login_prompt(session.screen()) {
        warn!("no login prompt in welcome screen, remote busy or broken");
        return LoginOutcome::NoPrompt;
    }

    debug!("login prompt detected, entering account");
    if !session.write_guarded(&format!("{account}\r\n"), true).await {
        return ambiguous(account, notifier).await;
    }
    // Separate writes, or the remote folds account and password into
    // one input line.
    sleep(CREDENTIAL_GAP).await;

    debug!("entering password");
    if !session.write_guarded(&format!("{secret}\r\n"), true).await {
        return ambiguous(account, notifier).await;
    }
    sleep(PASSWORD_SETTLE).await;
    session.read_screen(LOGIN_READ_TIMEOUT).await;

    match resolve_obstacles(session).await {
        LoginOutcome::Authenticated => {
            info!(account, "login successful");
            notifier
                .notify(&format!("PTT login succeeded (account: {account})"))
                .await;
            LoginOutcome::Authenticated
        }
        LoginOutcome::Rejected => {
            notifier
                .notify(&format!(
                    "PTT login failed: wrong password or no such account (account: {account})"
                ))
                .await;
            LoginOutcome::Rejected
        }
        LoginOutcome::Ambiguous => ambiguous(account, notifier).await,
        LoginOutcome::NoPrompt => LoginOutcome::NoPrompt,
    }
}

async fn ambiguous(account: &str, notifier: &dyn Notifier) -> LoginOutcome {
    warn!(account, "login state unclear");
    notifier
        .notify(&format!("PTT login state unclear (account: {account})"))
        .await;
    LoginOutcome::Ambiguous
}

/// Walk the obstacle table until no known blocking screen remains,
/// then classify the end state.
async fn resolve_obstacles<D: Dialer>(session: &mut BbsSession<D>) -> LoginOutcome {
    let mut applied: Vec<Obstacle> = Vec::new();

    loop {
        let Some(obstacle) = signatures::classify_obstacle(session.screen()) else {
            break;
        };

        if obstacle == Obstacle::BadCredentials {
            warn!("rejected: wrong password or unknown account");
            // Terminal: tear down immediately, no further writes.
            session.disconnect().await;
            return LoginOutcome::Rejected;
        }

        if applied.contains(&obstacle) {
            warn!(?obstacle, "blocking screen persisted after its correction");
            return LoginOutcome::Ambiguous;
        }
        applied.push(obstacle);

        let Some(correction) = obstacle.correction() else {
            // Only the terminal state lacks a correction, and that was
            // handled above.
            break;
        };

        info!(?obstacle, keys = ?correction.keys, "applying corrective keystroke");
        if !session.write_guarded(correction.keys, true).await {
            return LoginOutcome::Ambiguous;
        }
        sleep(correction.settle).await;
        let timeout = session.read_timeout();
        session.read_screen(timeout).await;
    }

    if signatures::is_main_menu(session.screen()) {
        LoginOutcome::Authenticated
    } else {
        warn!("no recognized end-state signature in final screen");
        LoginOutcome::Ambiguous
    }
}

// =============================================================================
// Tests
// =============================================================================
