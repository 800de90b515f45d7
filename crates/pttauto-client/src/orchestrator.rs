//! Top-level sequencing: connect, authenticate, optionally post,
//! then tear down.
//!
//! Every exit path ends with the link released. The logout keystroke
//! script only runs after a successful post; when posting is skipped
//! or fails, the remote's menu position is indeterminate and the
//! session disconnects directly.

use tracing::{error, info, warn};

use crate::connection::BbsSession;
use crate::login::{self, LoginOutcome};
use crate::notify::Notifier;
use crate::script;
use crate::transport::Dialer;

/// A requested article post.
#[derive(Debug, Clone)]
pub struct PostRequest {
    /// Target board name.
    pub board: String,
    /// Article title.
    pub title: String,
    /// Article body.
    pub body: String,
}

/// Run one full session: connect, authenticate, optionally post,
/// logout/disconnect. Each terminal outcome produces exactly one
/// notification.
pub async fn run<D: Dialer>(
    session: &mut BbsSession<D>,
    account: &str,
    secret: &str,
    post: Option<&PostRequest>,
    notifier: &dyn Notifier,
) {
    if !session.connect().await {
        error!("connection failed");
        notifier
            .notify(&format!("PTT connection failed (account: {account})"))
            .await;
        return;
    }

    match login::negotiate(session, account, secret, notifier).await {
        LoginOutcome::Authenticated => {}
        LoginOutcome::Rejected => {
            // The rejection path already tore the transport down.
            return;
        }
        LoginOutcome::NoPrompt => {
            warn!("no login field available, site may be down");
            notifier
                .notify(&format!(
                    "PTT login failed: no login prompt (account: {account})"
                ))
                .await;
            session.disconnect().await;
            return;
        }
        LoginOutcome::Ambiguous => {
            session.disconnect().await;
            return;
        }
    }

    match post {
        Some(request) => {
            if script::post(session, &request.board, &request.title, &request.body).await {
                info!(board = request.board.as_str(), "post succeeded");
                script::logout(session).await;
            } else {
                warn!("post failed, posting state indeterminate, disconnecting");
                session.disconnect().await;
            }
        }
        None => {
            // No post requested: nothing to back out of cleanly.
            session.disconnect().await;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
