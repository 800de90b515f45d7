//! SSH transport adapter.
//!
//! Opens the byte-stream connection to one candidate host and exposes
//! read-with-timeout / write-with-timeout over it. Big5 is negotiated
//! here: reads are decoded and writes encoded at this layer, so
//! everything above works in `&str`.
//!
//! The adapter is a trait pair so the connection manager and state
//! machine can be driven by a scripted transport in tests.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use encoding_rs::BIG5;
use russh::client;
use russh::{ChannelMsg, Disconnect};
use tokio::time::{Duration, timeout};
use tracing::{debug, trace, warn};

use pttauto_core::constants::{
    CLOSE_WAIT_TIMEOUT, KEEPALIVE_INTERVAL, READ_DRAIN_GRACE, REMOTE_LOCALE, SSH_PORT, SSH_USER,
    TERM_COLS, TERM_ROWS, TERM_TYPE,
};
use pttauto_core::error::{Error, Result};

/// Opens a transport link to one candidate host.
#[async_trait]
pub trait Dialer: Send + Sync {
    type Link: Link;

    /// Attempt to open a link within `overall_timeout`.
    async fn dial(&self, host: &str, overall_timeout: Duration) -> Result<Self::Link>;
}

/// One open byte-stream connection, exclusively owned by the
/// connection manager.
#[async_trait]
pub trait Link: Send {
    /// Read up to `max_bytes` of decoded text. An empty string on
    /// timeout is routine for a busy remote UI, not a fault.
    async fn read_chunk(&mut self, max_bytes: usize, timeout: Duration) -> String;

    /// Write text with a bounded flush window.
    async fn write_all(&mut self, text: &str, timeout: Duration) -> Result<()>;

    /// Local-only health assertion; performs no I/O.
    fn is_healthy(&self) -> bool;

    /// Idempotent best-effort teardown. Never raises.
    async fn close(&mut self);
}

/// SSH client handler.
struct BbsHandler;

#[async_trait]
impl client::Handler for BbsHandler {
    type Error = russh::Error;

    // The BBS front-end is a public anonymous-login service; the
    // original client disabled known-hosts checking as well.
    async fn check_server_key(
        &mut self,
        _server_public_key: &russh_keys::key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        debug!("accepting server host key");
        Ok(true)
    }
}

/// Dials the real BBS over SSH.
#[derive(Debug, Default)]
pub struct SshDialer;

#[async_trait]
impl Dialer for SshDialer {
    type Link = SshLink;

    async fn dial(&self, host: &str, overall_timeout: Duration) -> Result<SshLink> {
        SshLink::open(host, overall_timeout).await
    }
}

/// An open SSH session with an interactive vt100 shell on the remote.
pub struct SshLink {
    handle: client::Handle<BbsHandler>,
    channel: russh::Channel<client::Msg>,
    /// Remote shell exited or sent EOF; observed during reads.
    remote_exited: bool,
    closed: bool,
}

impl SshLink {
    async fn open(host: &str, overall_timeout: Duration) -> Result<Self> {
        let config = client::Config {
            inactivity_timeout: None,
            keepalive_interval: Some(KEEPALIVE_INTERVAL),
            keepalive_max: 3,
            ..Default::default()
        };
        let config = Arc::new(config);

        let deadline = Instant::now() + overall_timeout;

        let mut handle = timeout(
            overall_timeout,
            client::connect(config, (host, SSH_PORT), BbsHandler),
        )
        .await
        .map_err(|_| Error::Timeout)?
        .map_err(|e| Error::Transport {
            message: format!("ssh connect to {host} failed: {e}"),
        })?;

        debug!(host, "ssh connection established");

        // The front-end accepts the bbs user without credentials; some
        // deployments want the (empty) password exchange instead.
        let mut authenticated = match handle.authenticate_none(SSH_USER).await {
            Ok(ok) => ok,
            Err(e) => {
                debug!(error = %e, "none auth not accepted");
                false
            }
        };
        if !authenticated {
            authenticated = handle
                .authenticate_password(SSH_USER, "")
                .await
                .map_err(|e| Error::Transport {
                    message: format!("ssh auth exchange failed: {e}"),
                })?;
        }
        if !authenticated {
            return Err(Error::Auth {
                message: format!("server refused user {SSH_USER}"),
            });
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        let channel = timeout(remaining, handle.channel_open_session())
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(|e| Error::Transport {
                message: format!("failed to open channel: {e}"),
            })?;

        channel
            .request_pty(false, TERM_TYPE, TERM_COLS, TERM_ROWS, 0, 0, &[])
            .await
            .map_err(|e| Error::Transport {
                message: format!("pty request failed: {e}"),
            })?;

        // Best-effort: many sshd configs reject env requests.
        for (name, value) in [
            ("LANG", REMOTE_LOCALE),
            ("LC_ALL", REMOTE_LOCALE),
            ("TERM", TERM_TYPE),
        ] {
            if let Err(e) = channel.set_env(false, name, value).await {
                debug!(name, error = %e, "env request rejected");
            }
        }

        channel
            .request_shell(false)
            .await
            .map_err(|e| Error::Transport {
                message: format!("shell request failed: {e}"),
            })?;

        debug!(host, "interactive shell started");

        Ok(Self {
            handle,
            channel,
            remote_exited: false,
            closed: false,
        })
    }
}

#[async_trait]
impl Link for SshLink {
    async fn read_chunk(&mut self, max_bytes: usize, window: Duration) -> String {
        if self.closed || self.remote_exited {
            return String::new();
        }

        let mut raw: Vec<u8> = Vec::new();
        let deadline = Instant::now() + window;

        loop {
            if raw.len() >= max_bytes {
                break;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            // Once data has arrived, only wait out a short quiet gap.
            let wait = if raw.is_empty() {
                remaining
            } else {
                remaining.min(READ_DRAIN_GRACE)
            };

            match timeout(wait, self.channel.wait()).await {
                Ok(Some(ChannelMsg::Data { data })) => raw.extend_from_slice(&data),
                Ok(Some(ChannelMsg::ExtendedData { data, .. })) => raw.extend_from_slice(&data),
                Ok(Some(ChannelMsg::ExitStatus { exit_status })) => {
                    debug!(exit_status, "remote process exited");
                    self.remote_exited = true;
                }
                Ok(Some(ChannelMsg::Eof)) | Ok(Some(ChannelMsg::Close)) | Ok(None) => {
                    self.remote_exited = true;
                    break;
                }
                Ok(Some(_)) => {}
                Err(_) => break,
            }
        }

        if raw.is_empty() {
            return String::new();
        }
        let (text, _, had_errors) = BIG5.decode(&raw);
        if had_errors {
            trace!(bytes = raw.len(), "replaced undecodable big5 sequences");
        }
        text.into_owned()
    }

    async fn write_all(&mut self, text: &str, flush_timeout: Duration) -> Result<()> {
        if self.closed {
            return Err(Error::ConnectionClosed);
        }
        let (bytes, _, _) = BIG5.encode(text);
        match timeout(flush_timeout, self.channel.data(&bytes[..])).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(Error::Transport {
                message: format!("write failed: {e}"),
            }),
            Err(_) => Err(Error::Timeout),
        }
    }

    fn is_healthy(&self) -> bool {
        !self.closed && !self.remote_exited && !self.handle.is_closed()
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        match timeout(CLOSE_WAIT_TIMEOUT, self.channel.eof()).await {
            Ok(Err(e)) => debug!(error = %e, "channel eof failed"),
            Err(_) => warn!("channel eof timed out, forcing teardown"),
            Ok(Ok(())) => {}
        }

        match timeout(
            CLOSE_WAIT_TIMEOUT,
            self.handle.disconnect(Disconnect::ByApplication, "", ""),
        )
        .await
        {
            Ok(Err(e)) => debug!(error = %e, "ssh disconnect failed"),
            Err(_) => warn!("ssh disconnect timed out, forcing teardown"),
            Ok(Ok(())) => {}
        }

        debug!("ssh connection closed");
    }
}
