//! Connection lifecycle management.
//!
//! `BbsSession` owns the transport link exclusively and provides the
//! primitives everything else is built on:
//! 1. `connect` - candidate-host iteration with bounded retry and
//!    overload detection
//! 2. `health_check` - cheap local assertion before a write
//! 3. `write_guarded` - write with at most one reconnect-and-retry
//! 4. `read_screen` - read + normalize into the session buffer
//! 5. `disconnect` - idempotent teardown on every exit path

use tokio::time::{Duration, sleep};
use tracing::{debug, info, warn};

use pttauto_core::constants::{CONNECT_SETTLE, READ_CHUNK_SIZE, WELCOME_READ_TIMEOUT, WRITE_FLUSH_TIMEOUT};
use pttauto_core::normalize::normalize;
use pttauto_core::retry::RetryPolicy;
use pttauto_core::signatures;

use crate::transport::{Dialer, Link};

/// Session connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Not connected; no link is held.
    Disconnected,
    /// A dial attempt is in flight.
    Connecting,
    /// Link is open and healthy as of the last explicit health check.
    Connected,
}

/// One client-side session with the remote BBS.
///
/// Invariant: a held link implies `Connecting` or `Connected`;
/// `Connected` implies the link passed the last health check.
pub struct BbsSession<D: Dialer> {
    dialer: D,
    hosts: Vec<String>,
    policy: RetryPolicy,
    link: Option<D::Link>,
    status: SessionStatus,
    /// Last-observed normalized text, overwritten on each read.
    screen: String,
    /// The host that most recently won the failover race.
    active_host: Option<String>,
}

impl<D: Dialer> BbsSession<D> {
    /// Create a disconnected session over the given candidate hosts.
    pub fn new(dialer: D, hosts: Vec<String>, policy: RetryPolicy) -> Self {
        Self {
            dialer,
            hosts,
            policy,
            link: None,
            status: SessionStatus::Disconnected,
            screen: String::new(),
            active_host: None,
        }
    }

    /// The last-observed normalized screen text.
    pub fn screen(&self) -> &str {
        &self.screen
    }

    /// Current connection status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The host that the current or most recent connection used.
    pub fn active_host(&self) -> Option<&str> {
        self.active_host.as_deref()
    }

    /// Per-operation read timeout from the retry policy.
    pub fn read_timeout(&self) -> Duration {
        self.policy.read_timeout
    }

    /// Connect with failover and bounded retry.
    ///
    /// Each pass walks the candidate host list in order; an overloaded
    /// host is abandoned for the next one within the same pass.
    /// Between passes the session sleeps `retry_delay` (not after the
    /// final one). Failure is a reported boolean, not a fault.
    pub async fn connect(&mut self) -> bool {
        // Release any previous link so the session never holds a
        // handle it is about to abandon.
        if self.link.is_some() {
            self.disconnect().await;
        }

        let hosts = self.hosts.clone();
        let total = self.policy.max_attempts;

        for attempt in 1..=total {
            for (idx, host) in hosts.iter().enumerate() {
                info!(
                    host = host.as_str(),
                    attempt,
                    total,
                    server = idx + 1,
                    servers = hosts.len(),
                    "connecting"
                );
                self.status = SessionStatus::Connecting;

                match self.dialer.dial(host, self.policy.connect_timeout).await {
                    Ok(link) => self.link = Some(link),
                    Err(e) => {
                        warn!(host = host.as_str(), error = %e, "connection attempt failed");
                        self.link = None;
                        self.status = SessionStatus::Disconnected;
                        continue;
                    }
                }

                // Let the welcome screen finish drawing before reading.
                sleep(CONNECT_SETTLE).await;
                self.read_screen(WELCOME_READ_TIMEOUT).await;

                if signatures::is_overloaded(&self.screen) {
                    warn!(host = host.as_str(), "server overloaded, trying next host");
                    self.disconnect().await;
                    continue;
                }

                self.status = SessionStatus::Connected;
                self.active_host = Some(host.clone());
                info!(host = host.as_str(), "connected");
                return true;
            }

            if attempt < total {
                info!(
                    delay_secs = self.policy.retry_delay.as_secs(),
                    "all hosts failed, waiting before next pass"
                );
                sleep(self.policy.retry_delay).await;
            }
        }

        warn!(attempts = total, "connection attempts exhausted");
        false
    }

    /// Cheap advisory health check; no I/O beyond local handle state.
    ///
    /// Any violation flips the session to `Disconnected`.
    pub fn health_check(&mut self) -> bool {
        if self.status != SessionStatus::Connected {
            return false;
        }
        match &self.link {
            Some(link) if link.is_healthy() => true,
            _ => {
                debug!("health check failed, marking disconnected");
                self.status = SessionStatus::Disconnected;
                false
            }
        }
    }

    /// Write with a bounded flush window, guarded by a health check.
    ///
    /// If the link is unhealthy and `allow_reconnect` is set, one full
    /// `connect` is attempted and the write retried exactly once with
    /// reconnection disabled. The depth bound is the loop flag, not
    /// call-stack recursion.
    pub async fn write_guarded(&mut self, text: &str, allow_reconnect: bool) -> bool {
        let mut reconnect_budget = allow_reconnect;
        loop {
            if !self.health_check() {
                if reconnect_budget {
                    reconnect_budget = false;
                    warn!("link unhealthy, attempting reconnect before write");
                    if self.connect().await {
                        continue;
                    }
                }
                warn!("link unavailable, write dropped");
                return false;
            }

            let Some(link) = self.link.as_mut() else {
                self.status = SessionStatus::Disconnected;
                return false;
            };
            match link.write_all(text, WRITE_FLUSH_TIMEOUT).await {
                Ok(()) => return true,
                Err(e) => {
                    warn!(error = %e, transient = e.is_transient(), "write failed");
                    if let Some(mut link) = self.link.take() {
                        link.close().await;
                    }
                    self.status = SessionStatus::Disconnected;
                    return false;
                }
            }
        }
    }

    /// Read one chunk, normalize it, and overwrite the screen buffer.
    ///
    /// A timed-out read yields an empty buffer and is not an error.
    pub async fn read_screen(&mut self, timeout: Duration) -> &str {
        let chunk = match self.link.as_mut() {
            Some(link) => link.read_chunk(READ_CHUNK_SIZE, timeout).await,
            None => String::new(),
        };
        self.screen = normalize(&chunk);
        &self.screen
    }

    /// Tear down the link. Idempotent; teardown faults are logged by
    /// the link, never escalated.
    pub async fn disconnect(&mut self) {
        if let Some(mut link) = self.link.take() {
            info!("disconnecting");
            link.close().await;
        }
        self.status = SessionStatus::Disconnected;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockDialer, MockLinkSpec, MockScript};

    fn policy() -> RetryPolicy {
        RetryPolicy::new()
            .with_max_attempts(2)
            .with_retry_delay(Duration::from_millis(10))
    }

    #[tokio::test(start_paused = true)]
    async fn connect_makes_exactly_n_passes_over_all_hosts() {
        let script = MockScript::default();
        // No dial results scripted: every dial fails.
        let dialer = MockDialer::new(script.clone());
        let mut session = BbsSession::new(
            dialer,
            vec!["one.example".into(), "two.example".into()],
            policy(),
        );

        assert!(!session.connect().await);
        assert_eq!(
            script.dial_log(),
            vec!["one.example", "two.example", "one.example", "two.example"]
        );
        assert_eq!(session.status(), SessionStatus::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn overloaded_host_is_abandoned_within_the_same_pass() {
        let script = MockScript::default();
        script.push_link(MockLinkSpec::with_reads(vec!["系統過載, 請稍後再來".into()]));
        script.push_link(MockLinkSpec::with_reads(vec!["請輸入代號".into()]));
        let dialer = MockDialer::new(script.clone());
        let mut session = BbsSession::new(
            dialer,
            vec!["one.example".into(), "two.example".into()],
            policy(),
        );

        assert!(session.connect().await);
        assert_eq!(session.active_host(), Some("two.example"));
        assert_eq!(script.dial_log(), vec!["one.example", "two.example"]);
        // The overloaded link was closed before moving on.
        assert_eq!(script.close_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn connect_normalizes_the_welcome_screen() {
        let script = MockScript::default();
        script.push_link(MockLinkSpec::with_reads(vec![
            "\x1b[2J\x1b[1;1H請輸入代號".into(),
        ]));
        let dialer = MockDialer::new(script.clone());
        let mut session = BbsSession::new(dialer, vec!["one.example".into()], policy());

        assert!(session.connect().await);
        assert_eq!(session.screen(), "請輸入代號");
        assert_eq!(session.status(), SessionStatus::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn health_check_flips_status_on_unhealthy_link() {
        let script = MockScript::default();
        script.push_link(MockLinkSpec::with_reads(vec!["請輸入代號".into()]).unhealthy());
        let dialer = MockDialer::new(script.clone());
        let mut session = BbsSession::new(dialer, vec!["one.example".into()], policy());

        assert!(session.connect().await);
        assert!(!session.health_check());
        assert_eq!(session.status(), SessionStatus::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn write_guarded_reconnects_at_most_once() {
        let script = MockScript::default();
        // First link reports unhealthy at write time; the reconnect
        // produces a healthy one.
        script.push_link(MockLinkSpec::with_reads(vec!["請輸入代號".into()]).unhealthy());
        script.push_link(MockLinkSpec::with_reads(vec!["請輸入代號".into()]));
        let dialer = MockDialer::new(script.clone());
        let mut session = BbsSession::new(dialer, vec!["one.example".into()], policy());

        assert!(session.connect().await);
        assert_eq!(script.dial_log().len(), 1);

        assert!(session.write_guarded("x\r\n", true).await);
        assert_eq!(script.dial_log().len(), 2);
        assert_eq!(script.writes(), vec!["x\r\n"]);
    }

    #[tokio::test(start_paused = true)]
    async fn write_guarded_gives_up_after_one_reconnect() {
        let script = MockScript::default();
        // Both the original link and the reconnected one are unhealthy.
        script.push_link(MockLinkSpec::with_reads(vec!["請輸入代號".into()]).unhealthy());
        script.push_link(MockLinkSpec::with_reads(vec!["請輸入代號".into()]).unhealthy());
        let dialer = MockDialer::new(script.clone());
        let mut session = BbsSession::new(
            dialer,
            vec!["one.example".into()],
            policy().with_max_attempts(1),
        );

        assert!(session.connect().await);
        assert!(!session.write_guarded("x\r\n", true).await);
        // One original dial plus exactly one reconnect pass.
        assert_eq!(script.dial_log().len(), 2);
        assert!(script.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn write_guarded_without_reconnect_fails_fast() {
        let script = MockScript::default();
        script.push_link(MockLinkSpec::with_reads(vec!["請輸入代號".into()]).unhealthy());
        let dialer = MockDialer::new(script.clone());
        let mut session = BbsSession::new(dialer, vec!["one.example".into()], policy());

        assert!(session.connect().await);
        assert!(!session.write_guarded("x\r\n", false).await);
        assert_eq!(script.dial_log().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn write_failure_marks_disconnected() {
        let script = MockScript::default();
        script.push_link(MockLinkSpec::with_reads(vec!["請輸入代號".into()]).failing_writes());
        let dialer = MockDialer::new(script.clone());
        let mut session = BbsSession::new(dialer, vec!["one.example".into()], policy());

        assert!(session.connect().await);
        assert!(!session.write_guarded("x\r\n", false).await);
        assert_eq!(session.status(), SessionStatus::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_is_idempotent() {
        let script = MockScript::default();
        script.push_link(MockLinkSpec::with_reads(vec!["請輸入代號".into()]));
        let dialer = MockDialer::new(script.clone());
        let mut session = BbsSession::new(dialer, vec!["one.example".into()], policy());

        assert!(session.connect().await);
        session.disconnect().await;
        session.disconnect().await;
        assert_eq!(script.close_count(), 1);
        assert_eq!(session.status(), SessionStatus::Disconnected);
    }
}
