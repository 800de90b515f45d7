//! pttauto-client: Automated PTT BBS session client.
//!
//! Drives a Big5, menu-driven BBS over SSH with no structured
//! protocol: the client recognizes known screens by substring
//! matching and answers with fixed keystroke sequences and settle
//! delays. Modules:
//! - `transport` - SSH byte-stream adapter (dial/read/write/close)
//! - `connection` - lifecycle: host failover, retry, health-checked writes
//! - `login` - the login negotiation state machine
//! - `script` - posting and logout keystroke scripts
//! - `notify` - outbound status notifications
//! - `orchestrator` - connect -> login -> post -> logout sequencing

pub mod cli;
pub mod connection;
pub mod login;
pub mod notify;
pub mod orchestrator;
pub mod script;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use cli::Cli;
pub use connection::{BbsSession, SessionStatus};
pub use login::LoginOutcome;
pub use notify::{NoopNotifier, Notifier, TelegramNotifier};
pub use orchestrator::PostRequest;
pub use transport::{Dialer, Link, SshDialer};
