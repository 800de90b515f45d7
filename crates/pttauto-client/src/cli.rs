//! Command-line argument parsing using clap.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use tokio::time::Duration;

use pttauto_core::constants::DEFAULT_HOST;
use pttauto_core::retry::RetryPolicy;

use crate::orchestrator::PostRequest;

/// Log output format for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CliLogFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// Structured JSON output.
    Json,
}

impl From<CliLogFormat> for pttauto_core::LogFormat {
    fn from(fmt: CliLogFormat) -> Self {
        match fmt {
            CliLogFormat::Text => pttauto_core::LogFormat::Text,
            CliLogFormat::Json => pttauto_core::LogFormat::Json,
        }
    }
}

/// Automated PTT BBS login and posting over SSH.
#[derive(Debug, Parser)]
#[command(
    name = "pttauto",
    version,
    about = "Automated PTT BBS login and posting over SSH"
)]
pub struct Cli {
    /// BBS account name
    pub account: String,

    /// BBS account password
    pub password: String,

    /// Telegram bot token (must be paired with a user id)
    #[arg(requires = "tg_user_id")]
    pub tg_token: Option<String>,

    /// Telegram user id to notify (must be paired with a token)
    #[arg(requires = "tg_token")]
    pub tg_user_id: Option<String>,

    /// Candidate host, tried in order within each retry pass (repeatable)
    #[arg(long = "host", value_name = "HOST", default_value = DEFAULT_HOST)]
    pub hosts: Vec<String>,

    /// Full passes over the host list before giving up
    #[arg(long, value_name = "N", default_value_t = 3)]
    pub max_retries: u32,

    /// Seconds to wait between full host passes
    #[arg(long, value_name = "SECONDS", default_value_t = 5)]
    pub retry_delay: u64,

    /// Board to post to (requires --post-title and --post-body)
    #[arg(long, value_name = "BOARD", requires = "post_title")]
    pub post_board: Option<String>,

    /// Title of the article to post
    #[arg(long, value_name = "TITLE", requires = "post_body")]
    pub post_title: Option<String>,

    /// Body of the article to post
    #[arg(long, value_name = "TEXT", requires = "post_board")]
    pub post_body: Option<String>,

    /// Increase verbosity (can be repeated)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = CliLogFormat::Text)]
    pub log_format: CliLogFormat,
}

impl Cli {
    /// Telegram credentials, when both halves were supplied.
    pub fn notifier_credentials(&self) -> Option<(&str, &str)> {
        match (self.tg_token.as_deref(), self.tg_user_id.as_deref()) {
            (Some(token), Some(user_id)) => Some((token, user_id)),
            _ => None,
        }
    }

    /// The requested post, when all three post options were supplied.
    pub fn post_request(&self) -> Option<PostRequest> {
        match (&self.post_board, &self.post_title, &self.post_body) {
            (Some(board), Some(title), Some(body)) => Some(PostRequest {
                board: board.clone(),
                title: title.clone(),
                body: body.clone(),
            }),
            _ => None,
        }
    }

    /// Retry policy derived from the connection options.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new()
            .with_max_attempts(self.max_retries)
            .with_retry_delay(Duration::from_secs(self.retry_delay))
    }
}
