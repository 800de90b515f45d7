//! pttauto binary entry point.
//!
//! Automated login (and optional posting) against the PTT BBS, with
//! Telegram status notifications.

use clap::Parser;
use tracing::{debug, info, warn};

use pttauto_client::{
    BbsSession, Cli, NoopNotifier, Notifier, SshDialer, TelegramNotifier, orchestrator,
};

fn main() {
    let cli = Cli::parse();

    // Default to info; -v raises from there.
    let verbosity = cli.verbose.saturating_add(2);
    if let Err(e) = pttauto_core::init_logging(verbosity, cli.log_file.as_deref(), cli.log_format.into())
    {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        account = cli.account.as_str(),
        "pttauto starting"
    );

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

    rt.block_on(async {
        let notifier: Box<dyn Notifier> = match cli.notifier_credentials() {
            Some((token, user_id)) => match TelegramNotifier::new(token, user_id) {
                Ok(telegram) => Box::new(telegram),
                Err(e) => {
                    warn!(error = %e, "telegram notifier unavailable, notifications disabled");
                    Box::new(NoopNotifier)
                }
            },
            None => {
                debug!("telegram credentials absent, notifications disabled");
                Box::new(NoopNotifier)
            }
        };

        let mut session = BbsSession::new(SshDialer, cli.hosts.clone(), cli.retry_policy());
        let post = cli.post_request();

        tokio::select! {
            _ = orchestrator::run(
                &mut session,
                &cli.account,
                &cli.password,
                post.as_ref(),
                notifier.as_ref(),
            ) => {}
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted by user");
            }
        }

        // Safety net: idempotent, and the only teardown path after an
        // interrupt.
        session.disconnect().await;
    });

    info!("pttauto finished");
}
