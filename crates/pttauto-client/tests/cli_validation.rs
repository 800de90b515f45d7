//! CLI validation tests for the pttauto client.

use clap::Parser;
use pttauto_client::Cli;

#[test]
fn account_and_password_are_required() {
    assert!(Cli::try_parse_from(["pttauto"]).is_err());
    assert!(Cli::try_parse_from(["pttauto", "someuser"]).is_err());

    let cli = Cli::try_parse_from(["pttauto", "someuser", "hunter2"]).unwrap();
    assert_eq!(cli.account, "someuser");
    assert_eq!(cli.password, "hunter2");
}

#[test]
fn defaults() {
    let cli = Cli::try_parse_from(["pttauto", "someuser", "hunter2"]).unwrap();
    assert_eq!(cli.hosts, vec!["ptt.cc"]);
    assert_eq!(cli.max_retries, 3);
    assert_eq!(cli.retry_delay, 5);
    assert!(cli.notifier_credentials().is_none());
    assert!(cli.post_request().is_none());
}

#[test]
fn telegram_credentials_are_all_or_nothing() {
    // Token without user id is a usage error.
    assert!(Cli::try_parse_from(["pttauto", "someuser", "hunter2", "123456:ABC-DEF"]).is_err());

    let cli = Cli::try_parse_from([
        "pttauto",
        "someuser",
        "hunter2",
        "123456:ABC-DEF",
        "987654321",
    ])
    .unwrap();
    assert_eq!(
        cli.notifier_credentials(),
        Some(("123456:ABC-DEF", "987654321"))
    );
}

#[test]
fn post_options_are_all_or_nothing() {
    assert!(
        Cli::try_parse_from(["pttauto", "someuser", "hunter2", "--post-board", "test"]).is_err()
    );
    assert!(
        Cli::try_parse_from([
            "pttauto",
            "someuser",
            "hunter2",
            "--post-board",
            "test",
            "--post-title",
            "t",
        ])
        .is_err()
    );
    assert!(
        Cli::try_parse_from([
            "pttauto",
            "someuser",
            "hunter2",
            "--post-title",
            "t",
            "--post-body",
            "b",
        ])
        .is_err()
    );

    let cli = Cli::try_parse_from([
        "pttauto",
        "someuser",
        "hunter2",
        "--post-board",
        "test",
        "--post-title",
        "標題",
        "--post-body",
        "內文",
    ])
    .unwrap();
    let request = cli.post_request().unwrap();
    assert_eq!(request.board, "test");
    assert_eq!(request.title, "標題");
    assert_eq!(request.body, "內文");
}

#[test]
fn hosts_are_repeatable_and_ordered() {
    let cli = Cli::try_parse_from([
        "pttauto",
        "someuser",
        "hunter2",
        "--host",
        "one.example",
        "--host",
        "two.example",
    ])
    .unwrap();
    assert_eq!(cli.hosts, vec!["one.example", "two.example"]);
}

#[test]
fn retry_options_feed_the_policy() {
    let cli = Cli::try_parse_from([
        "pttauto",
        "someuser",
        "hunter2",
        "--max-retries",
        "7",
        "--retry-delay",
        "2",
    ])
    .unwrap();
    let policy = cli.retry_policy();
    assert_eq!(policy.max_attempts, 7);
    assert_eq!(policy.retry_delay.as_secs(), 2);
}
