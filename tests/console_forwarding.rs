// tests/console_forwarding.rs

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use codex::console::{forward_events, run_command};
use codex::errors::CodexError;
use codex::exec::{Event, ExecOptions, Runner};
use codex_test_utils::scripted_runner::ScriptedRunner;
use codex_test_utils::{argv, assert_single_trailing_exit, collect_events, init_tracing, with_timeout};

#[tokio::test]
async fn forwards_streams_to_matching_writers() {
    init_tracing();
    let runner = ScriptedRunner::new(
        vec![
            Event::Stdout("hello ".into()),
            Event::Stderr("warning\n".into()),
            Event::Stdout("world\n".into()),
        ],
        3,
    );
    let scope = CancellationToken::new();

    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = with_timeout(run_command(
        &runner,
        &scope,
        &argv(&["tool", "--flag"]),
        &ExecOptions::default(),
        &mut out,
        &mut err,
    ))
    .await
    .unwrap();

    assert_eq!(code, 3);
    assert_eq!(String::from_utf8(out).unwrap(), "hello world\n");
    assert_eq!(String::from_utf8(err).unwrap(), "warning\n\n[exit 3]\n");
    assert_eq!(runner.started(), vec![argv(&["tool", "--flag"])]);
}

#[tokio::test]
async fn launch_errors_are_returned_to_the_caller() {
    let runner = ScriptedRunner::new(vec![], 0).failing();
    let scope = CancellationToken::new();

    let mut out = Vec::new();
    let mut err = Vec::new();
    let result = run_command(
        &runner,
        &scope,
        &argv(&["missing"]),
        &ExecOptions::default(),
        &mut out,
        &mut err,
    )
    .await;

    assert!(matches!(result, Err(CodexError::Launch { .. })));
    assert!(out.is_empty());
    assert!(err.is_empty());
}

#[tokio::test]
async fn empty_argv_forwards_nothing_and_reports_success() {
    let runner = ScriptedRunner::new(vec![Event::Stdout("never".into())], 9);
    let scope = CancellationToken::new();

    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = run_command(&runner, &scope, &[], &ExecOptions::default(), &mut out, &mut err)
        .await
        .unwrap();

    assert_eq!(code, 0);
    assert!(out.is_empty());
    assert!(err.is_empty());
    assert!(runner.started().is_empty());
}

#[tokio::test]
async fn forward_events_reports_missing_exit_as_none() {
    let feed = codex::exec::EventFeed::closed();
    let mut out = Vec::new();
    let mut err = Vec::new();

    let code = forward_events(feed, &mut out, &mut err).await.unwrap();
    assert_eq!(code, None);
}

#[tokio::test]
async fn cancelling_a_scripted_run_ends_with_single_exit() {
    let runner = ScriptedRunner::new(
        (0..100).map(|i| Event::Stdout(format!("{i}\n"))).collect(),
        0,
    )
    .with_step(Duration::from_millis(20));
    let scope = CancellationToken::new();

    let exec = runner
        .start(&scope, &argv(&["slow"]), &ExecOptions::default())
        .unwrap();
    let cancel = exec.cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let events = collect_events(exec.events).await;
    assert!(events.len() < 101);
    assert_eq!(assert_single_trailing_exit(&events), 137);
}

#[cfg(unix)]
#[tokio::test]
async fn real_command_through_console() {
    init_tracing();
    let runner = codex::exec::LocalRunner::new();
    let scope = CancellationToken::new();

    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = with_timeout(run_command(
        &runner,
        &scope,
        &argv(&["sh", "-c", "printf hi; exit 4"]),
        &ExecOptions::default(),
        &mut out,
        &mut err,
    ))
    .await
    .unwrap();

    assert_eq!(code, 4);
    assert_eq!(out, b"hi");
    assert_eq!(err, b"\n[exit 4]\n");
}
