// tests/stdio_protocols.rs

use tokio_util::sync::CancellationToken;

use codex::{agent, mcp};
use codex_test_utils::with_timeout;

async fn run_agent(input: &str) -> Vec<String> {
    let mut out = Vec::new();
    agent::serve(&CancellationToken::new(), input.as_bytes(), &mut out)
        .await
        .unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

async fn run_mcp(input: &str) -> Vec<String> {
    let mut out = Vec::new();
    mcp::serve(&CancellationToken::new(), input.as_bytes(), &mut out)
        .await
        .unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn agent_user_input_produces_task_lifecycle() {
    let lines = run_agent(
        "{\"id\":\"sub-1\",\"op\":{\"type\":\"user_input\",\"items\":[{\"type\":\"text\",\"text\":\"Hello\"}]}}\n",
    )
    .await;

    assert_eq!(
        lines,
        vec![
            r#"{"id":"sub-1","msg":{"type":"task_started"}}"#,
            r#"{"id":"sub-1","msg":{"type":"agent_message","text":"You said: Hello"}}"#,
            r#"{"id":"sub-1","msg":{"type":"task_complete"}}"#,
        ]
    );
}

#[tokio::test]
async fn agent_keeps_going_after_bad_lines() {
    let input = concat!(
        "this is not json\n",
        "{\"id\":\"sub-2\",\"op\":{\"type\":\"interrupt\"}}\n",
        "{\"id\":\"sub-3\",\"op\":{\"type\":\"compact\"}}\n",
    );
    let lines = run_agent(input).await;

    assert_eq!(
        lines,
        vec![
            r#"{"error":"invalid json"}"#,
            r#"{"id":"sub-2","msg":{"type":"error","message":"interrupted"}}"#,
            r#"{"id":"sub-3","msg":{"type":"error","message":"unsupported op"}}"#,
        ]
    );
}

#[tokio::test]
async fn mcp_handles_each_method() {
    let input = concat!(
        "{\"method\":\"ping\"}\n",
        "{\"method\":\"echo\",\"text\":\"hi\"}\n",
        "{\"method\":\"echo\"}\n",
        "{\"method\":\"initialize\"}\n",
        "{oops\n",
    );
    let lines = run_mcp(input).await;

    assert_eq!(
        lines,
        vec![
            r#"{"result":"pong"}"#,
            r#"{"type":"agent_message","text":"hi"}"#,
            r#"{"error":"missing text"}"#,
            r#"{"error":"method not implemented"}"#,
            r#"{"error":"invalid json"}"#,
        ]
    );
}

#[tokio::test]
async fn serve_loops_stop_when_cancelled() {
    // A reader that never yields a line: only cancellation can end the loop.
    let (_client, server) = tokio::io::duplex(64);
    let reader = tokio::io::BufReader::new(server);
    let token = CancellationToken::new();
    token.cancel();

    let mut out = Vec::new();
    with_timeout(mcp::serve(&token, reader, &mut out))
        .await
        .unwrap();
    assert!(out.is_empty());

    let (_client, server) = tokio::io::duplex(64);
    let reader = tokio::io::BufReader::new(server);
    with_timeout(agent::serve(&token, reader, &mut out))
        .await
        .unwrap();
    assert!(out.is_empty());
}
