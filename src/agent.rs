// src/agent.rs

//! Submission/event protocol loop (`codex agent serve`).
//!
//! For each input line:
//! - `user_input` => `task_started`, `agent_message`, `task_complete`
//! - `interrupt`  => `error("interrupted")`
//! - other ops    => `error("unsupported op")`
//! - bad JSON     => `{"error":"invalid json"}` (no id), loop continues

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::Result;
use crate::protocol::{ErrorReply, Event, EventMsg, InputItem, Op, Submission, write_json_line};

/// One output line produced for an input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Event(Event),
    Error(ErrorReply),
}

/// Serve the protocol until EOF or until `cancel` fires.
pub async fn serve<R, W>(cancel: &CancellationToken, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("agent loop cancelled");
                break;
            }
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            debug!("agent input closed");
            break;
        };

        for reply in handle_line(&line) {
            write_json_line(&mut writer, &reply).await?;
        }
    }

    Ok(())
}

/// Compute the replies for a single input line.
pub fn handle_line(line: &str) -> Vec<Reply> {
    let sub: Submission = match serde_json::from_str(line) {
        Ok(sub) => sub,
        Err(err) => {
            debug!(error = %err, "rejecting malformed submission");
            return vec![Reply::Error(ErrorReply::new("invalid json"))];
        }
    };

    let event = |msg| Reply::Event(Event {
        id: sub.id.clone(),
        msg,
    });

    match &sub.op {
        Op::UserInput { items } => {
            let text = text_from_items(items);
            let reply = if text.is_empty() {
                "Hi there".to_string()
            } else {
                format!("You said: {text}")
            };
            vec![
                event(EventMsg::TaskStarted),
                event(EventMsg::AgentMessage { text: reply }),
                event(EventMsg::TaskComplete),
            ]
        }
        Op::Interrupt => vec![event(EventMsg::Error {
            message: "interrupted".to_string(),
        })],
        Op::Unsupported => vec![event(EventMsg::Error {
            message: "unsupported op".to_string(),
        })],
    }
}

/// Join the non-empty `text` items with spaces.
fn text_from_items(items: &[InputItem]) -> String {
    let parts: Vec<&str> = items
        .iter()
        .filter(|it| it.kind.eq_ignore_ascii_case("text") && !it.text.is_empty())
        .map(|it| it.text.as_str())
        .collect();
    parts.join(" ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_text_items_are_joined() {
        let items = vec![
            InputItem::text(" hello"),
            InputItem {
                kind: "image".into(),
                text: "ignored".into(),
            },
            InputItem::text(""),
            InputItem {
                kind: "TEXT".into(),
                text: "world ".into(),
            },
        ];
        assert_eq!(text_from_items(&items), "hello world");
    }

    #[test]
    fn empty_input_gets_default_greeting() {
        let replies = handle_line(r#"{"id":"a","op":{"type":"user_input"}}"#);
        assert_eq!(replies.len(), 3);
        assert_eq!(
            replies[1],
            Reply::Event(Event {
                id: "a".into(),
                msg: EventMsg::AgentMessage {
                    text: "Hi there".into()
                },
            })
        );
    }

    #[test]
    fn missing_op_is_unsupported() {
        let replies = handle_line(r#"{"id":"a"}"#);
        assert_eq!(
            replies,
            vec![Reply::Event(Event {
                id: "a".into(),
                msg: EventMsg::Error {
                    message: "unsupported op".into()
                },
            })]
        );
    }
}
