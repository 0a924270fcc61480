// src/mcp.rs

//! Minimal JSON-over-stdio request handler (`codex mcp serve`).
//!
//! Each input line is `{"method": "...", "text"?: "..."}`:
//! - `ping` => `{"result":"pong"}`
//! - `echo` => `{"type":"agent_message","text":...}` (requires `text`)
//! - anything else => `{"error":"method not implemented"}`

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::Result;
use crate::protocol::write_json_line;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Result {
        result: String,
    },
    Message {
        #[serde(rename = "type")]
        kind: String,
        text: String,
    },
    Error {
        error: String,
    },
}

impl Response {
    fn error(msg: &str) -> Self {
        Response::Error {
            error: msg.to_string(),
        }
    }
}

/// Serve requests until EOF or until `cancel` fires.
pub async fn serve<R, W>(cancel: &CancellationToken, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("mcp loop cancelled");
                break;
            }
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            break;
        };

        write_json_line(&mut writer, &handle_line(&line)).await?;
    }

    Ok(())
}

pub fn handle_line(line: &str) -> Response {
    let req: Request = match serde_json::from_str(line) {
        Ok(req) => req,
        Err(_) => return Response::error("invalid json"),
    };

    match req.method.as_str() {
        "ping" => Response::Result {
            result: "pong".to_string(),
        },
        "echo" => match req.text {
            Some(text) if !text.is_empty() => Response::Message {
                kind: "agent_message".to_string(),
                text,
            },
            _ => Response::error("missing text"),
        },
        other => {
            debug!(method = %other, "unknown mcp method");
            Response::error("method not implemented")
        }
    }
}
