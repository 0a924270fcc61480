// src/protocol.rs

//! Wire types for the line-delimited submission/event protocol.
//!
//! Client -> agent: one [`Submission`] per line.
//! Agent -> client: one [`Event`] per line, carrying the submission `id`.
//!
//! ```text
//! {"id":"sub-1","op":{"type":"user_input","items":[{"type":"text","text":"Hello"}]}}
//! {"id":"sub-1","msg":{"type":"task_started"}}
//! {"id":"sub-1","msg":{"type":"agent_message","text":"You said: Hello"}}
//! {"id":"sub-1","msg":{"type":"task_complete"}}
//! ```

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::errors::Result;

/// A request from the client. `id` ties follow-up events back to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub op: Op,
}

/// Operation carried by a submission, discriminated by `type`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Op {
    UserInput {
        #[serde(default)]
        items: Vec<InputItem>,
    },
    Interrupt,
    /// Any op type this agent does not understand.
    #[default]
    #[serde(other)]
    Unsupported,
}

/// One piece of user input. Only `type = "text"` items are interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputItem {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
}

impl InputItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

/// A reply from the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub msg: EventMsg,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventMsg {
    TaskStarted,
    AgentMessage { text: String },
    TaskComplete,
    Error { message: String },
}

/// Error line not bound to any submission (e.g. malformed JSON).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

impl ErrorReply {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Serialize `value` as one JSON line and flush it.
pub async fn write_json_line<W, T>(writer: &mut W, value: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}
