// src/exec/event.rs

//! Events emitted by a running process and the feed that carries them.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// A single item in the execution event stream.
///
/// Stdout/stderr payloads are chunks as they came off the pipe, not lines.
/// `Exit` is always the last event of a feed and appears exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Event {
    Stdout(String),
    Stderr(String),
    Exit(i32),
}

impl Event {
    pub fn is_exit(&self) -> bool {
        matches!(self, Event::Exit(_))
    }

    /// Exit code, if this is the terminal event.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Event::Exit(code) => Some(*code),
            _ => None,
        }
    }
}

/// Receiving side of one execution's events.
///
/// The feed yields `None` once the exit watcher has published `Exit` and
/// dropped the last sender.
#[derive(Debug)]
pub struct EventFeed {
    rx: mpsc::Receiver<Event>,
}

impl EventFeed {
    /// Wrap a receiver. The feed closes once every sender is dropped.
    pub fn from_receiver(rx: mpsc::Receiver<Event>) -> Self {
        Self { rx }
    }

    /// A feed that is already closed and will never yield an event.
    pub fn closed() -> Self {
        let (_tx, rx) = mpsc::channel(1);
        Self { rx }
    }

    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Drain the feed to completion.
    pub async fn collect(mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some(event) = self.rx.recv().await {
            events.push(event);
        }
        events
    }
}

/// Concatenate every stdout chunk in `events`.
pub fn stdout_text(events: &[Event]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Stdout(data) => Some(data.as_str()),
            _ => None,
        })
        .collect()
}

/// Concatenate every stderr chunk in `events`.
pub fn stderr_text(events: &[Event]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Stderr(data) => Some(data.as_str()),
            _ => None,
        })
        .collect()
}
