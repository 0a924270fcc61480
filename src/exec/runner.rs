// src/exec/runner.rs

//! The `Runner` capability.
//!
//! Consumers (the `run` command, tests) talk to a `&dyn Runner` rather than
//! to [`LocalRunner`](super::LocalRunner) directly, so a scripted fake can
//! stand in for real processes.

use tokio_util::sync::CancellationToken;

use crate::errors::Result;

use super::event::EventFeed;
use super::options::ExecOptions;
use super::scope::CancelHandle;

/// A launched command: its event feed and a way to stop it early.
#[derive(Debug)]
pub struct Execution {
    pub events: EventFeed,
    pub cancel: CancelHandle,
}

impl Execution {
    /// Nothing was launched: closed feed, inert cancel handle.
    pub fn empty() -> Self {
        Self {
            events: EventFeed::closed(),
            cancel: CancelHandle::noop(),
        }
    }

    pub fn into_parts(self) -> (EventFeed, CancelHandle) {
        (self.events, self.cancel)
    }
}

/// Launches commands and streams their output as [`Event`](super::Event)s.
pub trait Runner: Send + Sync {
    /// Start `argv[0]` with `argv[1..]` as its arguments.
    ///
    /// - Arguments are passed verbatim; there is no shell.
    /// - Returns as soon as the process has been started.
    /// - Launch failures are returned here; no feed is produced for them.
    /// - Cancelling `scope` terminates the process, as does the returned
    ///   [`CancelHandle`].
    fn start(
        &self,
        scope: &CancellationToken,
        argv: &[String],
        options: &ExecOptions,
    ) -> Result<Execution>;
}
