// src/exec/scope.rs

//! Per-execution cancellation scope.
//!
//! Every launched process gets a child of the caller's
//! [`CancellationToken`]. The child is cancelled by:
//! - the caller cancelling the parent token (e.g. Ctrl-C),
//! - the [`CancelHandle`] returned to the caller,
//! - the optional timeout timer.
//!
//! The exit watcher is the only task that observes the token; it kills the
//! process when the token fires.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Cancellation scope bound to one process lifetime.
///
/// Dropping (or [`release`](ExecScope::release)-ing) the scope stops the
/// timeout timer. It does **not** cancel the token.
#[derive(Debug)]
pub struct ExecScope {
    token: CancellationToken,
    timer: Option<JoinHandle<()>>,
}

impl ExecScope {
    /// Derive a scope from `parent`, armed with `timeout` if given.
    ///
    /// Must be called from within a Tokio runtime when `timeout` is set.
    pub fn derive(parent: &CancellationToken, timeout: Option<Duration>) -> Self {
        let token = parent.child_token();
        let timer = timeout.map(|limit| {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(limit) => {
                        debug!(timeout = ?limit, "execution timed out");
                        token.cancel();
                    }
                    _ = token.cancelled() => {}
                }
            })
        });
        Self { token, timer }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Handle the caller can use to request termination.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            token: self.token.clone(),
        }
    }

    /// Stop the timeout timer, if any.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for ExecScope {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Caller-facing handle that asks a running process to terminate.
///
/// Cheap to clone, safe to call any number of times from any task, and a
/// no-op once the process has exited.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// A handle that is not attached to any process.
    pub fn noop() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
