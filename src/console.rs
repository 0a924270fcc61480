// src/console.rs

//! Terminal side of `codex run`: start a command through a [`Runner`] and
//! forward its events to stdout/stderr.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::Result;
use crate::exec::{CancelHandle, Event, EventFeed, ExecOptions, Runner};

/// Kills the process if forwarding stops early (e.g. a write error).
struct CancelOnDrop(CancelHandle);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Write every event in `feed` to `out`/`err` until the feed closes.
///
/// Stdout and stderr chunks are written verbatim. The exit event is
/// rendered as `\n[exit N]\n` on `err`. Returns the exit code, or `None`
/// if the feed closed without one (nothing was launched).
pub async fn forward_events<O, E>(mut feed: EventFeed, out: &mut O, err: &mut E) -> Result<Option<i32>>
where
    O: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    let mut exit_code = None;

    while let Some(event) = feed.recv().await {
        match event {
            Event::Stdout(data) => {
                out.write_all(data.as_bytes()).await?;
                out.flush().await?;
            }
            Event::Stderr(data) => {
                err.write_all(data.as_bytes()).await?;
                err.flush().await?;
            }
            Event::Exit(code) => {
                err.write_all(format!("\n[exit {code}]\n").as_bytes()).await?;
                err.flush().await?;
                exit_code = Some(code);
            }
        }
    }

    Ok(exit_code)
}

/// Launch `argv` and stream it to the given writers.
///
/// Returns the command's exit code (`0` if nothing was launched). Launch
/// errors are returned as-is for the caller to render.
pub async fn run_command<O, E>(
    runner: &dyn Runner,
    scope: &CancellationToken,
    argv: &[String],
    options: &ExecOptions,
    out: &mut O,
    err: &mut E,
) -> Result<i32>
where
    O: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    let (feed, cancel) = runner.start(scope, argv, options)?.into_parts();
    let _guard = CancelOnDrop(cancel);

    let code = forward_events(feed, out, err).await?.unwrap_or(0);
    debug!(exit_code = code, "command finished");
    Ok(code)
}
