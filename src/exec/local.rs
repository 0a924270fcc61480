// src/exec/local.rs

//! `Runner` backed by `tokio::process`.
//!
//! Per execution this spawns three tasks:
//! - a stdout drain and a stderr drain, each reading fixed-size chunks and
//!   publishing them as events,
//! - an exit watcher that waits for the process (killing it if the scope is
//!   cancelled), joins the drains, publishes the single `Exit` event and then
//!   drops the last sender, which closes the feed.
//!
//! Delivery to the feed is never cut short: a drain waiting on a slow
//! consumer keeps its data. The drain grace only bounds how long a drain may
//! wait on an idle pipe after the process has exited.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::errors::{CodexError, Result};

use super::decode::Utf8Decoder;
use super::event::{Event, EventFeed};
use super::options::ExecOptions;
use super::runner::{Execution, Runner};
use super::scope::ExecScope;

/// Bytes requested per read from a child pipe.
pub const CHUNK_SIZE: usize = 4096;

/// Capacity of the per-execution event channel.
pub const EVENT_BUFFER: usize = 16;

/// Exit code reported when the OS status cannot be decoded.
pub const DEFAULT_FALLBACK_EXIT_CODE: i32 = 1;

/// How long the watcher waits for drains after the process has exited.
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Upper bound on bytes a stopped drain still reads from a ready pipe.
const STOPPED_READ_BUDGET: usize = 1024 * 1024;

/// Runs commands as local OS processes.
#[derive(Debug, Clone)]
pub struct LocalRunner {
    fallback_exit_code: i32,
    drain_grace: Duration,
}

impl LocalRunner {
    pub fn new() -> Self {
        Self {
            fallback_exit_code: DEFAULT_FALLBACK_EXIT_CODE,
            drain_grace: DEFAULT_DRAIN_GRACE,
        }
    }

    /// Override the exit code used when the OS status is not decodable.
    ///
    /// Zero is not a valid fallback and is replaced by the default.
    pub fn with_fallback_exit_code(mut self, code: i32) -> Self {
        self.fallback_exit_code = if code == 0 {
            DEFAULT_FALLBACK_EXIT_CODE
        } else {
            code
        };
        self
    }

    /// Bound on how long stdout/stderr may wait for more data after exit
    /// (e.g. when a grandchild still holds the pipe open).
    pub fn with_drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }

    pub fn fallback_exit_code(&self) -> i32 {
        self.fallback_exit_code
    }

    fn build_command(program: &str, args: &[String], options: &ExecOptions) -> Result<Command> {
        // Validate the env override before anything is spawned.
        let env = options.env_pairs()?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = options.effective_cwd() {
            cmd.current_dir(dir);
        }

        if !env.is_empty() {
            cmd.env_clear();
            cmd.envs(env);
        }

        Ok(cmd)
    }
}

impl Default for LocalRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner for LocalRunner {
    fn start(
        &self,
        scope: &CancellationToken,
        argv: &[String],
        options: &ExecOptions,
    ) -> Result<Execution> {
        let Some((program, args)) = argv.split_first() else {
            debug!("empty argv; returning closed event feed");
            return Ok(Execution::empty());
        };

        let mut cmd = Self::build_command(program, args, options)?;
        let exec_scope = ExecScope::derive(scope, options.effective_timeout());

        let mut child = cmd.spawn().map_err(|source| CodexError::Launch {
            program: program.clone(),
            source,
        })?;

        // Both pipes were requested above; a missing one means setup failed.
        // Returning drops `child`, which kills it (`kill_on_drop`), and drops
        // the scope, which stops the timer.
        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(CodexError::Launch {
                program: program.clone(),
                source: std::io::Error::other("failed to capture stdout/stderr pipes"),
            });
        };

        debug!(
            program = %program,
            pid = ?child.id(),
            timeout = ?options.effective_timeout(),
            "process started"
        );

        let (tx, rx) = mpsc::channel::<Event>(EVENT_BUFFER);
        let cancel = exec_scope.cancel_handle();
        let stop = CancellationToken::new();

        let drains = [
            tokio::spawn(drain_stream(stdout, tx.clone(), Event::Stdout, stop.clone())),
            tokio::spawn(drain_stream(stderr, tx.clone(), Event::Stderr, stop.clone())),
        ];

        let watcher = ExitWatcher {
            program: program.clone(),
            fallback_exit_code: self.fallback_exit_code,
            drain_grace: self.drain_grace,
        };
        tokio::spawn(watcher.run(child, exec_scope, drains, stop, tx));

        Ok(Execution {
            events: EventFeed::from_receiver(rx),
            cancel,
        })
    }
}

/// Read `reader` to completion, publishing each decoded chunk.
///
/// Stops quietly on end-of-stream, on a read error, or when the consumer has
/// gone away. Once `stop` fires, only data the pipe already has ready is
/// read (up to [`STOPPED_READ_BUDGET`]); a pending read ends the drain.
/// Sends are never interrupted.
async fn drain_stream<R>(
    mut reader: R,
    tx: mpsc::Sender<Event>,
    wrap: fn(String) -> Event,
    stop: CancellationToken,
) where
    R: AsyncRead + Unpin,
{
    let mut decoder = Utf8Decoder::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut read_after_stop = 0usize;

    loop {
        let read = tokio::select! {
            biased;
            read = reader.read(&mut buf) => read,
            _ = stop.cancelled() => {
                trace!("stream idle after stop; ending drain");
                break;
            }
        };

        match read {
            Ok(0) => break,
            Ok(n) => {
                if stop.is_cancelled() {
                    read_after_stop += n;
                }
                let text = decoder.decode(&buf[..n]);
                if !text.is_empty() && tx.send(wrap(text)).await.is_err() {
                    trace!("event feed dropped; stopping drain");
                    return;
                }
                if read_after_stop >= STOPPED_READ_BUDGET {
                    trace!("read budget after stop exhausted; ending drain");
                    break;
                }
            }
            Err(err) => {
                trace!(error = %err, "stream read failed; stopping drain");
                break;
            }
        }
    }

    let tail = decoder.finish();
    if !tail.is_empty() {
        let _ = tx.send(wrap(tail)).await;
    }
}

struct ExitWatcher {
    program: String,
    fallback_exit_code: i32,
    drain_grace: Duration,
}

impl ExitWatcher {
    async fn run(
        self,
        mut child: Child,
        scope: ExecScope,
        drains: [JoinHandle<()>; 2],
        stop: CancellationToken,
        tx: mpsc::Sender<Event>,
    ) {
        let status = tokio::select! {
            status = child.wait() => status,
            _ = scope.token().cancelled() => {
                debug!(program = %self.program, "cancellation requested; killing process");
                if let Err(err) = child.kill().await {
                    debug!(program = %self.program, error = %err, "failed to kill process");
                }
                child.wait().await
            }
        };

        let code = match status {
            Ok(status) => decode_exit_status(status, self.fallback_exit_code),
            Err(err) => {
                debug!(program = %self.program, error = %err, "waiting for process failed");
                self.fallback_exit_code
            }
        };

        // Exit must be the last event, so both drains finish first.
        let joined = async {
            for drain in drains {
                if let Err(err) = drain.await {
                    debug!(program = %self.program, error = %err, "drain task failed");
                }
            }
        };
        tokio::pin!(joined);
        if tokio::time::timeout(self.drain_grace, &mut joined).await.is_err() {
            debug!(program = %self.program, "streams still open after exit; stopping drains");
            stop.cancel();
            joined.await;
        }

        let _ = tx.send(Event::Exit(code)).await;
        drop(tx);
        scope.release();

        debug!(program = %self.program, exit_code = code, "process exited");
    }
}

/// Map an OS exit status to a single integer code.
///
/// - normal exit: the process' own code,
/// - killed by a signal (Unix): `128 + signal`,
/// - anything else: `fallback`.
pub fn decode_exit_status(status: ExitStatus, fallback: i32) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    fallback
}
