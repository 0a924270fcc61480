use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use codex::errors::{CodexError, Result};
use codex::exec::{Event, EventFeed, ExecOptions, ExecScope, Execution, Runner};

/// A fake runner that:
/// - records every argv it was asked to start,
/// - replays a fixed list of output events, one every `step`,
/// - finishes with `Exit(exit_code)`, or `Exit(cancelled_code)` if the
///   execution was cancelled first.
pub struct ScriptedRunner {
    output: Vec<Event>,
    exit_code: i32,
    cancelled_code: i32,
    step: Duration,
    fail_launch: bool,
    started: Arc<Mutex<Vec<Vec<String>>>>,
}

impl ScriptedRunner {
    pub fn new(output: Vec<Event>, exit_code: i32) -> Self {
        Self {
            output,
            exit_code,
            cancelled_code: 137,
            step: Duration::ZERO,
            fail_launch: false,
            started: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Delay between scripted events.
    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    /// Make every `start` fail like a missing executable.
    pub fn failing(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    pub fn started(&self) -> Vec<Vec<String>> {
        self.started.lock().unwrap().clone()
    }
}

impl Runner for ScriptedRunner {
    fn start(
        &self,
        scope: &CancellationToken,
        argv: &[String],
        _options: &ExecOptions,
    ) -> Result<Execution> {
        if argv.is_empty() {
            return Ok(Execution::empty());
        }
        if self.fail_launch {
            return Err(CodexError::Launch {
                program: argv[0].clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }

        self.started.lock().unwrap().push(argv.to_vec());

        let exec_scope = ExecScope::derive(scope, None);
        let cancel = exec_scope.cancel_handle();
        let (tx, rx) = mpsc::channel(16);
        let output = self.output.clone();
        let (exit_code, cancelled_code, step) = (self.exit_code, self.cancelled_code, self.step);

        tokio::spawn(async move {
            let token = exec_scope.token().clone();
            let mut code = exit_code;
            for event in output {
                tokio::select! {
                    _ = token.cancelled() => {
                        code = cancelled_code;
                        break;
                    }
                    _ = tokio::time::sleep(step) => {}
                }
                if tx.send(event).await.is_err() {
                    return;
                }
            }
            let _ = tx.send(Event::Exit(code)).await;
            exec_scope.release();
        });

        Ok(Execution {
            events: EventFeed::from_receiver(rx),
            cancel,
        })
    }
}
