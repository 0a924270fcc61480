#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use codex::exec::ExecOptions;

/// Builder for `ExecOptions` to simplify test setup.
#[derive(Default)]
pub struct ExecOptionsBuilder {
    options: ExecOptions,
}

impl ExecOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.options.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, entry: &str) -> Self {
        self.options.env.push(entry.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    pub fn timeout_ms(self, ms: u64) -> Self {
        self.timeout(Duration::from_millis(ms))
    }

    pub fn build(self) -> ExecOptions {
        self.options
    }
}
