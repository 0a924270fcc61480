// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::exec::ExecOptions;
use crate::exec::local::DEFAULT_FALLBACK_EXIT_CODE;

/// Configuration file as read from TOML, before validation.
///
/// ```toml
/// [run]
/// cwd = "/srv/app"
/// env = ["RUST_LOG=info"]
/// timeout = "30s"
/// fallback_exit_code = 1
/// ```
///
/// Every section and key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub run: RawRunSection,
}

/// `[run]` section: defaults for `codex run`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRunSection {
    /// Working directory for launched commands.
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Extra `KEY=VALUE` entries layered over the caller's environment.
    #[serde(default)]
    pub env: Vec<String>,

    /// Duration string such as `"30s"`; `"0s"` disables the timeout.
    #[serde(default)]
    pub timeout: Option<String>,

    /// Exit code reported when the OS status cannot be decoded.
    #[serde(default)]
    pub fallback_exit_code: Option<i32>,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub run: RunSection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSection {
    pub cwd: Option<PathBuf>,
    pub env: Vec<String>,
    pub timeout: Option<Duration>,
    pub fallback_exit_code: i32,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            cwd: None,
            env: Vec::new(),
            timeout: None,
            fallback_exit_code: DEFAULT_FALLBACK_EXIT_CODE,
        }
    }
}

impl RunSection {
    /// Merge CLI overrides on top of this section.
    ///
    /// `base_env` is the caller's ambient environment; config `env` and then
    /// `cli_env` are appended to it, so later entries win for the same key.
    /// The result is a full replacement list for the child.
    pub fn to_exec_options(
        &self,
        cli_cwd: Option<PathBuf>,
        cli_env: &[String],
        cli_timeout: Option<Duration>,
        base_env: impl IntoIterator<Item = String>,
    ) -> ExecOptions {
        let extra: Vec<String> = self.env.iter().chain(cli_env).cloned().collect();
        let env = if extra.is_empty() {
            Vec::new()
        } else {
            base_env.into_iter().chain(extra).collect()
        };

        ExecOptions {
            cwd: cli_cwd.or_else(|| self.cwd.clone()),
            env,
            timeout: cli_timeout.or(self.timeout),
        }
    }
}
