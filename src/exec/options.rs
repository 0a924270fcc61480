// src/exec/options.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{CodexError, Result};

/// Launch configuration for a single command.
///
/// - `cwd`: working directory; `None` (or an empty path) inherits the caller's.
/// - `env`: `KEY=VALUE` entries. When non-empty, the child sees **only**
///   these variables; when empty, it inherits the caller's environment.
/// - `timeout`: kill the process after this long. `None` or zero disables it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOptions {
    pub cwd: Option<PathBuf>,
    pub env: Vec<String>,
    pub timeout: Option<Duration>,
}

impl ExecOptions {
    /// Working directory override, ignoring empty paths.
    pub fn effective_cwd(&self) -> Option<&PathBuf> {
        self.cwd.as_ref().filter(|p| !p.as_os_str().is_empty())
    }

    /// Timeout to enforce, ignoring zero durations.
    pub fn effective_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|d| !d.is_zero())
    }

    /// Split the environment override into key/value pairs.
    ///
    /// Returns an empty vec when the caller's environment should be inherited.
    pub fn env_pairs(&self) -> Result<Vec<(&str, &str)>> {
        self.env.iter().map(|entry| split_env_entry(entry)).collect()
    }
}

/// Split one `KEY=VALUE` entry. The value may itself contain `=`.
pub fn split_env_entry(entry: &str) -> Result<(&str, &str)> {
    match entry.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(CodexError::InvalidEnv(entry.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_and_empty_cwd_are_ignored() {
        let opts = ExecOptions {
            cwd: Some(PathBuf::new()),
            env: vec![],
            timeout: Some(Duration::ZERO),
        };
        assert!(opts.effective_cwd().is_none());
        assert!(opts.effective_timeout().is_none());
    }

    #[test]
    fn env_value_may_contain_equals() {
        assert_eq!(split_env_entry("A=b=c").unwrap(), ("A", "b=c"));
        assert_eq!(split_env_entry("EMPTY=").unwrap(), ("EMPTY", ""));
    }

    #[test]
    fn env_entry_without_key_is_rejected() {
        assert!(matches!(
            split_env_entry("NOEQUALS"),
            Err(CodexError::InvalidEnv(_))
        ));
        assert!(matches!(
            split_env_entry("=value"),
            Err(CodexError::InvalidEnv(_))
        ));
    }
}
