// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile, RawRunSection, RunSection};
use crate::duration::parse_duration;
use crate::errors::{CodexError, Result};
use crate::exec::local::DEFAULT_FALLBACK_EXIT_CODE;
use crate::exec::options::split_env_entry;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = CodexError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        Ok(ConfigFile {
            run: validate_run_section(raw.run)?,
        })
    }
}

fn validate_run_section(raw: RawRunSection) -> Result<RunSection> {
    validate_env(&raw.env)?;

    let timeout = match raw.timeout.as_deref() {
        Some(s) => Some(parse_duration(s).map_err(|e| {
            CodexError::ConfigError(format!("[run].timeout: {e}"))
        })?),
        None => None,
    };

    let fallback_exit_code = match raw.fallback_exit_code {
        Some(0) => {
            return Err(CodexError::ConfigError(
                "[run].fallback_exit_code must be non-zero (got 0)".to_string(),
            ));
        }
        Some(code) => code,
        None => DEFAULT_FALLBACK_EXIT_CODE,
    };

    Ok(RunSection {
        cwd: raw.cwd.filter(|p| !p.as_os_str().is_empty()),
        env: raw.env,
        timeout: timeout.filter(|d| !d.is_zero()),
        fallback_exit_code,
    })
}

fn validate_env(env: &[String]) -> Result<()> {
    for entry in env {
        split_env_entry(entry).map_err(|_| {
            CodexError::ConfigError(format!(
                "[run].env entry '{entry}' must have the form KEY=VALUE"
            ))
        })?;
    }
    Ok(())
}
