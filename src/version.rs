// src/version.rs

//! Build metadata for `codex version`.
//!
//! Commit and build date are captured at compile time from the
//! `CODEX_COMMIT` and `CODEX_BUILD_DATE` environment variables, e.g.
//! `CODEX_COMMIT=$(git rev-parse --short HEAD) cargo build --release`.

use std::fmt;

/// Immutable version information, built once from compile-time constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub commit: &'static str,
    pub date: Option<&'static str>,
}

impl VersionInfo {
    pub const fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            commit: match option_env!("CODEX_COMMIT") {
                Some(commit) => commit,
                None => "unknown",
            },
            date: option_env!("CODEX_BUILD_DATE"),
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date {
            Some(date) if !date.is_empty() => {
                write!(f, "{} {} ({}, {})", self.name, self.version, self.commit, date)
            }
            _ => write!(f, "{} {} ({})", self.name, self.version, self.commit),
        }
    }
}
