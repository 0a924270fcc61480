// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::duration::parse_duration;
use crate::exec::options::split_env_entry;

/// Command-line arguments for `codex`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "codex",
    version,
    about = "Run commands with streamed output and serve minimal JSON stdio protocols.",
    long_about = None
)]
pub struct CliArgs {
    /// Working directory for launched commands.
    #[arg(long, global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Set an environment variable for launched commands (repeatable).
    #[arg(long = "env", global = true, value_name = "KEY=VALUE", value_parser = parse_env_arg)]
    pub env: Vec<String>,

    /// Timeout for command execution or a serve session (e.g. 30s, 5m).
    #[arg(long, global = true, value_name = "DURATION", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Optional TOML config file with `[run]` defaults.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CODEX_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print version information.
    Version,

    /// Run a command and stream its output: `codex run -- <cmd...>`.
    Run {
        #[arg(
            required = true,
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "CMD"
        )]
        argv: Vec<String>,
    },

    /// Minimal ping/echo handler over stdio.
    Mcp {
        #[command(subcommand)]
        action: ServeAction,
    },

    /// Line-delimited submission/event protocol over stdio.
    Agent {
        #[command(subcommand)]
        action: ServeAction,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum ServeAction {
    /// Read requests from stdin and write replies to stdout until EOF.
    Serve,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_env_arg(s: &str) -> Result<String, String> {
    split_env_entry(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
