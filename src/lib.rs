// src/lib.rs

pub mod agent;
pub mod cli;
pub mod config;
pub mod console;
pub mod duration;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod mcp;
pub mod protocol;
pub mod version;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::{CliArgs, Command, ServeAction};
use crate::config::load_optional;
use crate::errors::CodexError;
use crate::exec::{ExecScope, LocalRunner};
use crate::version::VersionInfo;

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - config loading
/// - the local runner and the console consumer (`run`)
/// - the stdio protocol loops (`mcp serve`, `agent serve`)
/// - Ctrl-C / SIGTERM handling
pub async fn run(args: CliArgs) -> Result<i32> {
    match args.command {
        Command::Version => {
            println!("{}", VersionInfo::current());
            Ok(0)
        }
        Command::Run { ref argv } => run_command(&args, argv).await,
        Command::Mcp {
            action: ServeAction::Serve,
        } => {
            let root = shutdown_token();
            let session = ExecScope::derive(&root, args.timeout.filter(|d| !d.is_zero()));
            mcp::serve(
                session.token(),
                BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
            )
            .await
            .context("mcp serve error")?;
            Ok(0)
        }
        Command::Agent {
            action: ServeAction::Serve,
        } => {
            let root = shutdown_token();
            let session = ExecScope::derive(&root, args.timeout.filter(|d| !d.is_zero()));
            agent::serve(
                session.token(),
                BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
            )
            .await
            .context("agent serve error")?;
            Ok(0)
        }
    }
}

async fn run_command(args: &CliArgs, argv: &[String]) -> Result<i32> {
    let cfg = load_optional(args.config.as_deref())
        .with_context(|| format!("loading config {:?}", args.config))?;

    let options = cfg
        .run
        .to_exec_options(args.cwd.clone(), &args.env, args.timeout, ambient_env());
    let runner = LocalRunner::new().with_fallback_exit_code(cfg.run.fallback_exit_code);

    info!(?argv, cwd = ?options.cwd, timeout = ?options.timeout, "running command");

    let root = shutdown_token();
    let mut stdout = tokio::io::stdout();
    let mut stderr = tokio::io::stderr();

    match console::run_command(&runner, &root, argv, &options, &mut stdout, &mut stderr).await {
        Ok(code) => Ok(code),
        Err(err @ (CodexError::Launch { .. } | CodexError::InvalidEnv(_))) => {
            eprintln!("run start error: {err}");
            Ok(1)
        }
        Err(err) => Err(err.into()),
    }
}

/// The caller's environment as `KEY=VALUE` entries, skipping non-UTF-8 ones.
fn ambient_env() -> Vec<String> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some(format!("{}={}", k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Root cancellation scope, cancelled on Ctrl-C or SIGTERM.
fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let tx = token.clone();

    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        debug!("shutdown signal received; cancelling root scope");
        tx.cancel();
    });

    token
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            eprintln!("failed to listen for SIGTERM: {e}");
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
            return;
        }
    };

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                eprintln!("failed to listen for Ctrl+C: {e}");
                term.recv().await;
            }
        }
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
