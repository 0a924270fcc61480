// src/exec/mod.rs

//! Process execution layer.
//!
//! This module spawns external commands and turns their output into a single
//! stream of [`Event`]s.
//!
//! - [`event`] defines `Event` and the `EventFeed` consumers read from.
//! - [`options`] holds the launch configuration (`ExecOptions`).
//! - [`runner`] provides the `Runner` trait and the `Execution` handle.
//! - [`local`] is the `tokio::process` implementation (`LocalRunner`).
//! - [`scope`] derives per-execution cancellation scopes (timeouts, cancel).
//! - [`decode`] turns pipe chunks into text without splitting characters.

pub mod decode;
pub mod event;
pub mod local;
pub mod options;
pub mod runner;
pub mod scope;

pub use event::{Event, EventFeed, stderr_text, stdout_text};
pub use local::LocalRunner;
pub use options::ExecOptions;
pub use runner::{Execution, Runner};
pub use scope::{CancelHandle, ExecScope};
