//! Quill CLI library.
//!
//! Configuration, session persistence, command execution and output
//! formatting for the `quill` command-line tool.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod session;

pub use cli::{Cli, Command};
pub use config::QuillConfig;
pub use error::{CliError, Result};
pub use output::Formatter;
