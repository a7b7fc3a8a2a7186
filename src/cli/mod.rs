//! CLI layer: command table, argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod dispatch;
pub mod error;
pub mod output;

pub use args::{build_cli, CommandSpec, COMMANDS};
pub use dispatch::{Dispatcher, Invocation, Locations, Outcome};
pub use error::{CliError, CliResult};
