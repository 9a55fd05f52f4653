//! CLI module for mangastore
//!
//! One-shot commands over a catalog directory. Each command prints a single
//! JSON object on stdout; logs go to stderr.

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{run, run_command, RecordPatch};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};
