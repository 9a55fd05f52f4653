//! mangastore CLI entry point
//!
//! This is a minimal entrypoint that:
//! 1. Parses CLI arguments and dispatches (via cli::run)
//! 2. Logs the failure to stderr
//! 3. Exits with non-zero on failure
//!
//! All logic is delegated to the CLI module.

use mangastore::cli;
use mangastore::observability::Logger;

fn main() {
    if let Err(e) = cli::run() {
        let fields = [("code", e.code_str()), ("message", e.message())];
        if e.is_fatal() {
            Logger::fatal("COMMAND_FAILED", &fields);
        } else {
            Logger::error("COMMAND_FAILED", &fields);
        }
        std::process::exit(1);
    }
}
