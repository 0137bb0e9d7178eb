//! orderdesk CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`. Errors are
//! printed to stderr and exit non-zero.

use orderdesk::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
