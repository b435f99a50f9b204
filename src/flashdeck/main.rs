//! # flashdeck binary
//!
//! The CLI lives in `cli/`; this file only invokes `cli::run()` and maps errors to
//! an exit code. See the library docs for the layering underneath.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
