use clap::Parser;
use colored::Colorize;

mod commands;
pub mod core;
pub mod error;
pub mod util;

use crate::commands::roost::Roost;

/// Parses the command line and runs the requested command, producing the
/// process exit code.
pub fn run() -> u8 {
    let app = Roost::parse();
    match app.exec() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}: {}", "error".red(), e);
            101
        }
    }
}
