//! Sublim CLI - production tracking for a garment customization shop

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = sublim_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
