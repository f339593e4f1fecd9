use std::process::ExitCode;

use genmanifest::cli;

fn main() -> ExitCode {
    match cli::run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // `{:#}` renders the whole context chain on one line.
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
