//! `scouting-cfg` command-line entry point.

use std::process::ExitCode;

fn main() -> ExitCode {
    match scouting_cfg::cli::cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
