//! Edgekit - command-line tool for SMAA antialiasing and distance
//! transforms on PNG images

use std::process::ExitCode;

use edgekit::cli;

fn main() -> ExitCode {
    cli::run()
}
