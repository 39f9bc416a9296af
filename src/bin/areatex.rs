//! Generator for the SMAA area lookup tables.
//!
//! Writes the orthogonal and diagonal tables as Rust source, for
//! consumers that want the tables embedded instead of computed at
//! startup. The values match what the library computes at runtime.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;

use edgekit::antialias::areatex;

/// areatex - emit the SMAA area lookup tables as Rust source
#[derive(Parser)]
#[command(name = "areatex")]
#[command(about = "Generate the SMAA area lookup tables as Rust source")]
struct Cli {
    /// Quantize data to 256 levels
    #[arg(short = 'q', long = "quantize")]
    quantize: bool,

    /// Output file
    outfile: PathBuf,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    let file = match File::create(&cli.outfile) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Unable to open file: {}: {}", cli.outfile.display(), e);
            return ExitCode::from(1);
        }
    };

    eprintln!("Generating {}", cli.outfile.display());

    let mut writer = BufWriter::new(file);
    if let Err(e) = areatex::write_tables(&mut writer, cli.quantize) {
        eprintln!("Unable to write {}: {}", cli.outfile.display(), e);
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}
