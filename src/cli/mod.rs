//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for the filter commands.

mod distance;
mod smaa;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::antialias::EdgeDetectMode;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;

/// Edgekit - CPU image filters for PNG images
#[derive(Parser)]
#[command(name = "edgekit")]
#[command(about = "Edgekit - SMAA antialiasing and distance transforms for PNG images")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Antialias an image with SMAA 1x
    Smaa {
        /// Input PNG image
        input: PathBuf,

        /// Output file (default: {input}_smaa.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Auxiliary single-channel PNG (depth image or predication
        /// source, read from the red channel)
        #[arg(long)]
        aux: Option<PathBuf>,

        /// Edge detection variant
        #[arg(long, value_enum, default_value_t = EdgeDetectMode::Color)]
        detect: EdgeDetectMode,

        /// Edge detection threshold
        #[arg(long, default_value = "0.05")]
        threshold: f32,

        /// Threshold for depth edge detection
        #[arg(long, default_value = "0.1")]
        depth_threshold: f32,

        /// Local contrast adaptation factor (0 disables)
        #[arg(long, default_value = "2.0")]
        adaptation: f32,

        /// Lower the threshold where the aux input shows structure
        #[arg(long)]
        predication: bool,

        /// Disable diagonal pattern processing
        #[arg(long)]
        no_diag: bool,

        /// Disable corner sharpening
        #[arg(long)]
        no_corner: bool,

        /// Corner rounding in percent (0-100)
        #[arg(long, default_value = "25")]
        rounding: u32,

        /// Orthogonal search steps (1-98)
        #[arg(long, default_value = "16")]
        search_steps: i32,

        /// Diagonal search steps (1-20)
        #[arg(long, default_value = "8")]
        search_steps_diag: i32,

        /// Write the intermediate edge and weight images next to the
        /// output (for debugging)
        #[arg(long)]
        keep_passes: bool,
    },
    /// Compute the Euclidean distance transform of a mask
    Distance {
        /// Input PNG mask (read from the red channel)
        input: PathBuf,

        /// Output file (default: {input}_distance.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Mask threshold; a pixel is inside iff value >= threshold
        #[arg(long, default_value = "0.5")]
        threshold: f32,

        /// Swap inside and outside
        #[arg(long)]
        invert: bool,

        /// Scale distances relative to the image size
        #[arg(long)]
        relative: bool,

        /// Also encode the vector to the nearest boundary (green/blue
        /// channels, 0.5-centered)
        #[arg(long)]
        vectors: bool,

        /// Write raw distances instead of normalizing to the maximum
        #[arg(long)]
        raw: bool,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Smaa {
            input,
            output,
            aux,
            detect,
            threshold,
            depth_threshold,
            adaptation,
            predication,
            no_diag,
            no_corner,
            rounding,
            search_steps,
            search_steps_diag,
            keep_passes,
        } => smaa::run_smaa(
            &input,
            output.as_deref(),
            aux.as_deref(),
            detect,
            threshold,
            depth_threshold,
            adaptation,
            predication,
            no_diag,
            no_corner,
            rounding,
            search_steps,
            search_steps_diag,
            keep_passes,
        ),
        Commands::Distance { input, output, threshold, invert, relative, vectors, raw } => {
            distance::run_distance(&input, output.as_deref(), threshold, invert, relative, vectors, raw)
        }
    }
}
