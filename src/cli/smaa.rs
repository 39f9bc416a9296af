//! The `smaa` command: antialias a PNG image.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::antialias::{
    blending_weights, edge_detection, neighborhood_blending, AntiAliasingConfig, EdgeDetectMode,
};
use crate::cli::{EXIT_ERROR, EXIT_SUCCESS};
use crate::output::{load_png, save_png};

/// Default output path: `{input}_smaa.png` next to the input.
fn default_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("out");
    input.with_file_name(format!("{}_smaa.png", stem))
}

#[allow(clippy::too_many_arguments)]
pub fn run_smaa(
    input: &Path,
    output: Option<&Path>,
    aux: Option<&Path>,
    detect: EdgeDetectMode,
    threshold: f32,
    depth_threshold: f32,
    adaptation: f32,
    predication: bool,
    no_diag: bool,
    no_corner: bool,
    rounding: u32,
    search_steps: i32,
    search_steps_diag: i32,
    keep_passes: bool,
) -> ExitCode {
    let cfg = AntiAliasingConfig {
        detect,
        threshold,
        depth_threshold,
        adaptation_factor: adaptation,
        predication,
        diag_detection: !no_diag,
        corner_detection: !no_corner,
        corner_rounding: rounding,
        search_steps,
        search_steps_diag,
        ..Default::default()
    };

    let image = match load_png(input) {
        Ok(buf) => buf,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let aux_buffer = match aux {
        Some(path) => match load_png(path) {
            Ok(buf) => Some(buf),
            Err(e) => {
                eprintln!("Error: cannot read {}: {}", path.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        },
        None => None,
    };

    let out_path = output.map(Path::to_path_buf).unwrap_or_else(|| default_output(input));

    let edges = edge_detection(&cfg, &image, aux_buffer.as_ref());
    let weights = blending_weights(&cfg, &edges);
    let blended = neighborhood_blending(&image, &weights);

    if keep_passes {
        let stem = out_path.file_stem().and_then(|s| s.to_str()).unwrap_or("out").to_string();
        let edges_path = out_path.with_file_name(format!("{}_edges.png", stem));
        let weights_path = out_path.with_file_name(format!("{}_weights.png", stem));
        for (buf, path) in [(&edges, &edges_path), (&weights, &weights_path)] {
            if let Err(e) = save_png(buf, path) {
                eprintln!("Error: cannot write {}: {}", path.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
        println!("Wrote {} and {}", edges_path.display(), weights_path.display());
    }

    if let Err(e) = save_png(&blended, &out_path) {
        eprintln!("Error: cannot write {}: {}", out_path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!("Wrote {}", out_path.display());
    ExitCode::from(EXIT_SUCCESS)
}
