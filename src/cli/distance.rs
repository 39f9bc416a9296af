//! The `distance` command: Euclidean distance transform of a PNG mask.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::buffer::PixelBuffer;
use crate::cli::{EXIT_ERROR, EXIT_SUCCESS};
use crate::distance::{distance_transform, DistanceField, DistanceTransformConfig};
use crate::output::{load_png, save_png};

fn default_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("out");
    input.with_file_name(format!("{}_distance.png", stem))
}

/// Render the field into a displayable buffer.
///
/// Distances map to gray (normalized by the maximum finite distance
/// unless `raw`); with `vectors` the displacement goes into the
/// green/blue channels, centered on 0.5 and scaled by the image size.
fn render(field: &DistanceField, vectors: bool, raw: bool) -> PixelBuffer {
    let scale = if raw {
        1.0
    } else {
        match field.max_finite_distance() {
            Some(max) if max > 0.0 => 1.0 / max,
            _ => 1.0,
        }
    };

    let mut out = PixelBuffer::new(field.width(), field.height());
    let span_x = 2.0 * field.width() as f32;
    let span_y = 2.0 * field.height() as f32;

    for y in 0..field.height() {
        for x in 0..field.width() {
            let [d, vx, vy] = field.sample(x, y);
            let gray = if d >= f32::MAX { 1.0 } else { (d * scale).clamp(0.0, 1.0) };
            let pixel = if vectors {
                [
                    gray,
                    0.5 + vx / field.factor() / span_x,
                    0.5 + vy / field.factor() / span_y,
                    1.0,
                ]
            } else {
                [gray, gray, gray, 1.0]
            };
            out.set(x, y, pixel);
        }
    }
    out
}

pub fn run_distance(
    input: &Path,
    output: Option<&Path>,
    threshold: f32,
    invert: bool,
    relative: bool,
    vectors: bool,
    raw: bool,
) -> ExitCode {
    let cfg = DistanceTransformConfig { threshold, invert, relative };

    let mask = match load_png(input) {
        Ok(buf) => buf,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let field = match distance_transform(&cfg, &mask) {
        Ok(field) => field,
        Err(e) => {
            eprintln!("Error: distance transform failed: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let out_path = output.map(Path::to_path_buf).unwrap_or_else(|| default_output(input));
    let rendered = render(&field, vectors, raw);
    if let Err(e) = save_png(&rendered, &out_path) {
        eprintln!("Error: cannot write {}: {}", out_path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!("Wrote {}", out_path.display());
    ExitCode::from(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_normalizes_distances() {
        let mut mask = PixelBuffer::filled(4, 1, [1.0; 4]);
        mask.set(0, 0, [0.0, 0.0, 0.0, 1.0]);
        let field = distance_transform(&DistanceTransformConfig::default(), &mask).unwrap();

        let rendered = render(&field, false, false);
        // Farthest pixel normalizes to 1, the outside pixel to 0.
        assert_eq!(rendered.get(0, 0)[0], 0.0);
        assert!((rendered.get(3, 0)[0] - 1.0).abs() < 1e-6);
        // Mid pixels scale linearly.
        assert!((rendered.get(1, 0)[0] - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_render_saturated_field_is_white() {
        let mask = PixelBuffer::filled(3, 3, [1.0; 4]);
        let field = distance_transform(&DistanceTransformConfig::default(), &mask).unwrap();
        let rendered = render(&field, false, false);
        assert_eq!(rendered.get(1, 1)[0], 1.0);
    }

    #[test]
    fn test_render_vector_channels_centered() {
        let mut mask = PixelBuffer::filled(4, 4, [1.0; 4]);
        mask.set(0, 0, [0.0, 0.0, 0.0, 1.0]);
        let field = distance_transform(&DistanceTransformConfig::default(), &mask).unwrap();

        let rendered = render(&field, true, false);
        // The outside pixel has a zero vector: both channels at 0.5.
        assert!((rendered.get(0, 0)[1] - 0.5).abs() < 1e-6);
        assert!((rendered.get(0, 0)[2] - 0.5).abs() < 1e-6);
        // A pixel right of the boundary points left: green below 0.5.
        assert!(rendered.get(3, 0)[1] < 0.5);
    }
}
