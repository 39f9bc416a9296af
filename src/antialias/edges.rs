//! SMAA pass 1: edge detection.
//!
//! Classifies every pixel with two edge flags: channel 0 marks an edge
//! against the west neighbor, channel 1 against the north neighbor. Three
//! detectors are available (luminance, per-channel color, depth), and the
//! luminance/color variants apply local contrast adaptation so weak edges
//! next to much stronger ones are dropped. An optional predication input
//! lowers the threshold where a secondary signal (typically depth) shows
//! structure.

use rayon::prelude::*;

use crate::antialias::{AntiAliasingConfig, EdgeDetectMode};
use crate::buffer::{ConstantReader, Pixel, PixelBuffer, PixelReader, Rect};
use crate::color::luminance;

/// Per-direction thresholds lowered by the predication input.
///
/// Starts from `(1, 1)`, subtracts the predication strength on each axis
/// whose value delta crosses the predication threshold, then scales by
/// `pred_scale * threshold`.
fn predicated_threshold(
    cfg: &AntiAliasingConfig,
    value: &dyn PixelReader,
    x: i32,
    y: i32,
) -> [f32; 2] {
    let here = value.read(x, y);
    let left = value.read(x - 1, y);
    let top = value.read(x, y - 1);

    let mut threshold = [1.0f32, 1.0];
    if (here[0] - left[0]).abs() >= cfg.pred_threshold {
        threshold[0] -= cfg.pred_strength;
    }
    if (here[0] - top[0]).abs() >= cfg.pred_threshold {
        threshold[1] -= cfg.pred_strength;
    }

    let scale = cfg.pred_scale * cfg.threshold;
    [threshold[0] * scale, threshold[1] * scale]
}

fn thresholds(cfg: &AntiAliasingConfig, value: &dyn PixelReader, x: i32, y: i32) -> [f32; 2] {
    if cfg.predication {
        predicated_threshold(cfg, value, x, y)
    } else {
        [cfg.threshold, cfg.threshold]
    }
}

/// Largest per-channel difference between two colors (alpha ignored).
fn color_delta(a: &Pixel, b: &Pixel) -> f32 {
    (a[0] - b[0]).abs().max((a[1] - b[1]).abs()).max((a[2] - b[2]).abs())
}

fn luma_pixel(
    cfg: &AntiAliasingConfig,
    image: &dyn PixelReader,
    value: &dyn PixelReader,
    x: i32,
    y: i32,
) -> Pixel {
    let threshold = thresholds(cfg, value, x, y);

    let l = luminance(&image.read(x, y));
    let l_left = luminance(&image.read(x - 1, y));
    let l_top = luminance(&image.read(x, y - 1));
    let d_left = (l - l_left).abs();
    let d_top = (l - l_top).abs();

    let mut output = [
        if d_left >= threshold[0] { 1.0 } else { 0.0 },
        if d_top >= threshold[1] { 1.0 } else { 0.0 },
        0.0,
        1.0,
    ];
    if output[0] == 0.0 && output[1] == 0.0 {
        return output;
    }

    let d_right = (l - luminance(&image.read(x + 1, y))).abs();
    let d_bottom = (l - luminance(&image.read(x, y + 1))).abs();
    let d_leftleft = (l_left - luminance(&image.read(x - 2, y))).abs();
    let d_toptop = (l_top - luminance(&image.read(x, y - 2))).abs();

    let delta_x = d_left.max(d_right).max(d_leftleft);
    let delta_y = d_top.max(d_bottom).max(d_toptop);
    let final_delta = delta_x.max(delta_y);

    // Local contrast adaptation; a zero factor disables it.
    if cfg.adaptation_factor > 0.0 {
        if final_delta > cfg.adaptation_factor * d_left {
            output[0] = 0.0;
        }
        if final_delta > cfg.adaptation_factor * d_top {
            output[1] = 0.0;
        }
    }
    output
}

fn color_pixel(
    cfg: &AntiAliasingConfig,
    image: &dyn PixelReader,
    value: &dyn PixelReader,
    x: i32,
    y: i32,
) -> Pixel {
    let threshold = thresholds(cfg, value, x, y);

    let c = image.read(x, y);
    let c_left = image.read(x - 1, y);
    let c_top = image.read(x, y - 1);
    let d_left = color_delta(&c, &c_left);
    let d_top = color_delta(&c, &c_top);

    let mut output = [
        if d_left >= threshold[0] { 1.0 } else { 0.0 },
        if d_top >= threshold[1] { 1.0 } else { 0.0 },
        0.0,
        1.0,
    ];
    if output[0] == 0.0 && output[1] == 0.0 {
        return output;
    }

    let d_right = color_delta(&c, &image.read(x + 1, y));
    let d_bottom = color_delta(&c, &image.read(x, y + 1));
    let d_leftleft = color_delta(&c_left, &image.read(x - 2, y));
    let d_toptop = color_delta(&c_top, &image.read(x, y - 2));

    let delta_x = d_left.max(d_right).max(d_leftleft);
    let delta_y = d_top.max(d_bottom).max(d_toptop);
    let final_delta = delta_x.max(delta_y);

    if cfg.adaptation_factor > 0.0 {
        if final_delta > cfg.adaptation_factor * d_left {
            output[0] = 0.0;
        }
        if final_delta > cfg.adaptation_factor * d_top {
            output[1] = 0.0;
        }
    }
    output
}

fn depth_pixel(cfg: &AntiAliasingConfig, value: &dyn PixelReader, x: i32, y: i32) -> Pixel {
    let here = value.read(x, y);
    let left = value.read(x - 1, y);
    let top = value.read(x, y - 1);

    [
        if (here[0] - left[0]).abs() >= cfg.depth_threshold { 1.0 } else { 0.0 },
        if (here[0] - top[0]).abs() >= cfg.depth_threshold { 1.0 } else { 0.0 },
        0.0,
        1.0,
    ]
}

/// Detect edges over the whole image, producing the edge-flag buffer
/// consumed by the blending-weight pass.
///
/// # Arguments
///
/// * `cfg` - Detection variant, thresholds and predication settings
/// * `image` - The source image
/// * `value` - Auxiliary single-channel input: the depth image for
///   [`EdgeDetectMode::Depth`], the predication source otherwise. When
///   absent it behaves as a constant-zero input, so depth detection
///   finds no edges and predication lowers nothing.
///
/// # Returns
///
/// A buffer of the source dimensions with the west edge flag in
/// channel 0 and the north edge flag in channel 1, each 0 or 1.
pub fn edge_detection<R, V>(cfg: &AntiAliasingConfig, image: &R, value: Option<&V>) -> PixelBuffer
where
    R: PixelReader + Sync,
    V: PixelReader + Sync,
{
    let cfg = cfg.clamped();
    let width = image.width();
    let height = image.height();
    let mut out = PixelBuffer::new(width, height);
    if out.is_empty() {
        return out;
    }

    let fallback = ConstantReader::new(width, height, [0.0; 4]);

    out.data_mut()
        .par_chunks_mut(width as usize * 4)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i32;
            let aux: &dyn PixelReader = match value {
                Some(v) => v,
                None => &fallback,
            };
            for x in 0..width as i32 {
                let pixel = match cfg.detect {
                    EdgeDetectMode::Luma => luma_pixel(&cfg, image, aux, x, y),
                    EdgeDetectMode::Color => color_pixel(&cfg, image, aux, x, y),
                    EdgeDetectMode::Depth => depth_pixel(&cfg, aux, x, y),
                };
                row[x as usize * 4..x as usize * 4 + 4].copy_from_slice(&pixel);
            }
        });

    out
}

/// Input rectangle this pass reads to produce `output`.
///
/// # Returns
///
/// The output rectangle inflated by the detector's neighborhood: two
/// pixels west/north and one east/south, except the depth variant which
/// only looks one pixel west/north.
pub fn area_of_interest(cfg: &AntiAliasingConfig, output: Rect) -> Rect {
    match cfg.detect {
        EdgeDetectMode::Depth => output.expanded(1, 1, 0, 0),
        _ => output.expanded(2, 2, 1, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(v: f32) -> Pixel {
        [v, v, v, 1.0]
    }

    fn luma_config() -> AntiAliasingConfig {
        AntiAliasingConfig {
            detect: EdgeDetectMode::Luma,
            threshold: 0.1,
            adaptation_factor: 2.0,
            ..Default::default()
        }
    }

    fn detect(cfg: &AntiAliasingConfig, image: &PixelBuffer) -> PixelBuffer {
        edge_detection::<_, PixelBuffer>(cfg, image, None)
    }

    #[test]
    fn test_flat_image_has_no_edges() {
        let image = PixelBuffer::filled(6, 6, gray(0.4));
        let edges = detect(&luma_config(), &image);
        for y in 0..6 {
            for x in 0..6 {
                assert_eq!(edges.get(x, y), [0.0, 0.0, 0.0, 1.0]);
            }
        }
    }

    #[test]
    fn test_luma_step_vertical_boundary() {
        // 8x1 step: pixels 0-3 black, 4-7 white. Only pixel 4 has a west
        // edge; no pixel has a north edge.
        let mut image = PixelBuffer::new(8, 1);
        for x in 4..8 {
            image.set(x, 0, gray(1.0));
        }

        let edges = detect(&luma_config(), &image);
        for x in 0..8 {
            let e = edges.get(x, 0);
            assert_eq!(e[0], if x == 4 { 1.0 } else { 0.0 }, "west flag at x={}", x);
            assert_eq!(e[1], 0.0, "north flag at x={}", x);
        }
    }

    #[test]
    fn test_luma_step_horizontal_boundary() {
        let mut image = PixelBuffer::new(1, 8);
        for y in 4..8 {
            image.set(0, y, gray(1.0));
        }

        let edges = detect(&luma_config(), &image);
        for y in 0..8 {
            let e = edges.get(0, y);
            assert_eq!(e[1], if y == 4 { 1.0 } else { 0.0 }, "north flag at y={}", y);
            assert_eq!(e[0], 0.0, "west flag at y={}", y);
        }
    }

    #[test]
    fn test_color_detects_chroma_only_edge() {
        // Red and green with identical luminance-ish magnitude: the color
        // detector keys on the largest channel delta, which is 1.0 here.
        let mut image = PixelBuffer::filled(4, 1, [1.0, 0.0, 0.0, 1.0]);
        image.set(2, 0, [0.0, 1.0, 0.0, 1.0]);
        image.set(3, 0, [0.0, 1.0, 0.0, 1.0]);

        let cfg = AntiAliasingConfig {
            detect: EdgeDetectMode::Color,
            threshold: 0.5,
            adaptation_factor: 2.0,
            ..Default::default()
        };
        let edges = detect(&cfg, &image);
        assert_eq!(edges.get(2, 0)[0], 1.0);
        assert_eq!(edges.get(1, 0)[0], 0.0);
    }

    #[test]
    fn test_depth_single_raised_pixel() {
        // 4x4 depth image, all 0.1 except (2,2) = 0.5. The raised pixel
        // has west and north edges; (3,2) and (2,3) see it as their own
        // west/north neighbor.
        let mut depth = PixelBuffer::filled(4, 4, gray(0.1));
        depth.set(2, 2, gray(0.5));

        let cfg = AntiAliasingConfig {
            detect: EdgeDetectMode::Depth,
            depth_threshold: 0.1,
            ..Default::default()
        };
        let dummy = PixelBuffer::new(4, 4);
        let edges = edge_detection(&cfg, &dummy, Some(&depth));

        assert_eq!(edges.get(2, 2), [1.0, 1.0, 0.0, 1.0]);
        assert_eq!(edges.get(3, 2)[0], 1.0);
        assert_eq!(edges.get(3, 2)[1], 0.0);
        assert_eq!(edges.get(2, 3)[1], 1.0);
        assert_eq!(edges.get(2, 3)[0], 0.0);

        for y in 0..4 {
            for x in 0..4 {
                if (x, y) == (2, 2) || (x, y) == (3, 2) || (x, y) == (2, 3) {
                    continue;
                }
                assert_eq!(edges.get(x, y)[0], 0.0, "({}, {})", x, y);
                assert_eq!(edges.get(x, y)[1], 0.0, "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_depth_without_aux_input_is_silent() {
        let image = PixelBuffer::filled(4, 4, gray(0.9));
        let cfg = AntiAliasingConfig { detect: EdgeDetectMode::Depth, ..Default::default() };
        let edges = detect(&cfg, &image);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(edges.get(x, y)[0], 0.0);
                assert_eq!(edges.get(x, y)[1], 0.0);
            }
        }
    }

    #[test]
    fn test_contrast_adaptation_suppresses_weak_edge() {
        // 0.0 | 0.12 | 1.0 ...: the weak step at x=1 sits right next to
        // the much stronger step at x=2, so adaptation drops it.
        let mut image = PixelBuffer::new(8, 1);
        image.set(1, 0, gray(0.12));
        for x in 2..8 {
            image.set(x, 0, gray(1.0));
        }

        let adaptive = luma_config();
        let edges = detect(&adaptive, &image);
        assert_eq!(edges.get(1, 0)[0], 0.0, "weak edge should be suppressed");
        assert_eq!(edges.get(2, 0)[0], 1.0, "strong edge survives");

        // With a huge adaptation factor the weak edge stays.
        let lax = AntiAliasingConfig { adaptation_factor: 100.0, ..luma_config() };
        let edges = detect(&lax, &image);
        assert_eq!(edges.get(1, 0)[0], 1.0);
    }

    #[test]
    fn test_predication_lowers_threshold() {
        // A step of 0.08 against threshold 0.05: without predication the
        // scaled threshold (pred off => plain 0.05) detects it, and with
        // predication but a flat aux input the threshold doubles
        // (pred_scale * threshold) and the edge disappears. With aux
        // structure at the same place the threshold drops again.
        let mut image = PixelBuffer::new(8, 1);
        for x in 4..8 {
            image.set(x, 0, gray(0.08));
        }

        let base = AntiAliasingConfig {
            detect: EdgeDetectMode::Luma,
            threshold: 0.05,
            adaptation_factor: 0.0,
            ..Default::default()
        };
        let edges = detect(&base, &image);
        assert_eq!(edges.get(4, 0)[0], 1.0);

        let pred = AntiAliasingConfig { predication: true, ..base.clone() };
        let flat_aux = PixelBuffer::new(8, 1);
        let edges = edge_detection(&pred, &image, Some(&flat_aux));
        assert_eq!(edges.get(4, 0)[0], 0.0, "flat predication raises the threshold");

        let mut aux = PixelBuffer::new(8, 1);
        for x in 4..8 {
            aux.set(x, 0, gray(1.0));
        }
        let edges = edge_detection(&pred, &image, Some(&aux));
        assert_eq!(edges.get(4, 0)[0], 1.0, "aux structure lowers the threshold");
    }

    #[test]
    fn test_area_of_interest() {
        let cfg = luma_config();
        let r = area_of_interest(&cfg, Rect::new(0, 0, 10, 10));
        assert_eq!(r, Rect::new(-2, -2, 11, 11));

        let depth = AntiAliasingConfig { detect: EdgeDetectMode::Depth, ..Default::default() };
        let r = area_of_interest(&depth, Rect::new(0, 0, 10, 10));
        assert_eq!(r, Rect::new(-1, -1, 10, 10));
    }

    #[test]
    fn test_zero_area_image_is_noop() {
        let image = PixelBuffer::new(0, 5);
        let edges = detect(&luma_config(), &image);
        assert!(edges.is_empty());
    }
}
