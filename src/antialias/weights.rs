//! SMAA pass 2: blending-weight calculation.
//!
//! For every pixel flagged by edge detection, this pass walks along the
//! edge line in both directions, classifies the shape of the two line
//! ends from their crossing edges, and fetches the blending areas from
//! the precomputed tables. Diagonal lines are handled first and take
//! priority; orthogonal lines can additionally have their corners
//! sharpened by the corner-rounding fix-up.
//!
//! Output channels are `(top, right, bottom, left)` contributions for the
//! current pixel. A pixel whose edge flags are zero keeps zero weights.

use rayon::prelude::*;

use crate::antialias::areatex::{AreaTex, DIAG, MAX_DISTANCE, MAX_DISTANCE_DIAG, ORTHO};
use crate::antialias::AntiAliasingConfig;
use crate::buffer::{sample_offset_x, sample_offset_y, Pixel, PixelBuffer, PixelReader, Rect};

struct Kernel<'a, R: PixelReader> {
    cfg: &'a AntiAliasingConfig,
    edges: &'a R,
    ortho_tex: &'a AreaTex,
    diag_tex: &'a AreaTex,
}

impl<'a, R: PixelReader> Kernel<'a, R> {
    /// March diagonally (NE/SW) while the diagonal keeps both edge flags
    /// set. Returns the distance walked, the north-edge value at the stop
    /// sample, and whether the line end was found within the search range.
    fn search_diag1(&self, mut x: i32, mut y: i32, dx: i32, dy: i32) -> (i32, f32, bool) {
        let mut d = -1;
        let mut found = false;
        let mut e = [0.0f32; 4];

        while d < self.cfg.search_steps_diag - 1 {
            x += dx;
            y += dy;
            d += 1;
            e = self.edges.read(x, y);
            if e[0] <= 0.9 || e[1] <= 0.9 {
                found = true;
                break;
            }
        }

        (d, e[1], found)
    }

    /// March diagonally (NW/SE); the line is carried by the west flag of
    /// the right neighbor together with the north flag of the diagonal.
    fn search_diag2(&self, mut x: i32, mut y: i32, dx: i32, dy: i32) -> (i32, f32, bool) {
        let mut d = -1;
        let mut found = false;
        let mut e2 = [0.0f32; 4];

        while d < self.cfg.search_steps_diag - 1 {
            x += dx;
            y += dy;
            d += 1;
            let e1 = self.edges.read(x + 1, y);
            e2 = self.edges.read(x, y);
            if e1[0] <= 0.9 || e2[1] <= 0.9 {
                found = true;
                break;
            }
        }

        (d, e2[1], found)
    }

    fn area_diag(&self, d1: i32, d2: i32, e1: i32, e2: i32) -> [f32; 2] {
        let x = (MAX_DISTANCE_DIAG * e1 + d1) as f32 + 0.5;
        let y = (MAX_DISTANCE_DIAG * e2 + d2) as f32 + 0.5;
        self.diag_tex.sample(x, y)
    }

    /// Search for diagonal patterns through `(x, y)` and return their
    /// summed weights, or zero if no diagonal qualifies.
    fn diag_weights(&self, x: i32, y: i32, e: &Pixel) -> [f32; 2] {
        let mut weights = [0.0f32; 2];

        // Line along (-1, 1) / (1, -1).
        let (d1, d1_found) = if e[0] > 0.0 {
            let (d, end, found) = self.search_diag1(x, y, -1, 1);
            (d + end as i32, found)
        } else {
            (0, true)
        };
        let (d2, _, d2_found) = self.search_diag1(x, y, 1, -1);

        if d1 + d2 > 2 {
            let mut e1 = 0;
            let mut e2 = 0;

            if d1_found {
                // Crossing edges at the lower-left end, merged into a
                // two-bit code.
                let (cx, cy) = (x - d1, y + d1);
                let c0 = self.edges.read(cx - 1, cy)[1] as i32;
                let c1 = self.edges.read(cx, cy)[0] as i32;
                e1 = 2 * c0 + c1;
            }
            if d2_found {
                let (cx, cy) = (x + d2, y - d2);
                let c0 = self.edges.read(cx + 1, cy)[1] as i32;
                let c1 = self.edges.read(cx + 1, cy - 1)[0] as i32;
                e2 = 2 * c0 + c1;
            }

            weights = self.area_diag(d1, d2, e1, e2);
        }

        // Line along (-1, -1) / (1, 1).
        let (d1, _, d1_found) = self.search_diag2(x, y, -1, -1);
        let (d2, d2_found) = if self.edges.read(x + 1, y)[0] > 0.0 {
            let (d, end, found) = self.search_diag2(x, y, 1, 1);
            (d + end as i32, found)
        } else {
            (0, true)
        };

        if d1 + d2 > 2 {
            let mut e1 = 0;
            let mut e2 = 0;

            if d1_found {
                let (cx, cy) = (x - d1, y - d1);
                let c0 = self.edges.read(cx - 1, cy)[1] as i32;
                let c1 = self.edges.read(cx, cy - 1)[0] as i32;
                e1 = 2 * c0 + c1;
            }
            if d2_found {
                let (cx, cy) = (x + d2, y + d2);
                let end_edges = self.edges.read(cx + 1, cy);
                let c0 = end_edges[1] as i32;
                let c1 = end_edges[0] as i32;
                e2 = 2 * c0 + c1;
            }

            let w = self.area_diag(d1, d2, e1, e2);
            weights[0] += w[1];
            weights[1] += w[0];
        }

        weights
    }

    /// A vertical search is pointless when a diagonal line emanating from
    /// the left neighbor already covers this pixel; the diagonal pass of
    /// that pixel produced the weights.
    fn vertical_search_unneeded(&self, x: i32, y: i32) -> bool {
        let d1 = if self.edges.read(x - 1, y)[1] > 0.0 {
            self.search_diag2(x - 1, y, -1, -1).0
        } else {
            0
        };
        let d2 = self.search_diag2(x - 1, y, 1, 1).0;

        d1 + d2 > 2
    }

    /// Walk west while the north edge continues and no crossing west edge
    /// breaks the line (checked on the current row and one row above).
    fn search_x_left(&self, mut x: i32, y: i32) -> i32 {
        let end = x - 2 * self.cfg.search_steps;

        while x >= end {
            let e = self.edges.read(x, y);
            if e[1] == 0.0 || e[0] != 0.0 {
                break;
            }
            let e = self.edges.read(x, y - 1);
            if e[0] != 0.0 {
                break;
            }
            x -= 1;
        }

        x
    }

    fn search_x_right(&self, mut x: i32, y: i32) -> i32 {
        let end = x + 2 * self.cfg.search_steps;

        while x <= end {
            let e = self.edges.read(x + 1, y);
            if e[1] == 0.0 || e[0] != 0.0 {
                break;
            }
            let e = self.edges.read(x + 1, y - 1);
            if e[0] != 0.0 {
                break;
            }
            x += 1;
        }

        x
    }

    fn search_y_up(&self, x: i32, mut y: i32) -> i32 {
        let end = y - 2 * self.cfg.search_steps;

        while y >= end {
            let e = self.edges.read(x, y);
            if e[0] == 0.0 || e[1] != 0.0 {
                break;
            }
            let e = self.edges.read(x - 1, y);
            if e[1] != 0.0 {
                break;
            }
            y -= 1;
        }

        y
    }

    fn search_y_down(&self, x: i32, mut y: i32) -> i32 {
        let end = y + 2 * self.cfg.search_steps;

        while y <= end {
            let e = self.edges.read(x, y + 1);
            if e[0] == 0.0 || e[1] != 0.0 {
                break;
            }
            let e = self.edges.read(x - 1, y + 1);
            if e[1] != 0.0 {
                break;
            }
            y += 1;
        }

        y
    }

    /// Orthogonal area lookup. The table compresses distances
    /// quadratically, hence the square-rooted distances; the crossing
    /// values come from bilinear fetches at -0.25 and map to the slot
    /// codes 0, 1, 3, 4.
    fn area(&self, sqrt_d: [f32; 2], e1: f32, e2: f32) -> [f32; 2] {
        let x = MAX_DISTANCE as f32 * (4.0 * e1).round() + sqrt_d[0] + 0.5;
        let y = MAX_DISTANCE as f32 * (4.0 * e2).round() + sqrt_d[1] + 0.5;
        self.ortho_tex.sample(x, y)
    }

    /// Reduce blending near the crossing ends of a horizontal line so
    /// sharp corners keep their shape.
    fn horizontal_corner(&self, weights: &mut [f32; 2], left: i32, right: i32, y: i32, d: [i32; 2]) {
        let mut factor = [1.0f32, 1.0];
        let mut rounding = 1.0 - self.cfg.corner_rounding as f32 / 100.0;

        // Pixels in the center of a line get half the reduction.
        if d[0] == d[1] {
            rounding /= 2.0;
        }

        // Near the left corner.
        if d[0] <= d[1] {
            factor[0] -= rounding * self.edges.read(left, y + 1)[0];
            factor[1] -= rounding * self.edges.read(left, y - 2)[0];
        }
        // Near the right corner.
        if d[0] >= d[1] {
            factor[0] -= rounding * self.edges.read(right + 1, y + 1)[0];
            factor[1] -= rounding * self.edges.read(right + 1, y - 2)[0];
        }

        weights[0] *= factor[0].clamp(0.0, 1.0);
        weights[1] *= factor[1].clamp(0.0, 1.0);
    }

    fn vertical_corner(&self, weights: &mut [f32; 2], x: i32, top: i32, bottom: i32, d: [i32; 2]) {
        let mut factor = [1.0f32, 1.0];
        let mut rounding = 1.0 - self.cfg.corner_rounding as f32 / 100.0;

        if d[0] == d[1] {
            rounding /= 2.0;
        }

        if d[0] <= d[1] {
            factor[0] -= rounding * self.edges.read(x + 1, top)[1];
            factor[1] -= rounding * self.edges.read(x - 2, top)[1];
        }
        if d[0] >= d[1] {
            factor[0] -= rounding * self.edges.read(x + 1, bottom + 1)[1];
            factor[1] -= rounding * self.edges.read(x - 2, bottom + 1)[1];
        }

        weights[0] *= factor[0].clamp(0.0, 1.0);
        weights[1] *= factor[1].clamp(0.0, 1.0);
    }

    fn execute(&self, x: i32, y: i32) -> Pixel {
        let mut output = [0.0f32; 4];
        let e = self.edges.read(x, y);

        // Edge at north.
        if e[1] > 0.0 {
            if self.cfg.diag_detection {
                // Diagonals carry both flags, so one boundary suffices to
                // find them; a found diagonal replaces the orthogonal
                // processing entirely.
                let w = self.diag_weights(x, y, &e);
                if w != [0.0, 0.0] {
                    output[0] = w[0];
                    output[1] = w[1];
                    return output;
                }
            }

            let left = self.search_x_left(x, y);
            let right = self.search_x_right(x, y);
            let d = [(left - x).abs(), (right - x).abs()];

            // Crossing edges at both ends, fetched bilinearly at -0.25 so
            // the two stacked flags map to distinct codes.
            let e1 = sample_offset_y(self.edges, left, y, -0.25)[0];
            let e2 = sample_offset_y(self.edges, right + 1, y, -0.25)[0];

            let sqrt_d = [(d[0] as f32).sqrt(), (d[1] as f32).sqrt()];
            let mut w = self.area(sqrt_d, e1, e2);

            if self.cfg.corner_detection {
                self.horizontal_corner(&mut w, left, right, y, d);
            }

            output[0] = w[0];
            output[1] = w[1];
        }

        // Edge at west.
        if e[0] > 0.0 {
            if self.cfg.diag_detection && self.vertical_search_unneeded(x, y) {
                return output;
            }

            let top = self.search_y_up(x, y);
            let bottom = self.search_y_down(x, y);
            let d = [(top - y).abs(), (bottom - y).abs()];

            let e1 = sample_offset_x(self.edges, x, top, -0.25)[1];
            let e2 = sample_offset_x(self.edges, x, bottom + 1, -0.25)[1];

            let sqrt_d = [(d[0] as f32).sqrt(), (d[1] as f32).sqrt()];
            let mut w = self.area(sqrt_d, e1, e2);

            if self.cfg.corner_detection {
                self.vertical_corner(&mut w, x, top, bottom, d);
            }

            output[2] = w[0];
            output[3] = w[1];
        }

        output
    }
}

/// Calculate blending weights for an edge image.
///
/// # Arguments
///
/// * `cfg` - Search ranges, diagonal and corner processing settings
/// * `edges` - The edge-flag image from the detection pass
///
/// # Returns
///
/// A buffer of the same dimensions with `(top, right, bottom, left)`
/// blending weights per pixel, each in `[0, 1]`. Pixels without edge
/// flags keep zero weights.
pub fn blending_weights<R>(cfg: &AntiAliasingConfig, edges: &R) -> PixelBuffer
where
    R: PixelReader + Sync,
{
    let cfg = cfg.clamped();
    let width = edges.width();
    let height = edges.height();
    let mut out = PixelBuffer::new(width, height);
    if out.is_empty() {
        return out;
    }

    let kernel = Kernel { cfg: &cfg, edges, ortho_tex: &*ORTHO, diag_tex: &*DIAG };

    out.data_mut()
        .par_chunks_mut(width as usize * 4)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i32;
            for x in 0..width as i32 {
                let pixel = kernel.execute(x, y);
                row[x as usize * 4..x as usize * 4 + 4].copy_from_slice(&pixel);
            }
        });

    out
}

/// Input rectangle this pass reads to produce `output`.
///
/// # Returns
///
/// The output rectangle inflated on every side far enough to cover both
/// orthogonal searches plus one extra pixel for the diagonal end
/// lookups.
pub fn area_of_interest(cfg: &AntiAliasingConfig, output: Rect) -> Rect {
    let cfg = cfg.clamped();
    let diag = if cfg.diag_detection { cfg.search_steps_diag + 1 } else { 0 };
    let max_distance = (2 * cfg.search_steps).max(diag);
    output.expanded(max_distance, max_distance, max_distance, max_distance)
}
