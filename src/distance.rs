//! Exact Euclidean distance transform.
//!
//! Two passes over a thresholded binary mask. The row pass computes, for
//! every inside pixel, the squared distance to the nearest outside pixel
//! on its row (incrementally, via two directional sweeps) plus the signed
//! horizontal offset to it. The column pass then builds the lower
//! envelope of the parabolas `g_i(y) = (y - v_i)^2 + f_i` seeded by those
//! row distances, which yields the true 2D Euclidean distance in linear
//! time.
//!
//! The parabola-intersection update uses truncated signed 32-bit integer
//! division. That is deliberate: downstream consumers depend on the
//! exact pixel values this arithmetic produces, so the few inputs where
//! a real division would shift an envelope handoff by one row keep the
//! integer result.
//!
//! The whole image is one unit of work: every output pixel can depend on
//! every input pixel, so tiled hosts go through [`DistanceTransformOp`],
//! which materializes the field once behind a once-guard and serves tile
//! reads from it.

use std::collections::TryReserveError;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buffer::{PixelBuffer, PixelReader, Rect};

/// Error type for the distance transform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistanceError {
    /// The input image has no pixels; the output stays uncalculated.
    #[error("input image has zero area")]
    EmptyImage,
    /// Scratch or output allocation failed.
    #[error("allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
}

/// Configuration for [`distance_transform`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DistanceTransformConfig {
    /// Mask threshold; a pixel is inside iff
    /// `(value >= threshold) xor invert` (default: 0.5)
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Swap inside and outside (default: false)
    #[serde(default)]
    pub invert: bool,

    /// Scale outputs by `100 / max(width, height)` instead of 1
    /// (default: false)
    #[serde(default)]
    pub relative: bool,
}

fn default_threshold() -> f32 {
    0.5
}

impl Default for DistanceTransformConfig {
    fn default() -> Self {
        Self { threshold: default_threshold(), invert: false, relative: false }
    }
}

/// Result of a distance transform: per pixel the distance to the nearest
/// outside pixel and the displacement vector toward it.
///
/// Values are stored unscaled; accessors apply the relative/absolute
/// factor. An image with no outside pixel at all yields `f32::MAX`
/// distances and zero vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceField {
    width: u32,
    height: u32,
    factor: f32,
    data: Vec<f32>,
}

impl DistanceField {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The scale applied to all outputs (1.0 in absolute mode).
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Read one output pixel.
    ///
    /// # Arguments
    ///
    /// * `x`, `y` - Pixel coordinates; must be inside the field
    ///
    /// # Returns
    ///
    /// `(distance, vec_x, vec_y)`, each multiplied by the scale factor.
    pub fn sample(&self, x: u32, y: u32) -> [f32; 3] {
        assert!(x < self.width && y < self.height, "pixel ({}, {}) out of bounds", x, y);
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i] * self.factor, self.data[i + 1] * self.factor, self.data[i + 2] * self.factor]
    }

    /// Scaled distance at a pixel.
    pub fn distance(&self, x: u32, y: u32) -> f32 {
        self.sample(x, y)[0]
    }

    /// Scaled displacement toward the nearest outside pixel.
    pub fn vector(&self, x: u32, y: u32) -> (f32, f32) {
        let s = self.sample(x, y);
        (s[1], s[2])
    }

    /// Largest finite distance in the field.
    ///
    /// # Returns
    ///
    /// * `Some(distance)` of the farthest pixel with a real boundary
    /// * `None` if the field is saturated (no boundary anywhere)
    pub fn max_finite_distance(&self) -> Option<f32> {
        let mut max = None;
        for y in 0..self.height {
            for x in 0..self.width {
                let d = self.distance(x, y);
                if d.is_finite() && d < f32::MAX {
                    max = Some(max.map_or(d, |m: f32| m.max(d)));
                }
            }
        }
        max
    }

    /// The distance as a single-channel pixel buffer (channel 0).
    pub fn distance_buffer(&self) -> PixelBuffer {
        let mut out = PixelBuffer::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.set(x, y, [self.distance(x, y), 0.0, 0.0, 1.0]);
            }
        }
        out
    }

    /// Distance and vector as a 3-channel pixel buffer.
    pub fn vector_buffer(&self) -> PixelBuffer {
        let mut out = PixelBuffer::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let s = self.sample(x, y);
                out.set(x, y, [s[0], s[1], s[2], 1.0]);
            }
        }
        out
    }
}

fn scratch_i32(len: usize) -> Result<Vec<i32>, DistanceError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)?;
    v.resize(len, 0);
    Ok(v)
}

fn scratch_f32(len: usize) -> Result<Vec<f32>, DistanceError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)?;
    v.resize(len, 0.0);
    Ok(v)
}

/// Compute the exact Euclidean distance transform of a mask.
///
/// The mask is read from channel 0 through a clamped reader; inside
/// pixels satisfy `(value >= threshold) xor invert`.
///
/// # Arguments
///
/// * `cfg` - Threshold, polarity and scaling configuration
/// * `mask` - Single-channel mask image
///
/// # Returns
///
/// * `Ok(DistanceField)` with per-pixel distances and vectors
/// * `Err(DistanceError)` if the image has zero area or scratch
///   allocation fails
pub fn distance_transform<R: PixelReader>(
    cfg: &DistanceTransformConfig,
    mask: &R,
) -> Result<DistanceField, DistanceError> {
    let width = mask.width() as usize;
    let height = mask.height() as usize;
    if width == 0 || height == 0 {
        return Err(DistanceError::EmptyImage);
    }

    let factor = if cfg.relative { 100.0 / width.max(height) as f32 } else { 1.0 };

    // r: running horizontal distances for the row sweeps.
    // f: squared horizontal distance per pixel; -1 marks "not reachable
    //    within its row" (the row has no outside pixel).
    // h: signed horizontal offset to the nearest outside pixel in the
    //    row; positive means it lies to the left.
    // v, rx, z: parabola vertices, their offsets, and the intersection
    //    rows of the lower envelope during the column pass.
    let mut r = scratch_i32(width)?;
    let mut f = scratch_i32(width * height)?;
    let mut h = scratch_i32(width * height)?;
    let mut v = scratch_i32(height)?;
    let mut rx = scratch_i32(height)?;
    let mut z = scratch_i32(height)?;
    let mut out = scratch_f32(width * height * 3)?;

    // First pass: horizontal processing.
    let mut has_outside = false;
    for y in 0..height {
        let row = y * width;

        // Thresholding.
        for x in 0..width {
            let inside = (mask.read(x as i32, y as i32)[0] >= cfg.threshold) != cfg.invert;
            if inside {
                r[x] = width as i32;
                f[row + x] = -1;
            } else {
                r[x] = 0;
                f[row + x] = 0;
                has_outside = true;
            }
            h[row + x] = 0;
        }

        // Left to right: extend distances from any known pixel.
        for x in 1..width {
            if f[row + x] != 0 && f[row + x - 1] != -1 {
                r[x] = r[x - 1] + 1;
                f[row + x] = f[row + x - 1] + r[x - 1] + r[x];
                h[row + x] = r[x];
            }
        }

        // Right to left: keep whichever side is closer.
        for x in (0..width - 1).rev() {
            if f[row + x] != 0 && f[row + x + 1] != -1 && r[x] > r[x + 1] {
                r[x] = r[x + 1] + 1;
                f[row + x] = f[row + x + 1] + r[x + 1] + r[x];
                h[row + x] = -r[x];
            }
        }
    }

    // No outside pixel anywhere: saturate the whole field.
    if !has_outside {
        for pixel in out.chunks_mut(3) {
            pixel[0] = f32::MAX;
        }
        return Ok(DistanceField { width: width as u32, height: height as u32, factor, data: out });
    }

    // Second pass: per column, lower envelope of parabolas.
    for x in 0..width {
        let mut k = 0usize;

        // Seed with the first row that has a horizontal distance. At
        // least one row has outside pixels, and such a row is fully
        // computed, so this always terminates.
        let mut y0 = 0usize;
        while f[x + y0 * width] == -1 {
            y0 += 1;
        }
        v[0] = y0 as i32;
        rx[0] = h[x + y0 * width];

        for y in y0 + 1..height {
            let fy = f[x + y * width];
            if fy == -1 {
                continue;
            }

            // Intersection with the top parabola, popping vertices the
            // new one dominates. Truncated i32 division, deliberately.
            let s = loop {
                let vk = v[k];
                let s = ((fy - f[x + vk as usize * width]) / (y as i32 - vk) + y as i32 + vk) / 2;
                if k == 0 || s > z[k - 1] {
                    break s;
                }
                k -= 1;
            };

            z[k] = s;
            k += 1;
            v[k] = y as i32;
            rx[k] = h[x + y * width];
        }
        z[k] = height as i32;

        // Walk the envelope and emit distances. The vector points from
        // the pixel toward its nearest outside pixel.
        k = 0;
        for y in 0..height {
            while z[k] < y as i32 {
                k += 1;
            }
            let ry = y as i32 - v[k];
            let fv = f[x + v[k] as usize * width];
            let i = (x + y * width) * 3;
            out[i] = ((ry * ry + fv) as f32).sqrt();
            out[i + 1] = -rx[k] as f32;
            out[i + 2] = -ry as f32;
        }
    }

    Ok(DistanceField { width: width as u32, height: height as u32, factor, data: out })
}

/// Whole-image barrier wrapper around [`distance_transform`].
///
/// The first read computes the field once (guarded, so concurrent readers
/// wait rather than recompute); later reads hit the cache. Until then,
/// [`required_input`](Self::required_input) reports the full input
/// rectangle as a dependency; afterwards there is none.
pub struct DistanceTransformOp {
    cfg: DistanceTransformConfig,
    cache: OnceLock<Result<DistanceField, DistanceError>>,
}

impl DistanceTransformOp {
    pub fn new(cfg: DistanceTransformConfig) -> Self {
        Self { cfg, cache: OnceLock::new() }
    }

    /// The input rectangle still needed before reads can be served.
    ///
    /// # Arguments
    ///
    /// * `full_image` - The full rectangle of the input image
    ///
    /// # Returns
    ///
    /// * `Some(full_image)` before the first compute
    /// * `None` once the field is materialized
    pub fn required_input(&self, full_image: Rect) -> Option<Rect> {
        if self.cache.get().is_some() {
            None
        } else {
            Some(full_image)
        }
    }

    /// The materialized field, computing it on first call.
    ///
    /// # Arguments
    ///
    /// * `mask` - Single-channel mask image; only read on the first call
    ///
    /// # Returns
    ///
    /// * `Ok(&DistanceField)` serving all subsequent tile reads
    /// * `Err(DistanceError)` if the first compute failed (the error is
    ///   cached and returned again on later calls)
    pub fn field<R: PixelReader>(&self, mask: &R) -> Result<&DistanceField, DistanceError> {
        self.cache
            .get_or_init(|| distance_transform(&self.cfg, mask))
            .as_ref()
            .map_err(|e| e.clone())
    }

    /// Serve one output pixel, materializing the field if needed.
    ///
    /// # Arguments
    ///
    /// * `mask` - Single-channel mask image
    /// * `x`, `y` - Output pixel coordinates
    ///
    /// # Returns
    ///
    /// * `Ok([distance, vec_x, vec_y])` for the pixel
    /// * `Err(DistanceError)` if the compute failed
    pub fn read<R: PixelReader>(
        &self,
        mask: &R,
        x: u32,
        y: u32,
    ) -> Result<[f32; 3], DistanceError> {
        Ok(self.field(mask)?.sample(x, y))
    }
}
