//! SMAA pass 3: neighborhood blending.
//!
//! Mixes each pixel with one neighbor along the dominant edge direction,
//! using the weights from pass 2 as fractional blending offsets. The
//! fractional sample exploits bilinear filtering: two integer taps
//! weighted by the fractional part of the offset.

use rayon::prelude::*;

use crate::buffer::{sample_offset_x, sample_offset_y, Pixel, PixelBuffer, PixelReader, Rect};

fn blend_pixel(image: &dyn PixelReader, weights: &dyn PixelReader, x: i32, y: i32) -> Pixel {
    // Blending weights around the current pixel: its own top/left plus
    // the right neighbor's left and the bottom neighbor's top.
    let here = weights.read(x, y);
    let top = here[0];
    let left = here[2];
    let right = weights.read(x + 1, y)[3];
    let bottom = weights.read(x, y + 1)[1];

    if right + bottom + left + top < 1e-5 {
        return image.read(x, y);
    }

    let horizontal = right.max(left) > bottom.max(top);
    let (offset1, offset2, weight1, weight2) = if horizontal {
        (right, -left, right / (right + left), left / (right + left))
    } else {
        (bottom, -top, bottom / (bottom + top), top / (bottom + top))
    };

    let (color1, color2) = if horizontal {
        (sample_offset_x(image, x, y, offset1), sample_offset_x(image, x, y, offset2))
    } else {
        (sample_offset_y(image, x, y, offset1), sample_offset_y(image, x, y, offset2))
    };

    let mut output = [0.0; 4];
    for c in 0..4 {
        output[c] = color1[c] * weight1 + color2[c] * weight2;
    }
    output
}

/// Blend the source image with its neighborhood according to the weight
/// image.
///
/// # Arguments
///
/// * `image` - The source image
/// * `weights` - The blending-weight image from the second pass
///
/// # Returns
///
/// The blended image, same dimensions as the source. Pixels whose
/// surrounding weights are all zero are copied through unchanged.
pub fn neighborhood_blending<R, W>(image: &R, weights: &W) -> PixelBuffer
where
    R: PixelReader + Sync,
    W: PixelReader + Sync,
{
    let width = image.width();
    let height = image.height();
    let mut out = PixelBuffer::new(width, height);
    if out.is_empty() {
        return out;
    }

    out.data_mut()
        .par_chunks_mut(width as usize * 4)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i32;
            for x in 0..width as i32 {
                let pixel = blend_pixel(image, weights, x, y);
                row[x as usize * 4..x as usize * 4 + 4].copy_from_slice(&pixel);
            }
        });

    out
}

/// Input rectangle this pass reads (both inputs) to produce `output`.
///
/// # Returns
///
/// The output rectangle inflated by one pixel on every side.
pub fn area_of_interest(output: Rect) -> Rect {
    output.expanded(1, 1, 1, 1)
}
