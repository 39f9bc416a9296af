//! Color helpers.

use crate::buffer::Pixel;

/// Rec. 709 luma weights used by luminance edge detection.
const LUMA_WEIGHTS: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Relative luminance of an RGBA pixel (alpha ignored).
pub fn luminance(pixel: &Pixel) -> f32 {
    pixel[0] * LUMA_WEIGHTS[0] + pixel[1] * LUMA_WEIGHTS[1] + pixel[2] * LUMA_WEIGHTS[2]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luminance_grayscale() {
        // For gray pixels luminance equals the channel value.
        let l = luminance(&[0.5, 0.5, 0.5, 1.0]);
        assert!((l - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_luminance_weights_sum_to_one() {
        let l = luminance(&[1.0, 1.0, 1.0, 0.0]);
        assert!((l - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_luminance_green_dominates() {
        let g = luminance(&[0.0, 1.0, 0.0, 1.0]);
        let r = luminance(&[1.0, 0.0, 0.0, 1.0]);
        let b = luminance(&[0.0, 0.0, 1.0, 1.0]);
        assert!(g > r && r > b);
    }
}
