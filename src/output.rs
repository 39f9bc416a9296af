//! PNG input/output for pixel buffers.

use image::{Rgba, RgbaImage};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::buffer::PixelBuffer;

/// Error type for image I/O.
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Convert an 8-bit RGBA image into a float pixel buffer.
///
/// # Arguments
///
/// * `image` - The 8-bit image to convert
///
/// # Returns
///
/// A buffer of the same dimensions with each channel scaled to
/// `u8 / 255`.
pub fn buffer_from_image(image: &RgbaImage) -> PixelBuffer {
    let (width, height) = image.dimensions();
    let mut buf = PixelBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let p = image.get_pixel(x, y).0;
            buf.set(
                x,
                y,
                [
                    p[0] as f32 / 255.0,
                    p[1] as f32 / 255.0,
                    p[2] as f32 / 255.0,
                    p[3] as f32 / 255.0,
                ],
            );
        }
    }
    buf
}

/// Convert a float pixel buffer into an 8-bit RGBA image.
///
/// # Arguments
///
/// * `buffer` - The float buffer to convert
///
/// # Returns
///
/// An image of the same dimensions with each channel clamped to
/// `[0, 1]` and scaled to 8 bits.
pub fn image_from_buffer(buffer: &PixelBuffer) -> RgbaImage {
    let mut image = RgbaImage::new(buffer.width(), buffer.height());
    for y in 0..buffer.height() {
        for x in 0..buffer.width() {
            let p = buffer.get(x, y);
            image.put_pixel(
                x,
                y,
                Rgba([
                    (p[0].clamp(0.0, 1.0) * 255.0).round() as u8,
                    (p[1].clamp(0.0, 1.0) * 255.0).round() as u8,
                    (p[2].clamp(0.0, 1.0) * 255.0).round() as u8,
                    (p[3].clamp(0.0, 1.0) * 255.0).round() as u8,
                ]),
            );
        }
    }
    image
}

/// Load an image file into a float pixel buffer.
///
/// # Arguments
///
/// * `path` - The image file to load
///
/// # Returns
///
/// * `Ok(PixelBuffer)` with the decoded image
/// * `Err(OutputError)` if the file cannot be read or decoded
pub fn load_png(path: &Path) -> Result<PixelBuffer, OutputError> {
    let image = image::open(path)?.to_rgba8();
    Ok(buffer_from_image(&image))
}

/// Save a float pixel buffer as a PNG file.
///
/// Creates parent directories if they don't exist.
///
/// # Arguments
///
/// * `buffer` - The buffer to save
/// * `path` - The output file path
///
/// # Returns
///
/// * `Ok(())` on success
/// * `Err(OutputError)` on failure
pub fn save_png(buffer: &PixelBuffer, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    image_from_buffer(buffer).save(path)?;
    Ok(())
}
