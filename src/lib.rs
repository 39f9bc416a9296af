//! Edgekit - CPU image-space filters
//!
//! This library provides two filters over RGBA f32 pixel buffers:
//! - SMAA 1x antialiasing (edge detection, blending-weight calculation,
//!   neighborhood blending)
//! - an exact Euclidean distance transform with vector-to-nearest output
//!
//! # Quick Start
//!
//! ```
//! use edgekit::{smaa_1x, AntiAliasingConfig, PixelBuffer};
//!
//! // Antialias an image held in a float buffer.
//! let image = PixelBuffer::filled(64, 64, [0.5, 0.5, 0.5, 1.0]);
//! let out = smaa_1x::<_, PixelBuffer>(&AntiAliasingConfig::default(), &image, None);
//! assert_eq!(out.width(), 64);
//! ```
//!
//! ```
//! use edgekit::{distance_transform, DistanceTransformConfig, PixelBuffer};
//!
//! // Distance to the nearest zero pixel of a mask.
//! let mut mask = PixelBuffer::filled(8, 8, [1.0, 1.0, 1.0, 1.0]);
//! mask.set(3, 3, [0.0, 0.0, 0.0, 1.0]);
//! let field = distance_transform(&DistanceTransformConfig::default(), &mask).unwrap();
//! assert_eq!(field.distance(3, 3), 0.0);
//! ```

pub mod antialias;
pub mod buffer;
pub mod cli;
pub mod color;
pub mod distance;
pub mod output;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// Buffers and readers
pub use buffer::{ConstantReader, Pixel, PixelBuffer, PixelReader, Rect};

// Antialiasing
pub use antialias::{
    blending_weights, edge_detection, neighborhood_blending, smaa_1x, AntiAliasingConfig,
    EdgeDetectMode,
};

// Distance transform
pub use distance::{
    distance_transform, DistanceError, DistanceField, DistanceTransformConfig, DistanceTransformOp,
};

// Image I/O
pub use output::{load_png, save_png, OutputError};
