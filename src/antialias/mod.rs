//! SMAA 1x antialiasing.
//!
//! Enhanced Subpixel Morphological Antialiasing, single-sample variant,
//! as three passes over RGBA f32 buffers:
//!
//! - [`edges`] - edge detection (luminance, color or depth based)
//! - [`weights`] - blending-weight calculation from the area tables
//! - [`blend`] - neighborhood blending
//!
//! [`smaa_1x`] runs all three in order. The precomputed lookup tables the
//! weight pass samples live in [`areatex`].

pub mod areatex;
pub mod blend;
pub mod edges;
pub mod weights;

pub use areatex::AreaTex;
pub use blend::neighborhood_blending;
pub use edges::edge_detection;
pub use weights::blending_weights;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::buffer::{PixelBuffer, PixelReader};

/// Which signal drives edge detection.
///
/// Color catches the most edges; luminance is cheaper and usually close.
/// Depth only sees geometric silhouettes but is immune to texture detail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDetectMode {
    /// Luminance difference of the source image
    Luma,
    /// Largest per-channel color difference (default)
    #[default]
    Color,
    /// Difference of the auxiliary single-channel input
    Depth,
}

impl std::fmt::Display for EdgeDetectMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeDetectMode::Luma => write!(f, "luma"),
            EdgeDetectMode::Color => write!(f, "color"),
            EdgeDetectMode::Depth => write!(f, "depth"),
        }
    }
}

/// Configuration for the SMAA passes.
///
/// Out-of-range values are clamped at use, not rejected: search steps to
/// `[1, 98]` and `[1, 20]`, corner rounding to `[0, 100]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AntiAliasingConfig {
    /// Edge detection variant (default: color)
    #[serde(default)]
    pub detect: EdgeDetectMode,

    /// Edge detection threshold (default: 0.05)
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Threshold for the depth variant (default: 0.1)
    #[serde(default = "default_depth_threshold")]
    pub depth_threshold: f32,

    /// Local contrast adaptation factor; 0 disables adaptation
    /// (default: 2.0)
    #[serde(default = "default_adaptation")]
    pub adaptation_factor: f32,

    /// Lower the threshold where the auxiliary input shows structure
    /// (default: false)
    #[serde(default)]
    pub predication: bool,

    /// Value delta in the auxiliary input that counts as structure
    #[serde(default = "default_pred_threshold")]
    pub pred_threshold: f32,

    /// Threshold multiplier applied under predication
    #[serde(default = "default_pred_scale")]
    pub pred_scale: f32,

    /// How much predication lowers the threshold
    #[serde(default = "default_pred_strength")]
    pub pred_strength: f32,

    /// Search for diagonal patterns (default: true)
    #[serde(default = "default_true")]
    pub diag_detection: bool,

    /// Sharpen corners by reducing blending near them (default: true)
    #[serde(default = "default_true")]
    pub corner_detection: bool,

    /// Corner rounding in percent, 0..=100 (default: 25)
    #[serde(default = "default_rounding")]
    pub corner_rounding: u32,

    /// Orthogonal search range in pixel pairs, 1..=98 (default: 16)
    #[serde(default = "default_search_steps")]
    pub search_steps: i32,

    /// Diagonal search range in pixels, 1..=20 (default: 8)
    #[serde(default = "default_search_steps_diag")]
    pub search_steps_diag: i32,
}

fn default_threshold() -> f32 {
    0.05
}

fn default_depth_threshold() -> f32 {
    0.1
}

fn default_adaptation() -> f32 {
    2.0
}

fn default_pred_threshold() -> f32 {
    0.01
}

fn default_pred_scale() -> f32 {
    2.0
}

fn default_pred_strength() -> f32 {
    0.4
}

fn default_rounding() -> u32 {
    25
}

fn default_search_steps() -> i32 {
    16
}

fn default_search_steps_diag() -> i32 {
    8
}

fn default_true() -> bool {
    true
}

impl Default for AntiAliasingConfig {
    fn default() -> Self {
        Self {
            detect: EdgeDetectMode::default(),
            threshold: default_threshold(),
            depth_threshold: default_depth_threshold(),
            adaptation_factor: default_adaptation(),
            predication: false,
            pred_threshold: default_pred_threshold(),
            pred_scale: default_pred_scale(),
            pred_strength: default_pred_strength(),
            diag_detection: true,
            corner_detection: true,
            corner_rounding: default_rounding(),
            search_steps: default_search_steps(),
            search_steps_diag: default_search_steps_diag(),
        }
    }
}

impl AntiAliasingConfig {
    /// A copy with all domain-restricted values clamped into range.
    ///
    /// # Returns
    ///
    /// The configuration with `corner_rounding` in `[0, 100]`,
    /// `search_steps` in `[1, 98]` and `search_steps_diag` in `[1, 20]`.
    pub fn clamped(&self) -> Self {
        Self {
            corner_rounding: self.corner_rounding.min(100),
            search_steps: self.search_steps.clamp(1, 98),
            search_steps_diag: self.search_steps_diag.clamp(1, 20),
            ..self.clone()
        }
    }
}

/// Run the full SMAA 1x pipeline: edge detection, blending weights,
/// neighborhood blending.
///
/// # Arguments
///
/// * `cfg` - Configuration for all three passes
/// * `image` - The source image
/// * `value` - Optional auxiliary single-channel input (depth image or
///   predication source, depending on the configuration)
///
/// # Returns
///
/// The antialiased image, same dimensions as the source.
pub fn smaa_1x<R, V>(cfg: &AntiAliasingConfig, image: &R, value: Option<&V>) -> PixelBuffer
where
    R: PixelReader + Sync,
    V: PixelReader + Sync,
{
    let edge_buffer = edge_detection(cfg, image, value);
    let weight_buffer = blending_weights(cfg, &edge_buffer);
    neighborhood_blending(image, &weight_buffer)
}
