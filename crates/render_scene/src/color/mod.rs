//! Color management for rendered output
//!
//! A [`ColorProcessorFactory`] turns a [`ColorConfig`] into a
//! [`ColorProcessor`] that transforms an in-memory float image. Scene entities
//! never depend on this module; a failed processor creation only affects the
//! image the caller wanted to transform.
//!
//! [`BuiltinColorPipeline`] covers the display transforms needed without an
//! external color pipeline: linear or sRGB output, an optional contrast look,
//! exposure, gamma and quantization to the target bit depth.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage precision of the image being transformed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BitDepth {
    /// 8-bit unsigned normalized
    U8,
    /// 16-bit unsigned normalized
    U16,
    /// Half float
    F16,
    /// Full float
    #[default]
    F32,
}

impl BitDepth {
    /// Number of representable steps for normalized integer depths
    pub const fn quantization_steps(self) -> Option<f32> {
        match self {
            Self::U8 => Some(255.0),
            Self::U16 => Some(65535.0),
            Self::F16 | Self::F32 => None,
        }
    }
}

/// Description of a color transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Named color configuration
    pub config: String,
    /// Optional look applied after the display transform
    pub look: Option<String>,
    /// Precision of the output image
    pub bit_depth: BitDepth,
    /// Exposure adjustment in stops
    pub exposure: f32,
    /// Display gamma
    pub gamma: f32,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            config: "linear".to_string(),
            look: None,
            bit_depth: BitDepth::default(),
            exposure: 0.0,
            gamma: 1.0,
        }
    }
}

/// Errors reported when a processor cannot be built or applied
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorError {
    /// Named configuration is not known to the factory
    #[error("Unknown color configuration: {0}")]
    UnknownConfig(String),

    /// Look is not known to the factory
    #[error("Unknown look: {0}")]
    UnknownLook(String),

    /// Gamma must be finite and positive
    #[error("Invalid gamma: {0}")]
    InvalidGamma(f32),

    /// Buffer length is not a whole number of pixels
    #[error("Buffer of {len} values does not hold whole pixels of {channels} channels")]
    ChannelMismatch {
        /// Buffer length
        len: usize,
        /// Channels per pixel
        channels: usize,
    },
}

/// Applies a color transform to an interleaved float image
pub trait ColorProcessor {
    /// Transform `pixels` in place
    ///
    /// Only the first three channels of each pixel are touched; alpha and any
    /// further channels pass through.
    fn apply(&self, pixels: &mut [f32], channels: usize) -> Result<(), ColorError>;
}

/// Builds processors from a configuration
pub trait ColorProcessorFactory {
    /// Create a processor for `config`
    fn create_processor(&self, config: &ColorConfig) -> Result<Box<dyn ColorProcessor>, ColorError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Linear,
    Srgb,
}

/// Factory for the display transforms implemented in this crate
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinColorPipeline;

impl ColorProcessorFactory for BuiltinColorPipeline {
    fn create_processor(&self, config: &ColorConfig) -> Result<Box<dyn ColorProcessor>, ColorError> {
        let encoding = match config.config.to_ascii_lowercase().as_str() {
            "linear" | "raw" => Encoding::Linear,
            "srgb" => Encoding::Srgb,
            _ => return Err(ColorError::UnknownConfig(config.config.clone())),
        };

        let contrast = match config.look.as_deref() {
            None | Some("none") => false,
            Some("contrast") => true,
            Some(other) => return Err(ColorError::UnknownLook(other.to_string())),
        };

        if !config.gamma.is_finite() || config.gamma <= 0.0 {
            return Err(ColorError::InvalidGamma(config.gamma));
        }

        log::debug!(
            "Created color processor: config={}, look={:?}, depth={:?}, exposure={}, gamma={}",
            config.config,
            config.look,
            config.bit_depth,
            config.exposure,
            config.gamma
        );

        Ok(Box::new(DisplayProcessor {
            encoding,
            contrast,
            exposure_scale: config.exposure.exp2(),
            inverse_gamma: config.gamma.recip(),
            steps: config.bit_depth.quantization_steps(),
        }))
    }
}

struct DisplayProcessor {
    encoding: Encoding,
    contrast: bool,
    exposure_scale: f32,
    inverse_gamma: f32,
    steps: Option<f32>,
}

impl DisplayProcessor {
    fn transform(&self, value: f32) -> f32 {
        let mut v = value * self.exposure_scale;

        if self.encoding == Encoding::Srgb {
            v = srgb_encode(v.clamp(0.0, 1.0));
        }

        if self.contrast {
            // Smoothstep S-curve around mid grey.
            let t = v.clamp(0.0, 1.0);
            v = t * t * (3.0 - 2.0 * t);
        }

        if (self.inverse_gamma - 1.0).abs() > f32::EPSILON {
            v = v.max(0.0).powf(self.inverse_gamma);
        }

        match self.steps {
            Some(steps) => (v.clamp(0.0, 1.0) * steps).round() / steps,
            None => v,
        }
    }
}

impl ColorProcessor for DisplayProcessor {
    fn apply(&self, pixels: &mut [f32], channels: usize) -> Result<(), ColorError> {
        if channels == 0 || pixels.len() % channels != 0 {
            return Err(ColorError::ChannelMismatch { len: pixels.len(), channels });
        }

        for pixel in pixels.chunks_exact_mut(channels) {
            for value in pixel.iter_mut().take(3) {
                *value = self.transform(*value);
            }
        }
        Ok(())
    }
}

fn srgb_encode(linear: f32) -> f32 {
    if linear <= 0.003_130_8 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}
