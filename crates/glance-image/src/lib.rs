#![deny(missing_docs)]
//! Image types and model-native pixel buffer conversions

/// image representation for single-shot inference.
pub mod image;

/// Error types for the image module.
pub mod error;

/// Model-native 32-bit BGRA pixel buffer and conversions.
pub mod pixel_buffer;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
pub use crate::pixel_buffer::{bgra_from_rgb8, bgra_from_rgba8, rgb8_from_bgra, PixelBuffer};
