#![deny(missing_docs)]
//! Pixel and pixel buffer types used by the projective warping engine.

/// Error types for the image module.
pub mod error;

/// pixel buffer representation.
pub mod image;

pub use crate::error::ImageError;
pub use crate::image::{ImageSize, PixelBuffer, Rgba8};
