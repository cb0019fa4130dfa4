//! Projective image warping by inverse mapping.
//!
//! A source buffer is resampled into a new buffer sized to the bounding box of its
//! forward-mapped corners. Every destination pixel is pulled back through the inverse
//! transform and filled with the nearest source pixel, or left transparent when it falls
//! outside the source.
//!
//! # Examples
//!
//! Scaling an image by two:
//!
//! ```
//! use projwarp_geometry::linalg::scaling;
//! use projwarp_image::{PixelBuffer, Rgba8};
//! use projwarp_imgproc::warp::{warp_perspective, WarpOptions};
//!
//! let src = PixelBuffer::create(10, 10, true).unwrap();
//! let warped = warp_perspective(&src, &scaling(2.0, 2.0), [0, 0], &WarpOptions::default()).unwrap();
//!
//! assert_eq!(warped.image.width(), 20);
//! assert_eq!(warped.image.get(0, 0), Some(&Rgba8::OPAQUE_BLACK));
//! ```

mod perspective;

pub use perspective::{forward_bounds, warp_perspective, WarpBounds, WarpOptions, WarpedImage};
