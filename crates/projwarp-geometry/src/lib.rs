#![deny(missing_docs)]
//! Projective geometry primitives for the warping engine.

/// Error types for the geometry module.
pub mod error;

/// Four point homography estimation.
pub mod homography;

/// 3x3 matrix helpers.
pub mod linalg;

/// Planar points and forward-mapped image quads.
pub mod quad;

pub use error::GeometryError;
pub use homography::{homography_4pt2d, HomographyEstimate, HomographyEstimator};
pub use linalg::Mat33;
pub use quad::{Corner, Point2};
