#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// layer compositing module.
pub mod composite;

/// Error types for the imgproc module.
pub mod error;

/// module containing parallization utilities.
pub mod parallel;

/// image geometric transformations module.
pub mod warp;

pub use error::WarpError;
