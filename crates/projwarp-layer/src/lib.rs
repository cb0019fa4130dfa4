#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the layer module.
pub mod error;

/// A single positioned and warped image.
pub mod layer;

/// The ordered collection of layers shown on the display.
pub mod stack;

pub use error::{LayerError, PushError};
pub use layer::Layer;
pub use stack::{LayerStack, MAX_LAYERS};
