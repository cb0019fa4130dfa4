use projwarp_geometry::GeometryError;
use projwarp_imgproc::WarpError;

use crate::layer::Layer;

/// An error type for layer operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum LayerError {
    /// The layer has no source image to warp.
    #[error("Layer has no source image")]
    MissingSource,

    /// The stack already holds the maximum number of layers.
    #[error("Layer limit of {0} reached")]
    LayerLimitReached(usize),

    /// The index does not address a layer in the stack.
    #[error("Layer index {0} out of bounds for a stack of {1}")]
    LayerIndexOutOfBounds(usize, usize),

    /// The warp could not be computed.
    #[error(transparent)]
    Warp(#[from] WarpError),

    /// No homography maps the source corners onto the requested points.
    #[error(transparent)]
    Homography(#[from] GeometryError),
}

/// A layer refused by [`LayerStack::push`](crate::LayerStack::push), handed back to the caller.
#[derive(thiserror::Error, Debug)]
#[error("{error}")]
pub struct PushError {
    /// Why the layer was refused.
    pub error: LayerError,
    /// The refused layer, unchanged.
    pub layer: Box<Layer>,
}

impl PushError {
    /// Take the refused layer back.
    pub fn into_layer(self) -> Layer {
        *self.layer
    }
}

impl From<PushError> for LayerError {
    fn from(e: PushError) -> Self {
        e.error
    }
}
