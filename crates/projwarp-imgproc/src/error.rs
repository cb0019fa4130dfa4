use projwarp_geometry::GeometryError;
use projwarp_image::ImageError;

use crate::parallel::ParallelError;

/// Errors raised while warping or compositing pixel buffers.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WarpError {
    /// The output bounding box is empty, not finite or too large to allocate.
    #[error("Invalid output extent: {0}")]
    InvalidExtent(String),

    /// The transform could not be inverted.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// The output buffer could not be created.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The execution strategy could not be applied.
    #[error(transparent)]
    Parallel(#[from] ParallelError),
}
