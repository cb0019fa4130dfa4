#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use projwarp_image as image;

#[doc(inline)]
pub use projwarp_geometry as geometry;

#[doc(inline)]
pub use projwarp_imgproc as imgproc;

#[doc(inline)]
pub use projwarp_io as io;

#[doc(inline)]
pub use projwarp_layer as layer;

/// JSON scene descriptions and their rendering.
pub mod scene;
