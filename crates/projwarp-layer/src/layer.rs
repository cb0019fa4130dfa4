use projwarp_geometry::{
    linalg::{self, Mat33},
    quad::{self, Point2},
    HomographyEstimator,
};
use projwarp_image::{ImageSize, PixelBuffer};
use projwarp_imgproc::{
    composite::LayerView,
    warp::{warp_perspective, WarpOptions, WarpedImage},
};

use crate::error::LayerError;

/// A positioned, projectively transformed image.
///
/// A layer owns its source image (`raw`) and the result of warping it through the current
/// transform (`warped`). The warped buffer is drawn with its pixel `(0, 0)` at the raster
/// position. The transform is expressed in a local frame whose origin sits at
/// `raster_pos - warp_offset` on the display, where `warp_offset` is the position of the
/// warped buffer inside that frame.
///
/// Every operation that fails leaves the layer exactly as it was.
///
/// # Examples
///
/// ```
/// use projwarp_geometry::linalg;
/// use projwarp_image::PixelBuffer;
/// use projwarp_layer::Layer;
///
/// let mut layer = Layer::from_image(PixelBuffer::create(10, 10, true).unwrap()).unwrap();
/// layer.apply_transform(&linalg::translation(5.0, 3.0)).unwrap();
///
/// assert_eq!(layer.raster_pos(), [5, 3]);
/// assert_eq!(layer.origin(), [0, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct Layer {
    raw: Option<PixelBuffer>,
    warped: Option<PixelBuffer>,
    transform: Mat33,
    raster_pos: [i32; 2],
    warp_offset: [i32; 2],
    options: WarpOptions,
}

impl Default for Layer {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer {
    /// Create an empty layer with the identity transform at the display origin.
    pub fn new() -> Self {
        Self::with_options(WarpOptions::default())
    }

    /// Create an empty layer that warps with `options`.
    pub fn with_options(options: WarpOptions) -> Self {
        Self {
            raw: None,
            warped: None,
            transform: linalg::IDENTITY,
            raster_pos: [0, 0],
            warp_offset: [0, 0],
            options,
        }
    }

    /// Create a layer holding `image`, warped by the identity.
    pub fn from_image(image: PixelBuffer) -> Result<Self, LayerError> {
        let mut layer = Self::new();
        layer.set_image(image)?;
        Ok(layer)
    }

    /// Replace the source image and warp it with the identity.
    ///
    /// The frame origin is kept, so the new image appears where the old frame was.
    pub fn set_image(&mut self, image: PixelBuffer) -> Result<(), LayerError> {
        let origin = self.origin();
        let warped = warp_perspective(&image, &linalg::IDENTITY, origin, &self.options)?;
        self.raw = Some(image);
        self.install(linalg::IDENTITY, origin, warped);
        Ok(())
    }

    /// Shift the layer on the display. The warped pixels and the transform are not touched.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.raster_pos = [
            self.raster_pos[0].saturating_add(dx),
            self.raster_pos[1].saturating_add(dy),
        ];
    }

    /// Warp the source image through `m` and adopt `m` as the layer transform.
    ///
    /// The raster position follows the new bounding box so that content which `m` leaves in
    /// place stays put on the display. Applying the same `m` twice yields identical state.
    ///
    /// # Errors
    ///
    /// [`LayerError::MissingSource`] without a source image, or [`LayerError::Warp`] when the
    /// warp is rejected.
    pub fn apply_transform(&mut self, m: &Mat33) -> Result<(), LayerError> {
        let raw = self.raw.as_ref().ok_or(LayerError::MissingSource)?;
        let origin = self.origin();

        let warped = warp_perspective(raw, m, origin, &self.options).map_err(|e| {
            log::warn!("rejected transform {m:?}: {e}");
            e
        })?;

        self.install(*m, origin, warped);
        Ok(())
    }

    /// Warp the source corners onto `dst`, given in the layer's local frame.
    ///
    /// The corners are in winding order: `(0,0), (W,0), (W,H), (0,H)`. Returns the image
    /// centre mapped through the new transform, in the same local frame.
    ///
    /// # Errors
    ///
    /// [`LayerError::Homography`] for degenerate points, otherwise as
    /// [`Layer::apply_transform`].
    pub fn warp_to_points(&mut self, dst: &[Point2; 4]) -> Result<Point2, LayerError> {
        let raw = self.raw.as_ref().ok_or(LayerError::MissingSource)?;
        let estimator = HomographyEstimator::from_image_size(raw.width(), raw.height());

        let estimate = estimator.estimate(dst).map_err(|e| {
            log::warn!("no homography onto {dst:?}: {e}");
            e
        })?;

        self.apply_transform(&estimate.matrix)?;
        Ok(estimate.center)
    }

    /// Drop any transform and put the layer back at the display origin.
    pub fn reset(&mut self) -> Result<(), LayerError> {
        let raw = self.raw.as_ref().ok_or(LayerError::MissingSource)?;
        let warped = warp_perspective(raw, &linalg::IDENTITY, [0, 0], &self.options)?;
        self.install(linalg::IDENTITY, [0, 0], warped);
        Ok(())
    }

    fn install(&mut self, m: Mat33, origin: [i32; 2], warped: WarpedImage) {
        self.transform = m;
        self.warp_offset = warped.offset;
        self.raster_pos = [
            origin[0].saturating_add(warped.offset[0]),
            origin[1].saturating_add(warped.offset[1]),
        ];
        // the previous buffer is dropped here
        self.warped = Some(warped.image);
    }

    /// Forward-mapped corners and centre in display coordinates.
    ///
    /// See [`quad::bound_points`] for the layout. `None` without a source image.
    pub fn bound_points(&self) -> Option<[Point2; 5]> {
        let raw = self.raw.as_ref()?;
        let origin = self.origin();
        Some(quad::bound_points(
            &self.transform,
            raw.width() as f64,
            raw.height() as f64,
            Point2::new(origin[0] as f64, origin[1] as f64),
        ))
    }

    /// Whether a source image has been set.
    pub fn has_source(&self) -> bool {
        self.raw.is_some()
    }

    /// The source image.
    pub fn raw(&self) -> Option<&PixelBuffer> {
        self.raw.as_ref()
    }

    /// The warped image.
    pub fn warped(&self) -> Option<&PixelBuffer> {
        self.warped.as_ref()
    }

    /// The warped image as `width * height * 4` row-major bytes, for a renderer.
    pub fn warped_bytes(&self) -> Option<&[u8]> {
        self.warped.as_ref().map(|w| w.as_bytes())
    }

    /// The current extent of the warped image.
    pub fn output_size(&self) -> Option<ImageSize> {
        self.warped.as_ref().map(|w| w.size())
    }

    /// The current transform.
    pub fn transform(&self) -> &Mat33 {
        &self.transform
    }

    /// Display position of the warped image's pixel `(0, 0)`.
    pub fn raster_pos(&self) -> [i32; 2] {
        self.raster_pos
    }

    /// Display position of the transform's local frame.
    pub fn origin(&self) -> [i32; 2] {
        [
            self.raster_pos[0].saturating_sub(self.warp_offset[0]),
            self.raster_pos[1].saturating_sub(self.warp_offset[1]),
        ]
    }

    /// The warp options.
    pub fn options(&self) -> &WarpOptions {
        &self.options
    }

    /// Change the warp options used by subsequent warps.
    pub fn set_options(&mut self, options: WarpOptions) {
        self.options = options;
    }

    /// Borrow the warped image for compositing.
    pub fn view(&self) -> Option<LayerView<'_>> {
        self.warped.as_ref().map(|image| LayerView {
            image,
            position: self.raster_pos,
        })
    }
}
