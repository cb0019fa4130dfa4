use projwarp_geometry::{
    linalg,
    quad::{Corner, Point2},
};
use projwarp_image::{ImageSize, PixelBuffer, Rgba8};
use projwarp_imgproc::{
    composite::{self, LayerView},
    parallel::ExecutionStrategy,
};

use crate::{
    error::{LayerError, PushError},
    layer::Layer,
};

/// Maximum number of layers a [`LayerStack`] holds.
pub const MAX_LAYERS: usize = 10;

/// An ordered collection of layers with an optional active layer.
///
/// Layer 0 is at the bottom and is painted first.
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
    active: Option<usize>,
}

impl LayerStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the stack holds no layer.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Index of the active layer.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// The active layer.
    pub fn active_layer(&self) -> Option<&Layer> {
        self.active.and_then(|i| self.layers.get(i))
    }

    /// The layer at `index`.
    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Iterate the layers bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    fn layer_mut(&mut self, index: usize) -> Result<&mut Layer, LayerError> {
        let len = self.layers.len();
        self.layers
            .get_mut(index)
            .ok_or(LayerError::LayerIndexOutOfBounds(index, len))
    }

    /// Append `layer` on top and make it active.
    ///
    /// The layer is warped with the identity on the way in.
    ///
    /// # Errors
    ///
    /// [`LayerError::LayerLimitReached`] when the stack is full and
    /// [`LayerError::MissingSource`] when the layer has no image. The layer comes back
    /// untouched inside the [`PushError`].
    pub fn push(&mut self, mut layer: Layer) -> Result<usize, PushError> {
        if self.layers.len() >= MAX_LAYERS {
            return Err(PushError {
                error: LayerError::LayerLimitReached(MAX_LAYERS),
                layer: Box::new(layer),
            });
        }

        if let Err(error) = layer.apply_transform(&linalg::IDENTITY) {
            return Err(PushError {
                error,
                layer: Box::new(layer),
            });
        }

        let index = self.layers.len();
        self.layers.push(layer);
        self.active = Some(index);

        log::debug!("pushed layer {index}");

        Ok(index)
    }

    /// Remove and return the layer at `index`, shifting the layers above it down.
    pub fn remove(&mut self, index: usize) -> Result<Layer, LayerError> {
        if index >= self.layers.len() {
            return Err(LayerError::LayerIndexOutOfBounds(index, self.layers.len()));
        }

        let layer = self.layers.remove(index);
        self.active = match self.layers.len() {
            0 => None,
            len => Some(self.active.unwrap_or(0) % len),
        };

        log::debug!("removed layer {index}, active {:?}", self.active);

        Ok(layer)
    }

    /// Drop the transform of the layer at `index` and move it back to the display origin.
    pub fn reset(&mut self, index: usize) -> Result<(), LayerError> {
        self.layer_mut(index)?.reset()
    }

    /// Shift the layer at `index` on the display.
    pub fn translate(&mut self, index: usize, dx: i32, dy: i32) -> Result<(), LayerError> {
        self.layer_mut(index)?.translate(dx, dy);
        Ok(())
    }

    /// Make the next layer active, wrapping around at the top.
    pub fn select_next(&mut self) -> Option<usize> {
        let len = self.layers.len();
        self.active = self.active.filter(|_| len > 0).map(|a| (a + 1) % len);
        self.active
    }

    /// Make the previous layer active, wrapping around at the bottom.
    pub fn select_previous(&mut self) -> Option<usize> {
        let len = self.layers.len();
        self.active = self.active.filter(|_| len > 0).map(|a| (a + len - 1) % len);
        self.active
    }

    /// Swap the active layer with the one above it, wrapping around at the top.
    ///
    /// The moved layer stays active.
    pub fn move_up(&mut self) -> Option<usize> {
        let len = self.layers.len();
        let a = self.active?;
        self.swap_active(a, (a + 1) % len)
    }

    /// Swap the active layer with the one below it, wrapping around at the bottom.
    ///
    /// The moved layer stays active.
    pub fn move_down(&mut self) -> Option<usize> {
        let len = self.layers.len();
        let a = self.active?;
        self.swap_active(a, (a + len - 1) % len)
    }

    fn swap_active(&mut self, from: usize, to: usize) -> Option<usize> {
        self.layers.swap(from, to);
        self.active = Some(to);
        self.active
    }

    /// Display-space corners and centre of the layer at `index`.
    ///
    /// The corners come in [`Corner`] order, followed by the centre.
    pub fn bound_points(&self, index: usize) -> Result<[Point2; 5], LayerError> {
        self.layers
            .get(index)
            .ok_or(LayerError::LayerIndexOutOfBounds(index, self.layers.len()))?
            .bound_points()
            .ok_or(LayerError::MissingSource)
    }

    /// Drag one corner of the layer at `index` to `point`, given in display coordinates.
    ///
    /// The other three corners stay where they are on the display. Returns the new centre in
    /// display coordinates.
    ///
    /// # Errors
    ///
    /// [`LayerError::Homography`] when the resulting quad is degenerate, in which case the
    /// layer is left untouched.
    pub fn warp_corner(
        &mut self,
        index: usize,
        corner: Corner,
        point: Point2,
    ) -> Result<Point2, LayerError> {
        let points = self.bound_points(index)?;

        let mut quad = [points[0], points[1], points[2], points[3]];
        quad[corner.index()] = point;

        log::debug!("layer {index}: {corner:?} -> {point:?}");

        self.warp_quad(index, &quad)
    }

    /// Warp the layer at `index` so that its corners land on `quad`, given in display
    /// coordinates and [`Corner`] order. Returns the new centre in display coordinates.
    pub fn warp_quad(&mut self, index: usize, quad: &[Point2; 4]) -> Result<Point2, LayerError> {
        let layer = self.layer_mut(index)?;

        let [ox, oy] = layer.origin().map(|v| v as f64);
        let local = quad.map(|p| p.offset(-ox, -oy));

        let center = layer.warp_to_points(&local)?;
        Ok(center.offset(ox, oy))
    }

    /// Borrow every warped image at its raster position, bottom first.
    pub fn views(&self) -> Vec<LayerView<'_>> {
        self.layers.iter().filter_map(Layer::view).collect()
    }

    /// Paint the stack into a new display buffer.
    pub fn composite(
        &self,
        size: ImageSize,
        background: Rgba8,
        strategy: ExecutionStrategy,
    ) -> Result<PixelBuffer, LayerError> {
        Ok(composite::composite(
            &self.views(),
            size,
            background,
            strategy,
        )?)
    }
}
