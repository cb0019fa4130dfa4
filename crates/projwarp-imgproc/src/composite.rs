use projwarp_image::{ImageSize, PixelBuffer, Rgba8};

use crate::{
    error::WarpError,
    parallel::{self, ExecutionStrategy},
};

/// The display clear colour.
pub const DEFAULT_BACKGROUND: Rgba8 = Rgba8::new(13, 13, 13, 255);

/// A borrowed pixel buffer placed on the display.
#[derive(Debug, Clone, Copy)]
pub struct LayerView<'a> {
    /// The pixels to paint.
    pub image: &'a PixelBuffer,
    /// Display position of the image's pixel `(0, 0)`.
    pub position: [i32; 2],
}

/// Blend `src` over `dst` using the source alpha on all four channels.
///
/// Every channel is computed as `(src * a + dst * (255 - a) + 127) / 255`.
///
/// # Examples
///
/// ```
/// use projwarp_image::Rgba8;
/// use projwarp_imgproc::composite::blend_over;
///
/// let dst = Rgba8::new(0, 0, 0, 255);
/// assert_eq!(blend_over(dst, Rgba8::new(200, 10, 20, 255)), Rgba8::new(200, 10, 20, 255));
/// assert_eq!(blend_over(dst, Rgba8::TRANSPARENT), dst);
/// ```
pub fn blend_over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    let a = src.a as u32;
    let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a) + 127) / 255) as u8;
    Rgba8::new(
        mix(src.r, dst.r),
        mix(src.g, dst.g),
        mix(src.b, dst.b),
        mix(src.a, dst.a),
    )
}

/// Paint `layers` in order into a new `size` buffer cleared to `background`.
///
/// The first layer is painted first and ends up at the bottom. Pixels outside the display
/// are clipped.
///
/// # Arguments
///
/// * `layers` - The layers to paint, bottom first.
/// * `size` - The size of the display.
/// * `background` - The clear colour.
/// * `strategy` - How the display rows are scheduled.
///
/// # Errors
///
/// Fails if `size` is empty or the strategy cannot be applied.
pub fn composite(
    layers: &[LayerView<'_>],
    size: ImageSize,
    background: Rgba8,
    strategy: ExecutionStrategy,
) -> Result<PixelBuffer, WarpError> {
    let mut dst = PixelBuffer::from_size_val(size, background)?;
    let width = size.width as i64;

    parallel::par_iter_rows_mut(dst.as_slice_mut(), size.width, strategy, |y, row| {
        for layer in layers {
            let ly = y as i64 - layer.position[1] as i64;
            let Some(src_row) = usize::try_from(ly)
                .ok()
                .and_then(|ly| layer.image.row(ly))
            else {
                continue;
            };

            let px = layer.position[0] as i64;
            let x0 = px.max(0);
            let x1 = (px + src_row.len() as i64).min(width);
            if x0 >= x1 {
                continue;
            }

            let dst_span = &mut row[x0 as usize..x1 as usize];
            let src_span = &src_row[(x0 - px) as usize..(x1 - px) as usize];
            for (d, s) in dst_span.iter_mut().zip(src_span) {
                *d = blend_over(*d, *s);
            }
        }
    })?;

    log::debug!("composited {} layers into {}", layers.len(), size);

    Ok(dst)
}
