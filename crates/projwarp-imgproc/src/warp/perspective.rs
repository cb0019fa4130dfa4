use projwarp_geometry::{
    linalg::{self, Mat33},
    quad::{self, Point2},
};
use projwarp_image::{ImageSize, PixelBuffer, Rgba8};

use crate::{
    error::WarpError,
    parallel::{self, ExecutionStrategy},
};

// forward-mapped coordinates this close to an integer are taken as that integer, so that
// round-off from the homography solve does not lose a pixel to truncation
const SNAP_EPS: f64 = 1e-9;

/// Options controlling how a warp is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarpOptions {
    /// How the resampling rows are scheduled.
    pub strategy: ExecutionStrategy,
    /// Largest output buffer, in pixels, a warp may allocate.
    pub max_output_pixels: usize,
}

impl Default for WarpOptions {
    fn default() -> Self {
        Self {
            strategy: ExecutionStrategy::default(),
            max_output_pixels: 1 << 26,
        }
    }
}

/// Axis aligned bounding box of a forward-mapped image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpBounds {
    /// Minimum corner of the box.
    pub min: Point2,
    /// Maximum corner of the box.
    pub max: Point2,
    /// Output extent, the truncated difference `max - min`.
    pub size: ImageSize,
}

/// The output of [`warp_perspective`].
#[derive(Debug, Clone, PartialEq)]
pub struct WarpedImage {
    /// The resampled pixels.
    pub image: PixelBuffer,
    /// Position of pixel `(0, 0)` of `image` in the transform's frame.
    pub offset: [i32; 2],
}

fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < SNAP_EPS {
        r
    } else {
        v
    }
}

/// Compute the bounding box of the corners `(0,0), (W,0), (W,H), (0,H)` mapped through `m`.
///
/// # Errors
///
/// Returns [`WarpError::InvalidExtent`] when a corner maps to infinity, when the corners lie on
/// both sides of the line at infinity, or when the truncated extent is empty.
pub fn forward_bounds(m: &Mat33, src_size: ImageSize) -> Result<WarpBounds, WarpError> {
    let corners = quad::image_corners(src_size.width as f64, src_size.height as f64);

    let ws = corners.map(|c| m[2][0] * c.x + m[2][1] * c.y + m[2][2]);
    let all_positive = ws.iter().all(|&w| w > 0.0);
    let all_negative = ws.iter().all(|&w| w < 0.0);
    if !(all_positive || all_negative) {
        return Err(WarpError::InvalidExtent(format!(
            "corners cross the line at infinity (w = {ws:?})"
        )));
    }

    let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for c in corners {
        let p = quad::forward_map(m, c);
        min = Point2::new(min.x.min(p.x), min.y.min(p.y));
        max = Point2::new(max.x.max(p.x), max.y.max(p.y));
    }

    if ![min.x, min.y, max.x, max.y].iter().all(|v| v.is_finite()) {
        return Err(WarpError::InvalidExtent(format!(
            "bounding box is not finite ({min:?}, {max:?})"
        )));
    }

    // truncate the difference, not the bounds
    let width = snap(max.x - min.x).trunc();
    let height = snap(max.y - min.y).trunc();
    if width < 1.0 || height < 1.0 {
        return Err(WarpError::InvalidExtent(format!(
            "empty output {width}x{height}"
        )));
    }

    Ok(WarpBounds {
        min,
        max,
        size: ImageSize {
            width: width as usize,
            height: height as usize,
        },
    })
}

// offset of the output origin relative to the frame, truncated in display space
fn placement(min: f64, frame_origin: i32) -> Result<i32, WarpError> {
    let display = snap(min + frame_origin as f64).trunc();
    let offset = display - frame_origin as f64;
    if offset < i32::MIN as f64 || offset > i32::MAX as f64 {
        return Err(WarpError::InvalidExtent(format!(
            "placement {offset} out of range"
        )));
    }
    Ok(offset as i32)
}

/// Warp `src` through the forward transform `m` by inverse mapping.
///
/// The output is sized to the bounding box of the forward-mapped source corners. Its pixel
/// `(0, 0)` sits at `offset` in the transform's frame, where `offset` is the bounding box
/// minimum truncated in the display space anchored at `frame_origin`. Output pixel `(x, y)`
/// is shifted to `(x + offset[0], y + offset[1])` before it is mapped back through `m⁻¹`,
/// then rounded to the nearest source pixel and copied verbatim, or set to transparent when
/// it lands outside the source.
///
/// The result depends only on the inputs, so repeated calls produce identical buffers.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `m` - The 3x3 perspective transformation matrix src -> dst.
/// * `frame_origin` - Display position of the transform's frame origin.
/// * `options` - Execution strategy and allocation cap.
///
/// # Errors
///
/// * [`WarpError::InvalidExtent`] for empty, unbounded or oversized output.
/// * [`WarpError::Geometry`] when `m` is not invertible.
pub fn warp_perspective(
    src: &PixelBuffer,
    m: &Mat33,
    frame_origin: [i32; 2],
    options: &WarpOptions,
) -> Result<WarpedImage, WarpError> {
    let bounds = forward_bounds(m, src.size())?;

    let area = bounds.size.width.saturating_mul(bounds.size.height);
    if area > options.max_output_pixels {
        return Err(WarpError::InvalidExtent(format!(
            "{} exceeds the limit of {} pixels",
            bounds.size, options.max_output_pixels
        )));
    }

    let inv_m = linalg::invert_mat33(m)?;

    let offset = [
        placement(bounds.min.x, frame_origin[0])?,
        placement(bounds.min.y, frame_origin[1])?,
    ];

    let mut dst = PixelBuffer::create(bounds.size.height, bounds.size.width, false)?;

    let (src_cols, src_rows) = (src.cols(), src.rows());
    let (src_w, src_h) = (src_cols as f64, src_rows as f64);
    let src_pixels = src.as_slice();
    let (ox, oy) = (offset[0] as f64, offset[1] as f64);

    parallel::par_iter_rows_mut(
        dst.as_slice_mut(),
        bounds.size.width,
        options.strategy,
        |y, row| {
            let ly = y as f64 + oy;
            for (x, pixel) in row.iter_mut().enumerate() {
                let (u, v) = linalg::transform_point(&inv_m, x as f64 + ox, ly);
                let (u, v) = (u.round(), v.round());

                // NaN fails every comparison and ends up transparent
                *pixel = if u >= 0.0 && v >= 0.0 && u < src_w && v < src_h {
                    src_pixels[v as usize * src_cols + u as usize]
                } else {
                    Rgba8::TRANSPARENT
                };
            }
        },
    )?;

    log::debug!(
        "warped {} -> {} at offset {:?} (bounds {:?} .. {:?})",
        src.size(),
        bounds.size,
        offset,
        bounds.min,
        bounds.max
    );

    Ok(WarpedImage { image: dst, offset })
}

#[cfg(test)]
mod tests {
    use super::*;
    use projwarp_geometry::{linalg::IDENTITY, GeometryError};

    const R: Rgba8 = Rgba8::new(255, 0, 0, 255);
    const G: Rgba8 = Rgba8::new(0, 255, 0, 255);
    const B: Rgba8 = Rgba8::new(0, 0, 255, 255);
    const W: Rgba8 = Rgba8::new(255, 255, 255, 255);

    fn gradient(width: usize, height: usize) -> Result<PixelBuffer, WarpError> {
        let data = (0..width * height)
            .map(|i| Rgba8::new((i % 251) as u8, (i / width) as u8, (i % width) as u8, 255))
            .collect();
        Ok(PixelBuffer::new(ImageSize { width, height }, data)?)
    }

    #[test]
    fn warp_identity_is_lossless() -> Result<(), WarpError> {
        for (w, h) in [(1, 1), (2, 3), (7, 5), (16, 9)] {
            let src = gradient(w, h)?;
            let warped = warp_perspective(&src, &IDENTITY, [0, 0], &WarpOptions::default())?;
            assert_eq!(warped.image, src);
            assert_eq!(warped.offset, [0, 0]);
        }
        Ok(())
    }

    #[test]
    fn warp_identity_2x2() -> Result<(), WarpError> {
        let src = PixelBuffer::new(ImageSize { width: 2, height: 2 }, vec![R, G, B, W])?;
        let warped = warp_perspective(&src, &IDENTITY, [0, 0], &WarpOptions::default())?;
        assert_eq!(warped.image.size(), ImageSize { width: 2, height: 2 });
        assert_eq!(warped.image.get(0, 0), Some(&R));
        assert_eq!(warped.image.get(0, 1), Some(&G));
        assert_eq!(warped.image.get(1, 0), Some(&B));
        assert_eq!(warped.image.get(1, 1), Some(&W));
        Ok(())
    }

    #[test]
    fn warp_translation_keeps_extent() -> Result<(), WarpError> {
        let src = gradient(6, 4)?;
        let m = linalg::translation(5.0, 3.0);
        let warped = warp_perspective(&src, &m, [0, 0], &WarpOptions::default())?;
        assert_eq!(warped.image.size(), src.size());
        assert_eq!(warped.offset, [5, 3]);
        assert_eq!(warped.image, src);
        Ok(())
    }

    #[test]
    fn warp_scale_2x() -> Result<(), WarpError> {
        let src = PixelBuffer::create(10, 10, true)?;
        let m = linalg::scaling(2.0, 2.0);
        let warped = warp_perspective(&src, &m, [0, 0], &WarpOptions::default())?;
        assert_eq!(warped.image.size(), ImageSize { width: 20, height: 20 });

        // the last row and column pull back to 9.5, which rounds to 10 and leaves the source
        for y in 0..20 {
            for x in 0..20 {
                let expected = if x < 19 && y < 19 { 255 } else { 0 };
                assert_eq!(warped.image.get_pixel(x, y)?.a, expected, "pixel ({x}, {y})");
            }
        }
        Ok(())
    }

    #[test]
    fn warp_out_of_bounds_is_transparent() -> Result<(), WarpError> {
        let src = gradient(12, 8)?;
        let m = [[0.9, 0.3, 4.0], [-0.2, 1.1, 6.0], [0.004, -0.003, 1.0]];
        let warped = warp_perspective(&src, &m, [0, 0], &WarpOptions::default())?;
        let inv_m = linalg::invert_mat33(&m)?;

        let mut transparent = 0;
        for y in 0..warped.image.height() {
            for x in 0..warped.image.width() {
                let (u, v) = linalg::transform_point(
                    &inv_m,
                    (x as i32 + warped.offset[0]) as f64,
                    (y as i32 + warped.offset[1]) as f64,
                );
                let (u, v) = (u.round(), v.round());
                let pixel = warped.image.get_pixel(x, y)?;
                if u < 0.0 || v < 0.0 || u >= 12.0 || v >= 8.0 {
                    assert_eq!(pixel, Rgba8::TRANSPARENT);
                    transparent += 1;
                } else {
                    assert_eq!(pixel, src.get_pixel(u as usize, v as usize)?);
                }
            }
        }
        assert!(transparent > 0);
        Ok(())
    }

    #[test]
    fn warp_is_idempotent() -> Result<(), WarpError> {
        let src = gradient(9, 7)?;
        let m = [[1.2, -0.1, 2.0], [0.05, 0.8, -3.0], [0.01, 0.002, 1.0]];
        let a = warp_perspective(&src, &m, [4, -2], &WarpOptions::default())?;
        let b = warp_perspective(&src, &m, [4, -2], &WarpOptions::default())?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn warp_strategies_agree() -> Result<(), WarpError> {
        let src = gradient(9, 7)?;
        let m = [[1.2, -0.1, 2.0], [0.05, 0.8, -3.0], [0.01, 0.002, 1.0]];
        let mut options = WarpOptions::default();
        let parallel = warp_perspective(&src, &m, [0, 0], &options)?;
        options.strategy = ExecutionStrategy::Serial;
        let serial = warp_perspective(&src, &m, [0, 0], &options)?;
        options.strategy = ExecutionStrategy::Fixed(3);
        let fixed = warp_perspective(&src, &m, [0, 0], &options)?;
        assert_eq!(parallel, serial);
        assert_eq!(parallel, fixed);
        Ok(())
    }

    #[test]
    fn warp_empty_extent() -> Result<(), WarpError> {
        let src = PixelBuffer::create(10, 10, true)?;
        let m = linalg::scaling(0.05, 1.0);
        let res = warp_perspective(&src, &m, [0, 0], &WarpOptions::default());
        assert!(matches!(res, Err(WarpError::InvalidExtent(_))));
        Ok(())
    }

    #[test]
    fn warp_non_invertible() -> Result<(), WarpError> {
        let src = PixelBuffer::create(10, 10, true)?;
        let m = [[1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        let res = warp_perspective(&src, &m, [0, 0], &WarpOptions::default());
        assert!(matches!(
            res,
            Err(WarpError::Geometry(GeometryError::NonInvertibleMatrix(_)))
        ));
        Ok(())
    }

    #[test]
    fn warp_crossing_infinity() -> Result<(), WarpError> {
        let src = PixelBuffer::create(10, 10, true)?;
        let m = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [-0.2, 0.0, 1.0]];
        let res = warp_perspective(&src, &m, [0, 0], &WarpOptions::default());
        assert!(matches!(res, Err(WarpError::InvalidExtent(_))));
        Ok(())
    }

    #[test]
    fn warp_output_cap() -> Result<(), WarpError> {
        let src = PixelBuffer::create(10, 10, true)?;
        let options = WarpOptions {
            max_output_pixels: 99,
            ..Default::default()
        };
        let res = warp_perspective(&src, &IDENTITY, [0, 0], &options);
        assert!(matches!(res, Err(WarpError::InvalidExtent(_))));
        Ok(())
    }

    #[test]
    fn bounds_truncate_difference() -> Result<(), WarpError> {
        let m = linalg::mat33_mul(&linalg::translation(0.7, 0.2), &linalg::scaling(1.5, 1.0));
        let bounds = forward_bounds(&m, [3, 2].into())?;
        // 4.5 wide, 2 high
        assert_eq!(bounds.size, ImageSize { width: 4, height: 2 });
        assert_eq!(bounds.min, Point2::new(0.7, 0.2));
        Ok(())
    }

    #[test]
    fn placement_truncates_in_display_space() -> Result<(), WarpError> {
        let src = PixelBuffer::create(4, 4, true)?;
        let m = linalg::translation(-0.5, 0.0);
        let at_origin = warp_perspective(&src, &m, [0, 0], &WarpOptions::default())?;
        assert_eq!(at_origin.offset, [0, 0]);
        let shifted = warp_perspective(&src, &m, [10, 0], &WarpOptions::default())?;
        assert_eq!(shifted.offset, [-1, 0]);
        Ok(())
    }
}
