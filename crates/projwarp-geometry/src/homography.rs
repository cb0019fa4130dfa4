use faer::prelude::SpSolver;

use crate::{
    error::GeometryError,
    linalg::{self, Mat33},
    quad::{self, Point2},
};

// relative area below which three correspondences count as collinear
const COLLINEAR_TOL: f64 = 1e-10;

// relative reprojection error accepted from the linear solve
const REPROJECTION_TOL: f64 = 1e-6;

// below this magnitude the solved transform is taken as singular
const DET_EPS: f64 = 1e-12;

/// Compute the homography matrix from four 2d point correspondences.
///
/// Builds the 8x8 system of the planar homography
///
/// ```text
/// dx = (a*sx + b*sy + c) / (g*sx + h*sy + 1)
/// dy = (d*sx + e*sy + f) / (g*sx + h*sy + 1)
/// ```
///
/// and solves it with a partially pivoted LU decomposition. The result is normalized so that
/// the bottom right entry is 1.
///
/// # Arguments
///
/// * `src` - The source points.
/// * `dst` - The destination points.
///
/// # Errors
///
/// Returns [`GeometryError::SingularSystem`] when three of the points in either set are
/// collinear or coincident, or when the solution does not reproduce the correspondences.
pub fn homography_4pt2d(src: &[Point2; 4], dst: &[Point2; 4]) -> Result<Mat33, GeometryError> {
    if quad::has_collinear_triple(src, COLLINEAR_TOL)
        || quad::has_collinear_triple(dst, COLLINEAR_TOL)
    {
        return Err(GeometryError::SingularSystem);
    }

    // construct the augmented matrix [A | -b]
    let mut m_mat = faer::Mat::<f64>::zeros(8, 9);
    for i in 0..4 {
        let (s, d) = (src[i], dst[i]);
        // SAFETY: rows 2i and 2i + 1 are below 8 and every column index is below 9
        unsafe {
            m_mat.write_unchecked(2 * i, 0, s.x);
            m_mat.write_unchecked(2 * i, 1, s.y);
            m_mat.write_unchecked(2 * i, 2, 1.0);
            m_mat.write_unchecked(2 * i, 6, -d.x * s.x);
            m_mat.write_unchecked(2 * i, 7, -d.x * s.y);
            m_mat.write_unchecked(2 * i, 8, -d.x);

            m_mat.write_unchecked(2 * i + 1, 3, s.x);
            m_mat.write_unchecked(2 * i + 1, 4, s.y);
            m_mat.write_unchecked(2 * i + 1, 5, 1.0);
            m_mat.write_unchecked(2 * i + 1, 6, -d.y * s.x);
            m_mat.write_unchecked(2 * i + 1, 7, -d.y * s.y);
            m_mat.write_unchecked(2 * i + 1, 8, -d.y);
        }
    }

    // solve -> h_mat: 8x1
    let h_mat = m_mat
        .submatrix(0, 0, 8, 8)
        .partial_piv_lu()
        .solve(-m_mat.submatrix(0, 8, 8, 1));
    let h = h_mat.col(0);

    let homo = [
        [h[0], h[1], h[2]],
        [h[3], h[4], h[5]],
        [h[6], h[7], 1.0],
    ];

    check_solution(&homo, src, dst)?;

    log::debug!("homography solved: {homo:?}");

    Ok(homo)
}

// the LU does not report conditioning, so the solution itself is checked
fn check_solution(
    homo: &Mat33,
    src: &[Point2; 4],
    dst: &[Point2; 4],
) -> Result<(), GeometryError> {
    if !linalg::is_finite_mat33(homo) {
        return Err(GeometryError::SingularSystem);
    }

    if linalg::det_mat33(homo).abs() < DET_EPS {
        return Err(GeometryError::SingularSystem);
    }

    for (s, d) in src.iter().zip(dst.iter()) {
        let p = quad::forward_map(homo, *s);
        let tol = REPROJECTION_TOL * (1.0 + d.x.abs().max(d.y.abs()));
        if !((p.x - d.x).abs() <= tol && (p.y - d.y).abs() <= tol) {
            return Err(GeometryError::SingularSystem);
        }
    }

    Ok(())
}

/// The result of a homography estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomographyEstimate {
    /// The source to destination transform, with `matrix[2][2] == 1`.
    pub matrix: Mat33,
    /// The source image centre mapped through `matrix`.
    pub center: Point2,
}

/// Estimates the projective transform that moves the corners of an image onto four
/// destination points.
///
/// Destination points are expressed in the layer's local frame, that is with the raster
/// origin already subtracted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomographyEstimator {
    src: [Point2; 4],
    center: Point2,
}

impl HomographyEstimator {
    /// Create an estimator from arbitrary source corners and the centre to track.
    pub fn new(src: [Point2; 4], center: Point2) -> Self {
        Self { src, center }
    }

    /// Create an estimator for the corners `(0,0), (W,0), (W,H), (0,H)` of an image.
    pub fn from_image_size(width: usize, height: usize) -> Self {
        let (w, h) = (width as f64, height as f64);
        Self::new(quad::image_corners(w, h), quad::image_center(w, h))
    }

    /// The source corners in winding order.
    pub fn source_corners(&self) -> &[Point2; 4] {
        &self.src
    }

    /// Solve for the transform mapping the source corners onto `dst`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::SingularSystem`] for degenerate destination quads.
    ///
    /// # Examples
    ///
    /// ```
    /// use projwarp_geometry::{HomographyEstimator, Point2};
    ///
    /// let estimator = HomographyEstimator::from_image_size(10, 10);
    /// let dst = [
    ///     Point2::new(0.0, 0.0),
    ///     Point2::new(20.0, 0.0),
    ///     Point2::new(20.0, 20.0),
    ///     Point2::new(0.0, 20.0),
    /// ];
    ///
    /// let estimate = estimator.estimate(&dst).unwrap();
    ///
    /// assert!((estimate.matrix[0][0] - 2.0).abs() < 1e-9);
    /// assert!((estimate.center.x - 10.0).abs() < 1e-9);
    /// ```
    pub fn estimate(&self, dst: &[Point2; 4]) -> Result<HomographyEstimate, GeometryError> {
        let matrix = homography_4pt2d(&self.src, dst)?;
        let center = quad::forward_map(&matrix, self.center);
        Ok(HomographyEstimate { matrix, center })
    }
}
