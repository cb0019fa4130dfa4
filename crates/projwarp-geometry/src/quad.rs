use crate::linalg::{self, Mat33};

/// A 2d point with floating point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point2 {
    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Shift the point by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<[f64; 2]> for Point2 {
    fn from(p: [f64; 2]) -> Self {
        Point2::new(p[0], p[1])
    }
}

/// The corners of an image quad in their fixed winding order.
///
/// Row 0 of a pixel buffer is the first scanline of the display's y-up frame, so the
/// corner at the origin is the lower left one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    /// `(0, 0)`
    LowerLeft = 0,
    /// `(W, 0)`
    LowerRight = 1,
    /// `(W, H)`
    UpperRight = 2,
    /// `(0, H)`
    UpperLeft = 3,
}

impl Corner {
    /// All corners in winding order.
    pub const ALL: [Corner; 4] = [
        Corner::LowerLeft,
        Corner::LowerRight,
        Corner::UpperRight,
        Corner::UpperLeft,
    ];

    /// Position of the corner in a quad array.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The four corners of a `width x height` image in winding order.
pub fn image_corners(width: f64, height: f64) -> [Point2; 4] {
    [
        Point2::new(0.0, 0.0),
        Point2::new(width, 0.0),
        Point2::new(width, height),
        Point2::new(0.0, height),
    ]
}

/// The centre of a `width x height` image.
pub fn image_center(width: f64, height: f64) -> Point2 {
    Point2::new(width / 2.0, height / 2.0)
}

/// Forward map a point through `m`, normalized by the homogeneous coordinate.
pub fn forward_map(m: &Mat33, p: Point2) -> Point2 {
    let (x, y) = linalg::transform_point(m, p.x, p.y);
    Point2::new(x, y)
}

/// Forward map the corners and centre of a `width x height` image through `m` and shift the
/// result by `origin`.
///
/// The returned array holds the four corners in winding order followed by the centre.
pub fn bound_points(m: &Mat33, width: f64, height: f64, origin: Point2) -> [Point2; 5] {
    let corners = image_corners(width, height);
    let center = image_center(width, height);

    let mut points = [Point2::default(); 5];
    for (dst, src) in points
        .iter_mut()
        .zip(corners.iter().chain(std::iter::once(&center)))
    {
        *dst = forward_map(m, *src).offset(origin.x, origin.y);
    }
    points
}

/// Twice the signed area of the triangle `(a, b, c)`.
pub(crate) fn cross(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Check whether any three of the four points are collinear (or coincident).
///
/// `tol` is relative to the squared extent of the points.
pub(crate) fn has_collinear_triple(pts: &[Point2; 4], tol: f64) -> bool {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in pts {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let span = (max_x - min_x).max(max_y - min_y);
    let eps = tol * (span * span).max(1.0);

    const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
    TRIPLES.iter().any(|&[i, j, k]| {
        let area = cross(&pts[i], &pts[j], &pts[k]);
        // NaN coordinates count as degenerate
        !(area.abs() > eps)
    })
}
