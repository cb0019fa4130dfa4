use crate::error::GeometryError;

/// A row-major 3x3 matrix acting on homogeneous 2d coordinates.
pub type Mat33 = [[f64; 3]; 3];

/// The identity transform.
pub const IDENTITY: Mat33 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

// below this magnitude a determinant is treated as zero
const DET_EPS: f64 = 1e-12;

/// Create a pure translation matrix.
pub fn translation(tx: f64, ty: f64) -> Mat33 {
    [[1.0, 0.0, tx], [0.0, 1.0, ty], [0.0, 0.0, 1.0]]
}

/// Create an axis aligned scaling matrix.
pub fn scaling(sx: f64, sy: f64) -> Mat33 {
    [[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, 1.0]]
}

/// Multiply a 3x3 matrix by a 3d vector.
///
/// # Arguments
///
/// * `m` - The matrix.
/// * `v` - The vector.
/// * `out` - The output vector `m * v`.
pub fn mat33_mul_vec3(m: &Mat33, v: &[f64; 3], out: &mut [f64; 3]) {
    for (row, o) in m.iter().zip(out.iter_mut()) {
        *o = row[0] * v[0] + row[1] * v[1] + row[2] * v[2];
    }
}

/// Multiply two 3x3 matrices, `a * b`.
pub fn mat33_mul(a: &Mat33, b: &Mat33) -> Mat33 {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    out
}

/// Compute the determinant of a 3x3 matrix.
#[rustfmt::skip]
pub fn det_mat33(m: &Mat33) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1]) -
    m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0]) +
    m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

#[rustfmt::skip]
fn adjugate_mat33(m: &Mat33) -> Mat33 {
    [
        [
            m[1][1] * m[2][2] - m[1][2] * m[2][1],
            m[0][2] * m[2][1] - m[0][1] * m[2][2],
            m[0][1] * m[1][2] - m[0][2] * m[1][1],
        ],
        [
            m[1][2] * m[2][0] - m[1][0] * m[2][2],
            m[0][0] * m[2][2] - m[0][2] * m[2][0],
            m[0][2] * m[1][0] - m[0][0] * m[1][2],
        ],
        [
            m[1][0] * m[2][1] - m[1][1] * m[2][0],
            m[0][1] * m[2][0] - m[0][0] * m[2][1],
            m[0][0] * m[1][1] - m[0][1] * m[1][0],
        ],
    ]
}

/// Invert a 3x3 matrix through its adjugate.
///
/// # Errors
///
/// Returns [`GeometryError::NonInvertibleMatrix`] when the determinant is zero, too small or
/// not finite.
pub fn invert_mat33(m: &Mat33) -> Result<Mat33, GeometryError> {
    let det = det_mat33(m);

    if !det.is_finite() || det.abs() < DET_EPS {
        return Err(GeometryError::NonInvertibleMatrix(det));
    }

    let adj = adjugate_mat33(m);
    let inv_det = 1.0 / det;

    let mut inv_m = [[0.0; 3]; 3];
    for (inv_row, adj_row) in inv_m.iter_mut().zip(adj.iter()) {
        for (inv, adj) in inv_row.iter_mut().zip(adj_row.iter()) {
            *inv = adj * inv_det;
        }
    }

    Ok(inv_m)
}

/// Map `(x, y)` through `m` and divide by the homogeneous coordinate.
///
/// No guard is applied to the division: points mapped to infinity come back non-finite.
pub fn transform_point(m: &Mat33, x: f64, y: f64) -> (f64, f64) {
    let mut p = [0.0; 3];
    mat33_mul_vec3(m, &[x, y, 1.0], &mut p);
    (p[0] / p[2], p[1] / p[2])
}

/// Check that every entry of the matrix is finite.
pub fn is_finite_mat33(m: &Mat33) -> bool {
    m.iter().flatten().all(|v| v.is_finite())
}
