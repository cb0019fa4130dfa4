/// An error type for the geometry module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum GeometryError {
    /// The point correspondences do not define a unique homography.
    #[error("Homography system is singular or ill-conditioned")]
    SingularSystem,

    /// The matrix cannot be inverted.
    #[error("Matrix is not invertible (determinant {0})")]
    NonInvertibleMatrix(f64),
}
