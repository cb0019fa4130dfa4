/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the requested extent has a zero dimension.
    #[error("Invalid image size ({0}x{1}), width and height must be greater than zero")]
    InvalidImageSize(usize, usize),

    /// Error when the data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the number of interleaved channels cannot be mapped to RGBA.
    #[error("Unsupported number of channels ({0})")]
    UnsupportedChannelCount(usize),

    /// Error when the pixel coordinates are out of bounds.
    #[error("Pixel coordinates ({0}, {1}) are out of bounds ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),
}
