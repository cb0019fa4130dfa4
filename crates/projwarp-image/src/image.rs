use crate::error::ImageError;

/// Image size in pixels
///
/// # Examples
///
/// ```
/// use projwarp_image::ImageSize;
///
/// let size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(size.width, 10);
/// assert_eq!(size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by this size.
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// A 4 channel, 8 bit pixel.
///
/// The layout is exactly four bytes in `r, g, b, a` order so that a slice of pixels can be
/// handed to a renderer as a flat byte sequence.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Rgba8 {
    /// Fully transparent pixel, used for samples that fall outside the source.
    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);

    /// Opaque black, the value of freshly initialized buffers.
    pub const OPAQUE_BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);

    /// Create a pixel from its four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The channels as an array.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from(c: [u8; 4]) -> Self {
        Rgba8::new(c[0], c[1], c[2], c[3])
    }
}

/// A rectangular grid of [`Rgba8`] pixels stored row-major in one contiguous allocation.
///
/// Pixel `(row, col)` lives at index `row * width + col`. A buffer is never empty: both
/// dimensions are checked to be non-zero at construction, and "no image" is represented by
/// `Option<PixelBuffer>` at the owner. Memory is released when the buffer is dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    size: ImageSize,
    data: Vec<Rgba8>,
}

impl PixelBuffer {
    /// Create a new buffer from pixel data.
    ///
    /// # Errors
    ///
    /// Fails if either dimension is zero or if the data length does not match the size.
    ///
    /// # Examples
    ///
    /// ```
    /// use projwarp_image::{ImageSize, PixelBuffer, Rgba8};
    ///
    /// let buffer = PixelBuffer::new(
    ///     ImageSize { width: 2, height: 1 },
    ///     vec![Rgba8::OPAQUE_BLACK; 2],
    /// ).unwrap();
    ///
    /// assert_eq!(buffer.width(), 2);
    /// assert_eq!(buffer.height(), 1);
    /// ```
    pub fn new(size: ImageSize, data: Vec<Rgba8>) -> Result<Self, ImageError> {
        if size.width == 0 || size.height == 0 {
            return Err(ImageError::InvalidImageSize(size.width, size.height));
        }

        if data.len() != size.area() {
            return Err(ImageError::InvalidChannelShape(data.len(), size.area()));
        }

        Ok(Self { size, data })
    }

    /// Create a new buffer with every pixel set to `val`.
    pub fn from_size_val(size: ImageSize, val: Rgba8) -> Result<Self, ImageError> {
        Self::new(size, vec![val; size.area()])
    }

    /// Allocate a `rows x cols` buffer.
    ///
    /// With `init_values` every pixel is opaque black; otherwise the contents are meant to be
    /// overwritten by the caller and start out zeroed.
    pub fn create(rows: usize, cols: usize, init_values: bool) -> Result<Self, ImageError> {
        let val = if init_values {
            Rgba8::OPAQUE_BLACK
        } else {
            Rgba8::default()
        };
        Self::from_size_val(
            ImageSize {
                width: cols,
                height: rows,
            },
            val,
        )
    }

    /// Deep copy the first `rows * cols` pixels of `src` into a new buffer.
    ///
    /// # Errors
    ///
    /// Fails if `src` holds fewer than `rows * cols` pixels.
    pub fn copy_from(src: &[Rgba8], rows: usize, cols: usize) -> Result<Self, ImageError> {
        let len = rows * cols;
        if src.len() < len {
            return Err(ImageError::InvalidChannelShape(src.len(), len));
        }

        Self::new(
            ImageSize {
                width: cols,
                height: rows,
            },
            src[..len].to_vec(),
        )
    }

    /// Build a buffer from `height` scanlines of `width` pixels of `channels` interleaved
    /// samples, stored bottom scanline first.
    ///
    /// Scanline 0 of the result is the last scanline of `bytes`. Channel mapping:
    ///
    /// * 1 channel: gray replicated to r, g and b, alpha 255.
    /// * 2 channels: gray and alpha.
    /// * 3 channels: r, g, b with alpha 255.
    /// * 4 or more: r, g, b, a from the first four samples; extra samples are skipped.
    ///
    /// # Errors
    ///
    /// Fails on zero dimensions, zero channels or when `bytes` is shorter than
    /// `width * height * channels`.
    ///
    /// # Examples
    ///
    /// ```
    /// use projwarp_image::{PixelBuffer, Rgba8};
    ///
    /// // two scanlines of one gray pixel each, bottom scanline first
    /// let buffer = PixelBuffer::from_interleaved(&[10, 20], 1, 2, 1).unwrap();
    ///
    /// assert_eq!(buffer.get(0, 0), Some(&Rgba8::new(20, 20, 20, 255)));
    /// assert_eq!(buffer.get(1, 0), Some(&Rgba8::new(10, 10, 10, 255)));
    /// ```
    pub fn from_interleaved(
        bytes: &[u8],
        width: usize,
        height: usize,
        channels: usize,
    ) -> Result<Self, ImageError> {
        if channels == 0 {
            return Err(ImageError::UnsupportedChannelCount(channels));
        }

        if width == 0 || height == 0 {
            return Err(ImageError::InvalidImageSize(width, height));
        }

        let expected = width * height * channels;
        if bytes.len() < expected {
            return Err(ImageError::InvalidChannelShape(bytes.len(), expected));
        }

        let stride = width * channels;
        let mut data = Vec::with_capacity(width * height);

        for src_row in bytes[..expected].chunks_exact(stride).rev() {
            data.extend(src_row.chunks_exact(channels).map(|s| match channels {
                1 => Rgba8::new(s[0], s[0], s[0], 255),
                2 => Rgba8::new(s[0], s[0], s[0], s[1]),
                3 => Rgba8::new(s[0], s[1], s[2], 255),
                _ => Rgba8::new(s[0], s[1], s[2], s[3]),
            }));
        }

        Self::new(ImageSize { width, height }, data)
    }

    /// Get the size of the buffer in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the width of the buffer in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the buffer in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of columns of the buffer.
    pub fn cols(&self) -> usize {
        self.width()
    }

    /// Get the number of rows of the buffer.
    pub fn rows(&self) -> usize {
        self.height()
    }

    /// Get the pixels as a flat row-major slice.
    pub fn as_slice(&self) -> &[Rgba8] {
        &self.data
    }

    /// Get the pixels as a flat mutable row-major slice.
    pub fn as_slice_mut(&mut self) -> &mut [Rgba8] {
        &mut self.data
    }

    /// View the pixels as `width * height * 4` interleaved bytes.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: Rgba8 is repr(C) with four u8 fields, so it has size 4, alignment 1 and
        // no padding. The returned slice borrows `self.data` for its whole lifetime.
        unsafe {
            std::slice::from_raw_parts(self.data.as_ptr() as *const u8, self.data.len() * 4)
        }
    }

    /// Get the contiguous pixels of row `row`.
    pub fn row(&self, row: usize) -> Option<&[Rgba8]> {
        if row >= self.height() {
            return None;
        }
        let start = row * self.width();
        Some(&self.data[start..start + self.width()])
    }

    /// Get the pixel at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<&Rgba8> {
        if row >= self.height() || col >= self.width() {
            return None;
        }
        self.data.get(row * self.width() + col)
    }

    /// Get a mutable reference to the pixel at `(row, col)`.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Rgba8> {
        if row >= self.height() || col >= self.width() {
            return None;
        }
        let width = self.width();
        self.data.get_mut(row * width + col)
    }

    /// Get the pixel at column `x` and row `y`.
    pub fn get_pixel(&self, x: usize, y: usize) -> Result<Rgba8, ImageError> {
        self.get(y, x)
            .copied()
            .ok_or(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ))
    }

    /// Set the pixel at column `x` and row `y`.
    pub fn set_pixel(&mut self, x: usize, y: usize, val: Rgba8) -> Result<(), ImageError> {
        let (width, height) = (self.width(), self.height());
        let pixel = self
            .get_mut(y, x)
            .ok_or(ImageError::PixelIndexOutOfBounds(x, y, width, height))?;
        *pixel = val;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_zero_init() -> Result<(), ImageError> {
        let buffer = PixelBuffer::create(3, 2, true)?;
        assert_eq!(buffer.size(), ImageSize { width: 2, height: 3 });
        assert!(buffer.as_slice().iter().all(|p| *p == Rgba8::OPAQUE_BLACK));
        Ok(())
    }

    #[test]
    fn create_invalid_extent() {
        assert_eq!(
            PixelBuffer::create(0, 4, true),
            Err(ImageError::InvalidImageSize(4, 0))
        );
        assert_eq!(
            PixelBuffer::create(4, 0, false),
            Err(ImageError::InvalidImageSize(0, 4))
        );
    }

    #[test]
    fn new_length_mismatch() {
        let res = PixelBuffer::new(ImageSize { width: 2, height: 2 }, vec![Rgba8::default(); 3]);
        assert_eq!(res, Err(ImageError::InvalidChannelShape(3, 4)));
    }

    #[test]
    fn copy_is_deep() -> Result<(), ImageError> {
        let mut src = PixelBuffer::create(2, 2, true)?;
        src.set_pixel(1, 0, Rgba8::new(1, 2, 3, 4))?;

        let mut copy = PixelBuffer::copy_from(src.as_slice(), 2, 2)?;
        assert_eq!(copy, src);

        copy.set_pixel(1, 0, Rgba8::new(9, 9, 9, 9))?;
        assert_eq!(src.get_pixel(1, 0)?, Rgba8::new(1, 2, 3, 4));
        Ok(())
    }

    #[test]
    fn copy_short_source() {
        let src = vec![Rgba8::default(); 3];
        assert_eq!(
            PixelBuffer::copy_from(&src, 2, 2),
            Err(ImageError::InvalidChannelShape(3, 4))
        );
    }

    #[test]
    fn interleaved_rgb_is_flipped() -> Result<(), ImageError> {
        // 2x2 rgb, bottom scanline first
        #[rustfmt::skip]
        let bytes = [
            1, 1, 1,   2, 2, 2,
            3, 3, 3,   4, 4, 4,
        ];
        let buffer = PixelBuffer::from_interleaved(&bytes, 2, 2, 3)?;
        assert_eq!(buffer.get(0, 0), Some(&Rgba8::new(3, 3, 3, 255)));
        assert_eq!(buffer.get(0, 1), Some(&Rgba8::new(4, 4, 4, 255)));
        assert_eq!(buffer.get(1, 0), Some(&Rgba8::new(1, 1, 1, 255)));
        assert_eq!(buffer.get(1, 1), Some(&Rgba8::new(2, 2, 2, 255)));
        Ok(())
    }

    #[test]
    fn interleaved_channel_mapping() -> Result<(), ImageError> {
        let gray = PixelBuffer::from_interleaved(&[7], 1, 1, 1)?;
        assert_eq!(gray.get_pixel(0, 0)?, Rgba8::new(7, 7, 7, 255));

        let gray_alpha = PixelBuffer::from_interleaved(&[7, 100], 1, 1, 2)?;
        assert_eq!(gray_alpha.get_pixel(0, 0)?, Rgba8::new(7, 7, 7, 100));

        let rgba = PixelBuffer::from_interleaved(&[1, 2, 3, 4], 1, 1, 4)?;
        assert_eq!(rgba.get_pixel(0, 0)?, Rgba8::new(1, 2, 3, 4));

        let extra = PixelBuffer::from_interleaved(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10], 2, 1, 5)?;
        assert_eq!(extra.get_pixel(0, 0)?, Rgba8::new(1, 2, 3, 4));
        assert_eq!(extra.get_pixel(1, 0)?, Rgba8::new(6, 7, 8, 9));
        Ok(())
    }

    #[test]
    fn interleaved_missing_data() {
        assert_eq!(
            PixelBuffer::from_interleaved(&[], 2, 2, 3),
            Err(ImageError::InvalidChannelShape(0, 12))
        );
        assert_eq!(
            PixelBuffer::from_interleaved(&[0; 4], 2, 2, 0),
            Err(ImageError::UnsupportedChannelCount(0))
        );
    }

    #[test]
    fn bytes_are_row_major() -> Result<(), ImageError> {
        let buffer = PixelBuffer::new(
            ImageSize { width: 2, height: 1 },
            vec![Rgba8::new(1, 2, 3, 4), Rgba8::new(5, 6, 7, 8)],
        )?;
        assert_eq!(buffer.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        Ok(())
    }

    #[test]
    fn pixel_access_bounds() -> Result<(), ImageError> {
        let mut buffer = PixelBuffer::create(2, 3, true)?;
        assert_eq!(
            buffer.get_pixel(3, 0),
            Err(ImageError::PixelIndexOutOfBounds(3, 0, 3, 2))
        );
        assert!(buffer.set_pixel(0, 2, Rgba8::default()).is_err());
        assert_eq!(buffer.row(1).map(|r| r.len()), Some(3));
        assert!(buffer.row(2).is_none());
        Ok(())
    }
}
