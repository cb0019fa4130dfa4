use std::path::Path;

use projwarp_image::PixelBuffer;

use crate::error::IoError;

/// Reads an image from the given file path.
///
/// The method tries to read from any image format supported by the image crate. Gray, gray
/// with alpha, RGB and RGBA 8 bit images keep their channel layout on the way into
/// [`PixelBuffer::from_interleaved`]; every other layout is converted to RGBA 8 bit first.
///
/// The file stores its top scanline first, so row 0 of the returned buffer is the bottom
/// scanline of the file.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// A pixel buffer with the image data.
pub fn read_image(file_path: impl AsRef<Path>) -> Result<PixelBuffer, IoError> {
    let file_path = file_path.as_ref().to_owned();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let data = std::fs::read(&file_path)?;

    let img = image::ImageReader::new(std::io::Cursor::new(&data))
        .with_guessed_format()?
        .decode()?;

    let (width, height) = (img.width() as usize, img.height() as usize);
    let color = img.color();

    let (bytes, channels) = match color {
        image::ColorType::L8 => (img.into_luma8().into_raw(), 1),
        image::ColorType::La8 => (img.into_luma_alpha8().into_raw(), 2),
        image::ColorType::Rgb8 => (img.into_rgb8().into_raw(), 3),
        _ => (img.into_rgba8().into_raw(), 4),
    };

    log::debug!(
        "read {}: {width}x{height} {color:?} as {channels} channels",
        file_path.display()
    );

    Ok(PixelBuffer::from_interleaved(&bytes, width, height, channels)?)
}

/// Writes a pixel buffer to the given file path as an RGBA PNG.
///
/// Scanlines are written in reverse so that the file reads upright.
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
/// * `image` - The pixel buffer to write.
pub fn write_image_png(file_path: impl AsRef<Path>, image: &PixelBuffer) -> Result<(), IoError> {
    let (width, height) = (image.width(), image.height());
    let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
        return Err(IoError::ImageTooLarge(width, height));
    };

    let stride = width * 4;
    let mut buf = Vec::with_capacity(stride * height);
    for row in image.as_bytes().chunks_exact(stride).rev() {
        buf.extend_from_slice(row);
    }

    image::save_buffer_with_format(
        file_path,
        &buf,
        w,
        h,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )?;

    Ok(())
}
