use crate::error::ImageError;
use crate::image::{Image, ImageSize};

/// Number of bytes per pixel in the model-native buffer layout.
pub const BYTES_PER_PIXEL: usize = 4;

/// A 32-bit interleaved BGRA pixel buffer with premultiplied alpha.
///
/// This is the native representation the model's image input expects:
/// one byte per component in blue-green-red-alpha order, rows tightly
/// packed. The buffer is written once during conversion (under the
/// exclusive `&mut` borrow) and then handed to the model read-only.
#[derive(Clone)]
pub struct PixelBuffer {
    data: Vec<u8>,
    size: ImageSize,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("PixelBuffer").field("size", &self.size).finish()
    }
}

impl PixelBuffer {
    /// Allocate a zeroed buffer of exactly `width * height` BGRA pixels.
    ///
    /// # Errors
    ///
    /// If either dimension is zero, an error is returned and no buffer is
    /// allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use glance_image::{ImageSize, PixelBuffer};
    ///
    /// let buffer = PixelBuffer::new(ImageSize {
    ///     width: 4,
    ///     height: 3,
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(buffer.as_slice().len(), 4 * 3 * 4);
    /// ```
    pub fn new(size: ImageSize) -> Result<Self, ImageError> {
        if size.width == 0 || size.height == 0 {
            return Err(ImageError::ZeroSizedImage(size.width, size.height));
        }

        Ok(Self {
            data: vec![0u8; size.width * size.height * BYTES_PER_PIXEL],
            size,
        })
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

    /// Get the number of bytes per buffer row.
    pub fn bytes_per_row(&self) -> usize {
        self.size.width * BYTES_PER_PIXEL
    }

    /// Get a reference to the raw BGRA bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the raw BGRA bytes.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer and return the raw BGRA bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

/// Draw an opaque RGB8 image into a BGRA pixel buffer.
///
/// Every source pixel lands at its original coordinates with alpha 255,
/// so premultiplication is the identity and the conversion is lossless.
/// No scaling or cropping is performed.
///
/// Precondition: the input image and the output buffer must have the same size.
///
/// # Example
///
/// ```
/// use glance_image::{bgra_from_rgb8, Image, ImageSize, PixelBuffer};
///
/// let image = Image::<u8, 3>::new(
///     ImageSize {
///         width: 1,
///         height: 1,
///     },
///     vec![10, 20, 30],
/// )
/// .unwrap();
///
/// let mut buffer = PixelBuffer::new(image.size()).unwrap();
/// bgra_from_rgb8(&image, &mut buffer).unwrap();
///
/// assert_eq!(buffer.as_slice(), &[30, 20, 10, 255][..]);
/// ```
pub fn bgra_from_rgb8(src: &Image<u8, 3>, dst: &mut PixelBuffer) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.width(),
            dst.height(),
        ));
    }

    for (src_pixel, dst_pixel) in src
        .as_slice()
        .chunks_exact(3)
        .zip(dst.as_mut_slice().chunks_exact_mut(BYTES_PER_PIXEL))
    {
        dst_pixel[0] = src_pixel[2];
        dst_pixel[1] = src_pixel[1];
        dst_pixel[2] = src_pixel[0];
        dst_pixel[3] = 255;
    }

    Ok(())
}

/// Draw an RGBA8 image into a BGRA pixel buffer, premultiplying alpha.
///
/// Each color component is scaled by the pixel's alpha before being
/// stored, matching the premultiplied-alpha semantics of the buffer
/// layout. No scaling or cropping is performed.
///
/// Precondition: the input image and the output buffer must have the same size.
pub fn bgra_from_rgba8(src: &Image<u8, 4>, dst: &mut PixelBuffer) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.width(),
            dst.height(),
        ));
    }

    for (src_pixel, dst_pixel) in src
        .as_slice()
        .chunks_exact(4)
        .zip(dst.as_mut_slice().chunks_exact_mut(BYTES_PER_PIXEL))
    {
        let a = src_pixel[3] as u16;
        dst_pixel[0] = ((src_pixel[2] as u16 * a + 127) / 255) as u8;
        dst_pixel[1] = ((src_pixel[1] as u16 * a + 127) / 255) as u8;
        dst_pixel[2] = ((src_pixel[0] as u16 * a + 127) / 255) as u8;
        dst_pixel[3] = src_pixel[3];
    }

    Ok(())
}

/// Decode a BGRA pixel buffer back into an RGB8 image, dropping alpha.
///
/// For buffers produced from opaque sources this is the exact inverse of
/// [`bgra_from_rgb8`].
///
/// Precondition: the input buffer and the output image must have the same size.
pub fn rgb8_from_bgra(src: &PixelBuffer, dst: &mut Image<u8, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.cols(),
            dst.rows(),
        ));
    }

    for (src_pixel, dst_pixel) in src
        .as_slice()
        .chunks_exact(BYTES_PER_PIXEL)
        .zip(dst.as_mut_slice().chunks_exact_mut(3))
    {
        dst_pixel[0] = src_pixel[2];
        dst_pixel[1] = src_pixel[1];
        dst_pixel[2] = src_pixel[0];
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_buffer() {
        for (width, height) in [(0, 3), (4, 0), (0, 0)] {
            let buffer = PixelBuffer::new(ImageSize { width, height });
            assert!(matches!(buffer, Err(ImageError::ZeroSizedImage(..))));
        }
    }

    #[test]
    fn bgra_layout() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![1, 2, 3, 4, 5, 6],
        )?;

        let mut buffer = PixelBuffer::new(image.size())?;
        bgra_from_rgb8(&image, &mut buffer)?;

        assert_eq!(buffer.as_slice(), &[3, 2, 1, 255, 6, 5, 4, 255][..]);
        assert_eq!(buffer.bytes_per_row(), 8);

        Ok(())
    }

    #[test]
    fn opaque_round_trip() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 4,
            height: 3,
        };
        let data = (0..size.width * size.height * 3)
            .map(|i| (i * 7 % 256) as u8)
            .collect::<Vec<_>>();
        let image = Image::<u8, 3>::new(size, data.clone())?;

        let mut buffer = PixelBuffer::new(size)?;
        bgra_from_rgb8(&image, &mut buffer)?;

        let mut decoded = Image::<u8, 3>::from_size_val(size, 0u8)?;
        rgb8_from_bgra(&buffer, &mut decoded)?;

        assert_eq!(decoded.as_slice(), data.as_slice());

        Ok(())
    }

    #[test]
    fn rgba_premultiply() -> Result<(), ImageError> {
        let image = Image::<u8, 4>::new(
            ImageSize {
                width: 1,
                height: 1,
            },
            vec![200, 100, 50, 128],
        )?;

        let mut buffer = PixelBuffer::new(image.size())?;
        bgra_from_rgba8(&image, &mut buffer)?;

        // 50 * 128 / 255 = 25, 100 * 128 / 255 = 50, 200 * 128 / 255 = 100
        assert_eq!(buffer.as_slice(), &[25, 50, 100, 128][..]);

        Ok(())
    }

    #[test]
    fn size_mismatch() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            0u8,
        )?;
        let mut buffer = PixelBuffer::new(ImageSize {
            width: 3,
            height: 2,
        })?;

        let result = bgra_from_rgb8(&image, &mut buffer);
        assert!(matches!(result, Err(ImageError::InvalidImageSize(..))));

        Ok(())
    }
}
