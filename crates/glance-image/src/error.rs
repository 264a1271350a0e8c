/// An error type for the image module.
#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    /// Error when the pixel data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when one of the image dimensions is zero.
    #[error("Invalid image size ({0}x{1}); both dimensions must be non-zero")]
    ZeroSizedImage(usize, usize),

    /// Error when two images are expected to have the same size.
    #[error("Images have different sizes ({0}x{1} != {2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),
}
