use super::error::{DecodeError, Result};
use super::metadata::ImageMetadata;
use tracing::{debug, warn};

#[inline]
pub fn validate_dimensions(metadata: &ImageMetadata) -> Result<()> {
    if !metadata.dimensions.is_valid() {
        return Err(DecodeError::malformed(
            0,
            format!("image dimensions {} must be positive", metadata.dimensions),
        ));
    }

    Ok(())
}

#[inline]
pub fn validate_samples_per_pixel(metadata: &ImageMetadata) -> Result<()> {
    if metadata.samples_per_pixel != 1 {
        return Err(DecodeError::UnsupportedFormat(format!(
            "{} samples per pixel ({}), only single-sample grayscale is supported",
            metadata.samples_per_pixel, metadata.photometric_interpretation
        )));
    }

    if !metadata.photometric_interpretation.is_grayscale() {
        warn!(
            photometric = %metadata.photometric_interpretation,
            "rendering single-sample image as grayscale"
        );
    } else if metadata.photometric_interpretation.is_inverted() {
        debug!("MONOCHROME1 image, shown without inversion");
    }

    Ok(())
}

pub fn validate_metadata(metadata: &ImageMetadata) -> Result<()> {
    validate_dimensions(metadata)?;
    validate_samples_per_pixel(metadata)?;
    Ok(())
}
