//! DICOM file parsing and decoding
//!
//! This module turns raw DICOM bytes into a [`DecodedImage`]: header
//! metadata plus calibrated pixel samples ready for windowing.

mod error;
mod metadata;
mod parser;
mod photometric;
mod pixel_data;
mod reader;
mod transfer_syntax;
mod validation;

// Re-export public API
pub use error::{DecodeError, Result};
pub use metadata::ImageMetadata;
pub use parser::{
    DEFAULT_WINDOW_CENTER, DEFAULT_WINDOW_WIDTH, format_patient_name, parse_dicom_date, parse_sex,
};
pub use photometric::PhotometricInterpretation;
pub use reader::{DataSet, ElementRef, NumericValue};
pub use transfer_syntax::{ByteOrder, TransferSyntax};

use crate::types::{PatientInfo, PixelSpacing, StudyInfo};
use std::path::Path;
use tracing::debug;

/// One decoded source file: metadata plus calibrated samples.
///
/// Immutable once built. Samples are row-major and always exactly
/// `width * height` long.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    metadata: ImageMetadata,
    samples: Vec<f64>,
}

impl DecodedImage {
    /// Calibrated intensities (`raw * slope + intercept`), row-major
    #[inline]
    #[must_use]
    pub fn calibrated_samples(&self) -> &[f64] {
        &self.samples
    }

    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &ImageMetadata {
        &self.metadata
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.metadata.dimensions.width()
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.metadata.dimensions.height()
    }

    #[inline]
    #[must_use]
    pub fn window_center_default(&self) -> f64 {
        self.metadata.window_center
    }

    #[inline]
    #[must_use]
    pub fn window_width_default(&self) -> f64 {
        self.metadata.window_width
    }

    /// Spacing used for measurements (1.0 mm per pixel when absent)
    #[inline]
    #[must_use]
    pub fn pixel_spacing(&self) -> PixelSpacing {
        self.metadata.effective_pixel_spacing()
    }

    #[inline]
    #[must_use]
    pub fn modality(&self) -> &str {
        &self.metadata.modality
    }

    #[inline]
    #[must_use]
    pub fn patient(&self) -> &PatientInfo {
        &self.metadata.patient
    }

    #[inline]
    #[must_use]
    pub fn study(&self) -> &StudyInfo {
        &self.metadata.study
    }
}

/// Read a DICOM file from disk
pub fn read_dicom_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and decode a DICOM file
pub fn decode_file(path: &Path) -> Result<DecodedImage> {
    let bytes = read_dicom_file(path)?;
    debug!(path = %path.display(), size = bytes.len(), "decoding file");
    decode_bytes(&bytes)
}

/// Decode a complete DICOM byte buffer (Part 10 or bare data set)
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedImage> {
    let ds = DataSet::parse(bytes)?;
    let metadata = ImageMetadata::from_data_set(&ds);

    validation::validate_metadata(&metadata)?;
    let samples = pixel_data::decode_pixel_data(&ds, &metadata)?;

    debug!(
        dimensions = %metadata.dimensions,
        bits = %metadata.bit_depth,
        modality = %metadata.modality,
        transfer_syntax = %metadata.transfer_syntax,
        "decoded image"
    );

    Ok(DecodedImage { metadata, samples })
}
