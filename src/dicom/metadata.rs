//! DICOM image metadata structure

use super::parser;
use super::photometric::PhotometricInterpretation;
use super::reader::DataSet;
use super::transfer_syntax::TransferSyntax;
use crate::types::{
    BitDepth, Dimensions, PatientInfo, PixelRepresentation, PixelSpacing, RescaleParams, SOPClass,
    StudyInfo,
};

/// Everything read from a file's header that rendering, measuring and the
/// records payload need
#[derive(Debug, Clone)]
pub struct ImageMetadata {
    // Pixel layout
    pub dimensions: Dimensions,
    pub bit_depth: BitDepth,
    pub pixel_representation: PixelRepresentation,
    pub samples_per_pixel: u16,
    pub photometric_interpretation: PhotometricInterpretation,

    // Calibration and display defaults
    pub rescale: RescaleParams,
    pub window_center: f64,
    pub window_width: f64,
    /// `None` when (0028,0030) is absent; see [`Self::effective_pixel_spacing`]
    pub pixel_spacing: Option<PixelSpacing>,

    // Descriptive
    pub modality: String,
    pub patient: PatientInfo,
    pub study: StudyInfo,

    // Technical
    pub sop_class: Option<SOPClass>,
    pub transfer_syntax: TransferSyntax,
}

impl ImageMetadata {
    /// Read every attribute, falling back to the documented defaults
    #[must_use]
    pub fn from_data_set(ds: &DataSet<'_>) -> Self {
        let (window_center, window_width) = parser::extract_window(ds);

        Self {
            dimensions: parser::extract_dimensions(ds),
            bit_depth: parser::extract_bit_depth(ds),
            pixel_representation: parser::extract_pixel_representation(ds),
            samples_per_pixel: parser::extract_samples_per_pixel(ds),
            photometric_interpretation: parser::extract_photometric_interpretation(ds),
            rescale: parser::extract_rescale_params(ds),
            window_center,
            window_width,
            pixel_spacing: parser::extract_pixel_spacing(ds),
            modality: parser::extract_modality(ds),
            patient: parser::extract_patient_info(ds),
            study: parser::extract_study_info(ds),
            sop_class: parser::extract_sop_class(ds),
            transfer_syntax: ds.transfer_syntax().clone(),
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn bits_allocated(&self) -> u16 {
        self.bit_depth.allocated
    }

    /// Pixel spacing used for measurements: 1.0 mm on both axes when absent
    #[inline]
    #[must_use]
    pub fn effective_pixel_spacing(&self) -> PixelSpacing {
        self.pixel_spacing.unwrap_or_default()
    }

    #[inline(always)]
    #[must_use]
    pub fn is_big_endian(&self) -> bool {
        self.transfer_syntax.is_big_endian()
    }
}
