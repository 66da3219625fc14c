//! Structured payload handed to the records service after a series loads

use crate::dicom::DecodedImage;
use crate::series::SeriesState;
use crate::types::{PatientInfo, PixelSpacing, StudyInfo};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadDimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsPayload {
    pub patient_info: PatientInfo,
    pub study_info: StudyInfo,
    pub modality: String,
    pub dimensions: PayloadDimensions,
    /// `None` when the file carries no (0028,0030)
    pub pixel_spacing: Option<PixelSpacing>,
    /// Every file of the upload, in load order
    pub files: Vec<String>,
}

impl RecordsPayload {
    #[must_use]
    pub fn from_image(image: &DecodedImage) -> Self {
        let metadata = image.metadata();
        Self {
            patient_info: metadata.patient.clone(),
            study_info: metadata.study.clone(),
            modality: metadata.modality.clone(),
            dimensions: PayloadDimensions {
                width: image.width(),
                height: image.height(),
            },
            pixel_spacing: metadata.pixel_spacing,
            files: Vec::new(),
        }
    }

    /// Built from the first slice of the series; `None` if that slice failed
    #[must_use]
    pub fn from_series(series: &SeriesState) -> Option<Self> {
        let first = series.slices().first()?.image()?;
        let mut payload = Self::from_image(first);
        payload.files = series.slices().iter().map(|s| s.label().to_string()).collect();
        Some(payload)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize records payload")
    }
}
