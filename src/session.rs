//! Persisted viewer session
//!
//! Holds what the viewer restores on the next run over the same files:
//! window/level and filters, view transform, current slice, playback rate,
//! measurements, and a pixel-free summary of every loaded image. Saved as
//! JSON when the viewer exits and loaded before the series is shown.

use crate::image::RenderParameters;
use crate::measurement::{Measurement, MeasurementEngine};
use crate::series::{DEFAULT_FPS, SeriesState, Slice};
use crate::types::{PatientInfo, PixelSpacing, StudyInfo};
use crate::viewport::ViewTransform;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Image metadata without pixel samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSummary {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub modality: String,
    pub pixel_spacing: Option<PixelSpacing>,
    pub patient: PatientInfo,
    pub study: StudyInfo,
    /// Decode error for slices that failed
    pub error: Option<String>,
}

impl ImageSummary {
    #[must_use]
    pub fn from_slice(slice: &Slice) -> Self {
        match slice.image() {
            Some(image) => {
                let metadata = image.metadata();
                Self {
                    label: slice.label().to_string(),
                    width: image.width(),
                    height: image.height(),
                    modality: metadata.modality.clone(),
                    pixel_spacing: metadata.pixel_spacing,
                    patient: metadata.patient.clone(),
                    study: metadata.study.clone(),
                    error: None,
                }
            }
            None => Self {
                label: slice.label().to_string(),
                width: 0,
                height: 0,
                modality: String::new(),
                pixel_spacing: None,
                patient: PatientInfo::default(),
                study: StudyInfo::default(),
                error: slice.error().map(str::to_string),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerSession {
    pub render: RenderParameters,
    pub view: ViewTransform,
    pub current_index: usize,
    pub fps: u32,
    pub measurements: Vec<Measurement>,
    pub images: Vec<ImageSummary>,
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self {
            render: RenderParameters::default(),
            view: ViewTransform::default(),
            current_index: 0,
            fps: DEFAULT_FPS,
            measurements: Vec::new(),
            images: Vec::new(),
        }
    }
}

impl ViewerSession {
    /// Read a saved session; `Ok(None)` when no file exists yet
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session: {}", path.display()))?;
        let session = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse session: {}", path.display()))?;

        debug!(path = %path.display(), "session loaded");
        Ok(Some(session))
    }

    /// Write the session atomically (temp file in the same directory, then rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        serde_json::to_writer_pretty(&mut file, self).context("Failed to serialize session")?;
        file.flush().context("Failed to flush session")?;
        file.persist(path)
            .with_context(|| format!("Failed to write session: {}", path.display()))?;

        info!(path = %path.display(), "session saved");
        Ok(())
    }

    /// Snapshot the current viewer state
    #[must_use]
    pub fn capture(
        series: &SeriesState,
        render: &RenderParameters,
        view: &ViewTransform,
        engine: &MeasurementEngine,
    ) -> Self {
        Self {
            render: *render,
            view: *view,
            current_index: series.current_index(),
            fps: series.fps(),
            measurements: engine.measurements().to_vec(),
            images: series.slices().iter().map(ImageSummary::from_slice).collect(),
        }
    }

    /// Whether this session was saved over the same files, in the same order
    #[must_use]
    pub fn matches(&self, series: &SeriesState) -> bool {
        self.images.len() == series.len()
            && self
                .images
                .iter()
                .zip(series.slices())
                .all(|(summary, slice)| summary.label == slice.label())
    }

    /// Apply the saved state to a freshly loaded series. Returns `false` and
    /// changes nothing when the session belongs to a different set of files.
    pub fn restore(
        &self,
        series: &mut SeriesState,
        render: &mut RenderParameters,
        view: &mut ViewTransform,
        engine: &mut MeasurementEngine,
    ) -> bool {
        if !self.matches(series) {
            debug!("saved session is for different files, ignoring it");
            return false;
        }

        series.jump_to(self.current_index);
        series.set_fps(self.fps);
        *render = self.render.normalized();
        *view = self.view.normalized();
        engine.restore(self.measurements.clone());
        true
    }
}
