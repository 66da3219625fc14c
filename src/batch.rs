//! Sequential multi-file loading
//!
//! Files are decoded one at a time in input order. A file that fails to
//! decode becomes a [`Slice::Failed`] carrying the error message; it never
//! stops the files after it.

use crate::dicom::{self, DecodedImage};
use crate::image::{Raster, RenderParameters, placeholder_for_error, render};
use crate::series::{SeriesState, Slice};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extensions accepted as DICOM (compared case-insensitively)
pub const DICOM_EXTENSIONS: &[&str] = &["dcm", "dicom", "ct", "mri", "xray"];

/// Files without an extension are accepted, as DICOM files often have none
#[must_use]
pub fn is_dicom_candidate(path: &Path) -> bool {
    path.extension().is_none_or(|ext| {
        let ext = ext.to_string_lossy();
        DICOM_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known))
    })
}

/// Keep DICOM candidates, warning about every skipped path
#[must_use]
pub fn filter_candidates(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .filter(|path| {
            let keep = is_dicom_candidate(path);
            if !keep {
                warn!(path = %path.display(), "skipping file without a DICOM extension");
            }
            keep
        })
        .cloned()
        .collect()
}

#[inline]
fn label_for(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

/// Decode one file into a series slice
#[must_use]
pub fn load_slice(path: &Path) -> Slice {
    let label = label_for(path);
    match dicom::decode_file(path) {
        Ok(image) => Slice::Decoded {
            label,
            image: Box::new(image),
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to decode file");
            Slice::Failed {
                label,
                message: err.to_string(),
            }
        }
    }
}

/// Decode files in order, reporting each slice as soon as it is ready
pub fn load_series_with<F>(paths: &[PathBuf], mut on_loaded: F) -> SeriesState
where
    F: FnMut(usize, &Slice),
{
    let mut slices = Vec::with_capacity(paths.len());
    for (index, path) in paths.iter().enumerate() {
        let slice = load_slice(path);
        on_loaded(index, &slice);
        slices.push(slice);
    }

    let failed = slices.iter().filter(|s| s.error().is_some()).count();
    debug!(total = slices.len(), failed, "series loaded");
    SeriesState::new(slices)
}

#[must_use]
pub fn load_series(paths: &[PathBuf]) -> SeriesState {
    load_series_with(paths, |_, _| {})
}

/// Render a slice: the windowed image, or the error placeholder
#[must_use]
pub fn render_slice(slice: &Slice, params: &RenderParameters) -> Raster {
    match slice {
        Slice::Decoded { image, .. } => render(Some(image.as_ref()), params),
        Slice::Failed { message, .. } => placeholder_for_error(message),
    }
}

/// Parameters for a slice: `overrides` when set, else the image defaults
#[must_use]
pub fn parameters_for(image: Option<&DecodedImage>, overrides: Option<RenderParameters>) -> RenderParameters {
    overrides.unwrap_or_else(|| image.map_or_else(RenderParameters::default, RenderParameters::for_image))
}

/// PNG name for the slice at `index`. The 1-based series position comes
/// first, so slices with the same label get distinct files.
#[must_use]
pub fn output_file_name(index: usize, label: &str) -> String {
    format!("{:03}_{label}.png", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dicom::test_support::synthetic_u16;

    #[test]
    fn test_extension_filter() {
        assert!(is_dicom_candidate(Path::new("a/slice.dcm")));
        assert!(is_dicom_candidate(Path::new("SLICE.DCM")));
        assert!(is_dicom_candidate(Path::new("head.mri")));
        assert!(is_dicom_candidate(Path::new("chest.Xray")));
        assert!(is_dicom_candidate(Path::new("IM000001")));
        assert!(!is_dicom_candidate(Path::new("notes.txt")));
        assert!(!is_dicom_candidate(Path::new("scan.png")));

        let kept = filter_candidates(&[PathBuf::from("a.dcm"), PathBuf::from("b.jpg"), PathBuf::from("c")]);
        assert_eq!(kept, vec![PathBuf::from("a.dcm"), PathBuf::from("c")]);
    }

    #[test]
    fn test_failures_do_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.dcm");
        let bad = dir.path().join("bad.dcm");
        let missing = dir.path().join("missing.dcm");
        std::fs::write(&good, synthetic_u16(1, 2, "", None, &[1, 2])).unwrap();
        std::fs::write(&bad, b"not a dicom file").unwrap();

        let mut seen = Vec::new();
        let series = load_series_with(&[bad, missing, good], |index, slice| {
            seen.push((index, slice.label().to_string()));
        });

        assert_eq!(series.len(), 3);
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], (0, "bad.dcm".to_string()));
        assert!(series.slices()[0].error().is_some());
        assert!(series.slices()[1].error().is_some());
        assert_eq!(series.slices()[2].image().map(DecodedImage::width), Some(2));
    }

    #[test]
    fn test_render_failed_slice() {
        let slice = Slice::Failed {
            label: "x.dcm".to_string(),
            message: "Pixel data (7FE0,0010) not found".to_string(),
        };
        let raster = render_slice(&slice, &RenderParameters::default());
        assert_eq!(raster, placeholder_for_error("Pixel data (7FE0,0010) not found"));
    }

    #[test]
    fn test_parameters_for() {
        let overrides = RenderParameters {
            window: 80.0,
            level: 40.0,
            ..RenderParameters::default()
        };
        assert_eq!(parameters_for(None, Some(overrides)), overrides);
        assert_eq!(parameters_for(None, None), RenderParameters::default());
    }

    #[test]
    fn test_output_names_do_not_collide() {
        let series = load_series(&[PathBuf::from("ct/slice.dcm"), PathBuf::from("mr/slice.dcm")]);
        let names: Vec<String> = series
            .slices()
            .iter()
            .enumerate()
            .map(|(idx, slice)| output_file_name(idx, slice.label()))
            .collect();

        assert_eq!(series.slices()[0].label(), series.slices()[1].label());
        assert_eq!(names, ["001_slice.dcm.png", "002_slice.dcm.png"]);
    }
}
