use super::photometric::PhotometricInterpretation;
use super::reader::DataSet;
use crate::types::{
    BitDepth, Dimensions, PatientInfo, PixelRepresentation, PixelSpacing, RescaleParams, SOPClass,
    Sex, StudyInfo,
};
use chrono::NaiveDate;
use dicom::core::dictionary::UidDictionary;
use dicom::dictionary_std::sop_class;
use dicom::dictionary_std::tags;
use tracing::warn;

pub const DEFAULT_DIMENSION: u16 = 512;
pub const DEFAULT_BITS_ALLOCATED: u16 = 16;
pub const DEFAULT_WINDOW_CENTER: f64 = 50.0;
pub const DEFAULT_WINDOW_WIDTH: f64 = 400.0;
pub const DEFAULT_MODALITY: &str = "CT";

/// Text value, `None` when absent or blank
#[inline]
fn text(ds: &DataSet<'_>, tag: dicom::core::Tag) -> Option<String> {
    ds.get_string(tag).filter(|s| !s.is_empty())
}

pub fn extract_dimensions(ds: &DataSet<'_>) -> Dimensions {
    let rows = ds.get_uint16(tags::ROWS).unwrap_or(DEFAULT_DIMENSION);
    let cols = ds.get_uint16(tags::COLUMNS).unwrap_or(DEFAULT_DIMENSION);

    Dimensions::new(rows, cols)
}

pub fn extract_bit_depth(ds: &DataSet<'_>) -> BitDepth {
    let allocated = ds
        .get_uint16(tags::BITS_ALLOCATED)
        .unwrap_or(DEFAULT_BITS_ALLOCATED);
    let stored = ds.get_uint16(tags::BITS_STORED).unwrap_or(allocated);
    let high_bit = ds
        .get_uint16(tags::HIGH_BIT)
        .unwrap_or_else(|| stored.saturating_sub(1));

    BitDepth::new(allocated, stored, high_bit)
}

#[inline]
pub fn extract_pixel_representation(ds: &DataSet<'_>) -> PixelRepresentation {
    ds.get_uint16(tags::PIXEL_REPRESENTATION)
        .map(PixelRepresentation::from_tag_value)
        .unwrap_or_default()
}

#[inline]
pub fn extract_samples_per_pixel(ds: &DataSet<'_>) -> u16 {
    ds.get_uint16(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
}

pub fn extract_photometric_interpretation(ds: &DataSet<'_>) -> PhotometricInterpretation {
    text(ds, tags::PHOTOMETRIC_INTERPRETATION)
        .map_or(PhotometricInterpretation::Monochrome2, |s| PhotometricInterpretation::from(s.as_str()))
}

pub fn extract_rescale_params(ds: &DataSet<'_>) -> RescaleParams {
    // Only CT and PET usually carry these
    let slope = ds.get_float_or_int(tags::RESCALE_SLOPE).unwrap_or(1.0);
    let intercept = ds.get_float_or_int(tags::RESCALE_INTERCEPT).unwrap_or(0.0);

    RescaleParams::new(slope, intercept)
}

/// Default window as (center, width); the first value wins for multi-valued tags
pub fn extract_window(ds: &DataSet<'_>) -> (f64, f64) {
    let center = ds
        .get_float_values(tags::WINDOW_CENTER)
        .map_or(DEFAULT_WINDOW_CENTER, |v| v.first_or(DEFAULT_WINDOW_CENTER));
    let width = ds
        .get_float_values(tags::WINDOW_WIDTH)
        .map_or(DEFAULT_WINDOW_WIDTH, |v| v.first_or(DEFAULT_WINDOW_WIDTH));

    (center, width)
}

/// (0028,0030) as `row\column`; a single value applies to both axes
pub fn extract_pixel_spacing(ds: &DataSet<'_>) -> Option<PixelSpacing> {
    let values = ds.get_float_values(tags::PIXEL_SPACING)?;
    match *values.values() {
        [row, column, ..] => Some(PixelSpacing::new(row, column)),
        [both] => Some(PixelSpacing::new(both, both)),
        [] => None,
    }
}

#[inline]
pub fn extract_modality(ds: &DataSet<'_>) -> String {
    text(ds, tags::MODALITY).unwrap_or_else(|| DEFAULT_MODALITY.to_string())
}

pub fn extract_sop_class(ds: &DataSet<'_>) -> Option<SOPClass> {
    text(ds, tags::SOP_CLASS_UID).and_then(|uid| {
        sop_class::StandardSopClassDictionary
            .by_uid(&uid)
            .map(|entry| SOPClass::new(uid.clone(), entry.name.to_string()))
    })
}

pub fn extract_patient_info(ds: &DataSet<'_>) -> PatientInfo {
    PatientInfo {
        name: text(ds, tags::PATIENT_NAME).map(|raw| format_patient_name(&raw)),
        id: text(ds, tags::PATIENT_ID),
        birth_date: text(ds, tags::PATIENT_BIRTH_DATE).and_then(|raw| parse_dicom_date(&raw)),
        sex: text(ds, tags::PATIENT_SEX).map(|raw| parse_sex(&raw)),
        age: text(ds, tags::PATIENT_AGE),
    }
}

pub fn extract_study_info(ds: &DataSet<'_>) -> StudyInfo {
    StudyInfo {
        date: text(ds, tags::STUDY_DATE).and_then(|raw| parse_dicom_date(&raw)),
        time: text(ds, tags::STUDY_TIME),
        description: text(ds, tags::STUDY_DESCRIPTION),
        study_instance_uid: text(ds, tags::STUDY_INSTANCE_UID),
        series_instance_uid: text(ds, tags::SERIES_INSTANCE_UID),
        series_description: text(ds, tags::SERIES_DESCRIPTION),
        body_part: text(ds, tags::BODY_PART_EXAMINED),
        institution_name: text(ds, tags::INSTITUTION_NAME),
        manufacturer: text(ds, tags::MANUFACTURER),
        manufacturer_model_name: text(ds, tags::MANUFACTURER_MODEL_NAME),
    }
}

/// `LAST^FIRST^MIDDLE` to `FIRST LAST`.
///
/// Names without a component separator are returned unchanged, as is the
/// raw value when reordering leaves nothing but whitespace (`"^"`).
#[must_use]
pub fn format_patient_name(raw: &str) -> String {
    if !raw.contains('^') {
        return raw.to_string();
    }

    let mut parts = raw.split('^');
    let last = parts.next().unwrap_or_default();
    let first = parts.next().unwrap_or_default();
    let formatted = format!("{first} {last}").trim().to_string();

    if formatted.is_empty() {
        raw.to_string()
    } else {
        formatted
    }
}

/// Parse a DA value (`YYYYMMDD`). Anything else is logged and dropped.
#[must_use]
pub fn parse_dicom_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let parsed = if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        NaiveDate::parse_from_str(raw, "%Y%m%d").ok()
    } else {
        None
    };

    if parsed.is_none() {
        warn!(value = raw, "MalformedDate: ignoring date that is not YYYYMMDD");
    }
    parsed
}

#[must_use]
pub fn parse_sex(raw: &str) -> Sex {
    match raw.trim().to_ascii_uppercase().as_str() {
        "M" | "MALE" => Sex::Male,
        "F" | "FEMALE" => Sex::Female,
        _ => Sex::Other,
    }
}
