//! Domain-specific types for DICOM metadata

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SOP Class (UID, name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SOPClass {
    pub uid: String,
    pub name: String,
}

impl SOPClass {
    #[must_use]
    pub fn new(uid: String, name: String) -> Self {
        Self { uid, name }
    }
}

impl fmt::Display for SOPClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{name} ({uid})", name = self.name, uid = self.uid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub rows: u16,
    pub cols: u16,
}

impl Dimensions {
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        u32::from(self.cols)
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        u32::from(self.rows)
    }

    #[inline]
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        usize::from(self.rows) * usize::from(self.cols)
    }

    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.rows > 0 && self.cols > 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{cols}x{rows}", cols = self.cols, rows = self.rows)
    }
}

/// Rescale parameters for converting stored pixel values to calibrated units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RescaleParams {
    pub slope: f64,
    pub intercept: f64,
}

impl RescaleParams {
    #[must_use]
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    #[must_use]
    pub const fn identity() -> Self {
        Self {
            slope: 1.0,
            intercept: 0.0,
        }
    }

    #[inline(always)]
    #[must_use]
    // Hot path: called for every pixel during decoding
    pub fn apply(&self, raw: i32) -> f64 {
        f64::from(raw).mul_add(self.slope, self.intercept)
    }
}

impl Default for RescaleParams {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for RescaleParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "slope={slope}, intercept={intercept}",
            slope = self.slope,
            intercept = self.intercept
        )
    }
}

/// Physical pixel spacing in millimetres, as stored in (0028,0030):
/// the distance between adjacent rows first, then between adjacent columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelSpacing {
    pub row: f64,
    pub column: f64,
}

impl PixelSpacing {
    #[must_use]
    pub fn new(row: f64, column: f64) -> Self {
        Self { row, column }
    }

    #[must_use]
    pub const fn unit() -> Self {
        Self {
            row: 1.0,
            column: 1.0,
        }
    }

    /// Millimetres per pixel along the image x axis.
    #[inline]
    #[must_use]
    pub fn x(&self) -> f64 {
        self.column
    }

    /// Millimetres per pixel along the image y axis.
    #[inline]
    #[must_use]
    pub fn y(&self) -> f64 {
        self.row
    }

    /// Height-to-width ratio of one pixel, used for terminal aspect correction
    #[inline]
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.row / self.column
    }
}

impl Default for PixelSpacing {
    fn default() -> Self {
        Self::unit()
    }
}

impl fmt::Display for PixelSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{row}\\{column} mm", row = self.row, column = self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelRepresentation {
    #[default]
    Unsigned,
    Signed,
}

impl PixelRepresentation {
    /// Interpret the (0028,0103) value; anything but 1 is unsigned
    #[must_use]
    pub fn from_tag_value(value: u16) -> Self {
        if value == 1 { Self::Signed } else { Self::Unsigned }
    }
}

impl fmt::Display for PixelRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned => write!(f, "unsigned"),
            Self::Signed => write!(f, "signed"),
        }
    }
}

/// Bit depth information for pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitDepth {
    pub allocated: u16,
    pub stored: u16,
    pub high_bit: u16,
}

impl BitDepth {
    #[must_use]
    pub fn new(allocated: u16, stored: u16, high_bit: u16) -> Self {
        Self {
            allocated,
            stored,
            high_bit,
        }
    }

    #[inline]
    #[must_use]
    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.allocated / 8)
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{stored}/{allocated} bits (high bit {high_bit})",
            stored = self.stored,
            allocated = self.allocated,
            high_bit = self.high_bit
        )
    }
}

/// Patient sex as exchanged with the records service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Patient information metadata
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInfo {
    pub name: Option<String>,
    #[serde(rename = "patientId")]
    pub id: Option<String>,
    #[serde(rename = "dateOfBirth")]
    pub birth_date: Option<NaiveDate>,
    #[serde(rename = "gender")]
    pub sex: Option<Sex>,
    pub age: Option<String>,
}

impl PatientInfo {
    #[must_use]
    pub fn has_info(&self) -> bool {
        self.name.is_some()
            || self.id.is_some()
            || self.birth_date.is_some()
            || self.sex.is_some()
            || self.age.is_some()
    }
}

/// Study, series and equipment identification
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyInfo {
    #[serde(rename = "studyDate")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "studyTime")]
    pub time: Option<String>,
    #[serde(rename = "studyDescription")]
    pub description: Option<String>,
    #[serde(rename = "studyInstanceUID")]
    pub study_instance_uid: Option<String>,
    #[serde(rename = "seriesInstanceUID")]
    pub series_instance_uid: Option<String>,
    pub series_description: Option<String>,
    #[serde(rename = "bodyPartExamined")]
    pub body_part: Option<String>,
    pub institution_name: Option<String>,
    pub manufacturer: Option<String>,
    pub manufacturer_model_name: Option<String>,
}

impl StudyInfo {
    #[must_use]
    pub fn has_info(&self) -> bool {
        self.date.is_some()
            || self.description.is_some()
            || self.study_instance_uid.is_some()
            || self.series_instance_uid.is_some()
            || self.body_part.is_some()
            || self.institution_name.is_some()
    }
}
