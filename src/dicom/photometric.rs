//! Photometric interpretation (0028,0004)

use std::fmt;

/// How stored sample values map to brightness. Only the two monochrome
/// terms are rendered; every other defined term is carried as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotometricInterpretation {
    /// Lowest value is white
    Monochrome1,
    /// Lowest value is black
    Monochrome2,
    /// RGB, YBR_*, PALETTE COLOR and anything unrecognized
    Color(String),
}

impl From<&str> for PhotometricInterpretation {
    fn from(term: &str) -> Self {
        match term.trim_matches(|c: char| c == '\0' || c.is_whitespace()) {
            "MONOCHROME1" => Self::Monochrome1,
            "MONOCHROME2" => Self::Monochrome2,
            other => Self::Color(other.to_string()),
        }
    }
}

impl PhotometricInterpretation {
    #[inline]
    #[must_use]
    pub fn is_grayscale(&self) -> bool {
        !matches!(self, Self::Color(_))
    }

    /// Displayed without inversion; users flip it with the invert filter
    #[inline]
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        *self == Self::Monochrome1
    }

    /// The defined term as written in the file
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Monochrome1 => "MONOCHROME1",
            Self::Monochrome2 => "MONOCHROME2",
            Self::Color(term) => term,
        }
    }
}

impl fmt::Display for PhotometricInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
