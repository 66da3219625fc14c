use std::path::PathBuf;
use thiserror::Error;

/// Reasons a single DICOM file cannot be turned into a `DecodedImage`.
///
/// None of these abort a batch: the batch loader records the message and
/// substitutes a placeholder for the failed file.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Truncated or corrupt byte stream
    #[error("Malformed DICOM data at byte {offset}: {reason}")]
    MalformedInput { offset: usize, reason: String },

    /// Implicit VR, compressed or otherwise non-native encoding
    #[error("Unsupported DICOM format: {0}")]
    UnsupportedFormat(String),

    #[error("Unsupported bits allocated: {0} (expected 8 or 16)")]
    UnsupportedBitDepth(u16),

    #[error("Pixel data (7FE0,0010) not found in DICOM file")]
    MissingPixelData,

    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DecodeError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            offset,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = DecodeError> = std::result::Result<T, E>;
