//! Transfer syntax identification and byte order selection

use super::error::{DecodeError, Result};
use dicom::dictionary_std::uids;
use dicom::encoding::TransferSyntaxIndex;
use dicom::transfer_syntax::TransferSyntaxRegistry;
use std::fmt;

/// Byte order of multi-byte values in a data set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// DICOM transfer syntax (UID, name)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSyntax {
    pub uid: String,
    pub name: String,
}

impl TransferSyntax {
    #[must_use]
    pub fn new(uid: String, name: String) -> Self {
        Self { uid, name }
    }

    /// Look up a transfer syntax by UID, naming it from the registry
    #[must_use]
    pub fn from_uid(uid: &str) -> Self {
        let uid = uid.trim_end_matches(['\0', ' ']).trim();
        let name = TransferSyntaxRegistry
            .get(uid)
            .map_or_else(|| "Unknown".to_string(), |ts| ts.name().to_string());

        Self::new(uid.to_string(), name)
    }

    /// Syntax assumed for data sets that carry no file meta group
    #[must_use]
    pub fn explicit_vr_little_endian() -> Self {
        Self::from_uid(uids::EXPLICIT_VR_LITTLE_ENDIAN)
    }

    #[inline]
    #[must_use]
    #[allow(deprecated)] // Explicit VR Big Endian is retired but still in use
    pub fn is_big_endian(&self) -> bool {
        self.uid == uids::EXPLICIT_VR_BIG_ENDIAN
    }

    /// Byte order of the data set body, or `UnsupportedFormat` when the
    /// syntax is implicit VR or encapsulated/compressed.
    #[allow(deprecated)]
    pub fn byte_order(&self) -> Result<ByteOrder> {
        match self.uid.as_str() {
            uids::EXPLICIT_VR_LITTLE_ENDIAN => Ok(ByteOrder::Little),
            uids::EXPLICIT_VR_BIG_ENDIAN => Ok(ByteOrder::Big),
            uids::IMPLICIT_VR_LITTLE_ENDIAN => Err(DecodeError::UnsupportedFormat(format!(
                "{self} uses implicit VR, only explicit VR is supported"
            ))),
            _ => Err(DecodeError::UnsupportedFormat(format!(
                "{self} is compressed or otherwise not supported"
            ))),
        }
    }
}

impl fmt::Display for TransferSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{name} ({uid})", name = self.name, uid = self.uid)
    }
}
