//! DICOM pixel data decoding
//!
//! Reinterprets the native (uncompressed) (7FE0,0010) value as 8 or 16 bit
//! samples, swaps bytes for big endian data and applies the modality rescale
//! so every sample ends up in calibrated units (Hounsfield units for CT).

use super::error::{DecodeError, Result};
use super::metadata::ImageMetadata;
use super::reader::DataSet;
use super::transfer_syntax::ByteOrder;
use crate::types::PixelRepresentation;
use dicom::dictionary_std::tags;

/// Decode the pixel data element into calibrated samples, row-major,
/// exactly `rows * cols` long.
pub fn decode_pixel_data(ds: &DataSet<'_>, metadata: &ImageMetadata) -> Result<Vec<f64>> {
    let element = ds
        .element(tags::PIXEL_DATA)
        .ok_or(DecodeError::MissingPixelData)?;
    let raw = ds
        .value_bytes(tags::PIXEL_DATA)
        .ok_or(DecodeError::MissingPixelData)?;

    let bits_allocated = metadata.bits_allocated();
    if !matches!(bits_allocated, 8 | 16) {
        return Err(DecodeError::UnsupportedBitDepth(bits_allocated));
    }

    let expected = metadata.dimensions.pixel_count();
    let needed = expected * metadata.bit_depth.bytes_per_sample();
    if raw.len() < needed {
        return Err(DecodeError::malformed(
            element.offset + raw.len(),
            format!(
                "pixel data holds {} bytes, {} needed for {} {bits_allocated}-bit samples",
                raw.len(),
                needed,
                metadata.dimensions
            ),
        ));
    }
    // a single pad byte keeps odd-sized values even
    if raw.len() - needed > 1 {
        return Err(DecodeError::malformed(
            element.offset + needed,
            format!(
                "pixel data holds {} bytes but {} samples only need {needed}",
                raw.len(),
                metadata.dimensions
            ),
        ));
    }

    let raw = &raw[..needed];
    let signed = metadata.pixel_representation == PixelRepresentation::Signed;
    let rescale = metadata.rescale;

    let samples = match bits_allocated {
        8 => raw
            .iter()
            .map(|&byte| {
                let value = if signed {
                    i32::from(byte as i8)
                } else {
                    i32::from(byte)
                };
                rescale.apply(value)
            })
            .collect(),
        _ => raw
            .chunks_exact(2)
            .map(|chunk| {
                let bytes = [chunk[0], chunk[1]];
                let word = match element.byte_order {
                    ByteOrder::Little => u16::from_le_bytes(bytes),
                    ByteOrder::Big => u16::from_be_bytes(bytes),
                };
                let value = if signed {
                    i32::from(word as i16)
                } else {
                    i32::from(word)
                };
                rescale.apply(value)
            })
            .collect(),
    };

    Ok(samples)
}
