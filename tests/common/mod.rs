//! Handcrafted DICOM buffers for integration tests and benchmarks

#![allow(dead_code)]

use std::collections::BTreeMap;

pub const EXPLICIT_VR_LE: &str = "1.2.840.10008.1.2.1";
pub const EXPLICIT_VR_BE: &str = "1.2.840.10008.1.2.2";
pub const IMPLICIT_VR_LE: &str = "1.2.840.10008.1.2";
pub const CT_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.2";

/// Builds explicit VR data sets. Elements are written in tag order; the
/// file meta group is always little endian.
#[derive(Debug, Clone)]
pub struct DicomBuilder {
    big_endian: bool,
    part10: bool,
    transfer_syntax: String,
    elements: BTreeMap<(u16, u16), ([u8; 2], Value)>,
}

/// Element values; 16-bit words take the body byte order at build time
#[derive(Debug, Clone)]
enum Value {
    Bytes(Vec<u8>),
    Words(Vec<u16>),
}

impl Default for DicomBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DicomBuilder {
    pub fn new() -> Self {
        Self {
            big_endian: false,
            part10: true,
            transfer_syntax: EXPLICIT_VR_LE.to_string(),
            elements: BTreeMap::new(),
        }
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self.transfer_syntax = EXPLICIT_VR_BE.to_string();
        self
    }

    /// No preamble and no meta group
    pub fn bare(mut self) -> Self {
        self.part10 = false;
        self
    }

    /// Declare a transfer syntax without changing how the body is encoded
    pub fn declare_transfer_syntax(mut self, uid: &str) -> Self {
        self.transfer_syntax = uid.to_string();
        self
    }

    pub fn raw(mut self, group: u16, element: u16, vr: &[u8; 2], value: Vec<u8>) -> Self {
        self.elements.insert((group, element), (*vr, Value::Bytes(value)));
        self
    }

    fn words(mut self, group: u16, element: u16, vr: &[u8; 2], value: Vec<u16>) -> Self {
        self.elements.insert((group, element), (*vr, Value::Words(value)));
        self
    }

    pub fn string(self, group: u16, element: u16, vr: &[u8; 2], value: &str) -> Self {
        let mut bytes = value.as_bytes().to_vec();
        if bytes.len() % 2 == 1 {
            bytes.push(if vr == b"UI" { 0 } else { b' ' });
        }
        self.raw(group, element, vr, bytes)
    }

    pub fn u16(self, group: u16, element: u16, value: u16) -> Self {
        self.words(group, element, b"US", vec![value])
    }

    /// Rows, columns, bits allocated/stored and pixel representation
    pub fn image(self, rows: u16, cols: u16, bits: u16, signed: bool) -> Self {
        self.u16(0x0028, 0x0002, 1)
            .string(0x0028, 0x0004, b"CS", "MONOCHROME2")
            .u16(0x0028, 0x0010, rows)
            .u16(0x0028, 0x0011, cols)
            .u16(0x0028, 0x0100, bits)
            .u16(0x0028, 0x0101, bits)
            .u16(0x0028, 0x0102, bits - 1)
            .u16(0x0028, 0x0103, u16::from(signed))
    }

    pub fn pixels_u16(self, samples: &[u16]) -> Self {
        self.words(0x7FE0, 0x0010, b"OW", samples.to_vec())
    }

    pub fn pixels_i16(self, samples: &[i16]) -> Self {
        let unsigned: Vec<u16> = samples.iter().map(|&s| s as u16).collect();
        self.pixels_u16(&unsigned)
    }

    pub fn pixels_u8(self, samples: &[u8]) -> Self {
        let mut bytes = samples.to_vec();
        if bytes.len() % 2 == 1 {
            bytes.push(0);
        }
        self.raw(0x7FE0, 0x0010, b"OB", bytes)
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();

        if self.part10 {
            out.extend_from_slice(&[0u8; 128]);
            out.extend_from_slice(b"DICM");

            let mut meta = Vec::new();
            push_element(&mut meta, false, (0x0002, 0x0001), b"OB", &[0, 1]);
            push_element(&mut meta, false, (0x0002, 0x0002), b"UI", &uid_bytes(CT_IMAGE_STORAGE));
            push_element(&mut meta, false, (0x0002, 0x0010), b"UI", &uid_bytes(&self.transfer_syntax));

            push_element(&mut out, false, (0x0002, 0x0000), b"UL", &(meta.len() as u32).to_le_bytes());
            out.extend_from_slice(&meta);
        }

        for (&tag, (vr, value)) in &self.elements {
            let bytes = match value {
                Value::Bytes(bytes) => bytes.clone(),
                Value::Words(words) => words
                    .iter()
                    .flat_map(|&w| if self.big_endian { w.to_be_bytes() } else { w.to_le_bytes() })
                    .collect(),
            };
            push_element(&mut out, self.big_endian, tag, vr, &bytes);
        }
        out
    }
}

fn uid_bytes(uid: &str) -> Vec<u8> {
    let mut bytes = uid.as_bytes().to_vec();
    if bytes.len() % 2 == 1 {
        bytes.push(0);
    }
    bytes
}

fn push_element(out: &mut Vec<u8>, big_endian: bool, (group, element): (u16, u16), vr: &[u8; 2], value: &[u8]) {
    let u16_bytes = |v: u16| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
    let u32_bytes = |v: u32| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };

    out.extend_from_slice(&u16_bytes(group));
    out.extend_from_slice(&u16_bytes(element));
    out.extend_from_slice(vr);
    if matches!(vr, b"OB" | b"OW" | b"SQ" | b"UN" | b"UT" | b"OF" | b"OD" | b"OL" | b"UC" | b"UR") {
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&u32_bytes(value.len() as u32));
    } else {
        out.extend_from_slice(&u16_bytes(value.len() as u16));
    }
    out.extend_from_slice(value);
}

/// A 16-bit CT-like slice with a ramp of samples and typical attributes
pub fn ct_slice(rows: u16, cols: u16) -> DicomBuilder {
    let samples: Vec<u16> = (0..u32::from(rows) * u32::from(cols))
        .map(|i| (i % 4096) as u16)
        .collect();

    DicomBuilder::new()
        .string(0x0008, 0x0016, b"UI", CT_IMAGE_STORAGE)
        .string(0x0008, 0x0020, b"DA", "20240131")
        .string(0x0008, 0x0060, b"CS", "CT")
        .string(0x0010, 0x0010, b"PN", "Doe^Jane")
        .string(0x0010, 0x0020, b"LO", "PID-0042")
        .string(0x0010, 0x0030, b"DA", "19800215")
        .string(0x0010, 0x0040, b"CS", "F")
        .image(rows, cols, 16, false)
        .string(0x0028, 0x0030, b"DS", "0.5\\0.5")
        .string(0x0028, 0x1050, b"DS", "40")
        .string(0x0028, 0x1051, b"DS", "400")
        .string(0x0028, 0x1052, b"DS", "-1024")
        .string(0x0028, 0x1053, b"DS", "1")
        .pixels_u16(&samples)
}
