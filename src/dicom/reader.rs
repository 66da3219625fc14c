//! Binary tag reader
//!
//! Walks the tag / VR / length / value records of an explicit VR data set
//! with the dicom-encoding header decoders and indexes every top-level
//! element by tag. Values stay in the source buffer and are only
//! interpreted when an accessor asks for them.

use super::error::{DecodeError, Result};
use super::transfer_syntax::{ByteOrder, TransferSyntax};
use dicom::core::header::SequenceItemHeader;
use dicom::core::{DataElementHeader, Tag, VR};
use dicom::encoding::decode::basic::BasicDecoder;
use dicom::encoding::decode::explicit_be::ExplicitVRBigEndianDecoder;
use dicom::encoding::decode::explicit_le::ExplicitVRLittleEndianDecoder;
use dicom::encoding::decode::implicit_le::{
    ImplicitVRLittleEndianDecoder, StandardImplicitVRLittleEndianDecoder,
};
use dicom::encoding::decode::{BasicDecode, Decode};
use dicom::encoding::transfer_syntax::Endianness;
use dicom::dictionary_std::tags;
use std::collections::BTreeMap;
use tracing::trace;

const PREAMBLE_LEN: usize = 128;
const MAGIC_CODE: &[u8; 4] = b"DICM";
/// Tag plus 32-bit length of items and delimiters
const ITEM_HEADER_LEN: usize = 8;
const MAX_SEQUENCE_DEPTH: usize = 64;

const ITEM_DELIMITER: Tag = Tag(0xFFFE, 0xE00D);

/// Location of one element's value inside the source buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementRef {
    pub tag: Tag,
    pub vr: VR,
    /// Offset of the first value byte
    pub offset: usize,
    /// Value length in bytes
    pub length: usize,
    pub byte_order: ByteOrder,
}

/// A numeric attribute that may hold one value or a backslash-separated list
#[derive(Debug, Clone, PartialEq)]
pub enum NumericValue {
    Single(f64),
    Multiple(Vec<f64>),
}

impl NumericValue {
    fn from_values(values: Vec<f64>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => Some(Self::Single(values[0])),
            _ => Some(Self::Multiple(values)),
        }
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Multiple(values) => values,
        }
    }

    #[must_use]
    pub fn first(&self) -> Option<f64> {
        self.values().first().copied()
    }

    #[must_use]
    pub fn first_or(&self, default: f64) -> f64 {
        self.first().unwrap_or(default)
    }
}

/// An indexed DICOM data set borrowing the bytes it was parsed from
#[derive(Debug, Clone)]
pub struct DataSet<'a> {
    bytes: &'a [u8],
    elements: BTreeMap<Tag, ElementRef>,
    transfer_syntax: TransferSyntax,
    byte_order: ByteOrder,
}

impl<'a> DataSet<'a> {
    /// Parse a Part 10 file (preamble, `DICM`, meta group) or a bare data set.
    ///
    /// # Errors
    ///
    /// `MalformedInput` when a record is truncated or declares a length past
    /// the end of the buffer, `UnsupportedFormat` for implicit VR, compressed
    /// syntaxes and encapsulated pixel data.
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let mut pos = if has_preamble(bytes) {
            PREAMBLE_LEN + MAGIC_CODE.len()
        } else {
            0
        };
        let mut elements = BTreeMap::new();

        // File meta group is always explicit VR little endian
        let meta = Walker::new(bytes, ByteOrder::Little);
        while meta.peek_group(pos) == Some(0x0002) {
            let (element, next) = meta.read_element(pos, 0, Encoding::Explicit)?;
            elements.insert(element.tag, element);
            pos = next;
        }

        let transfer_syntax = elements
            .get(&tags::TRANSFER_SYNTAX_UID)
            .map(|element| TransferSyntax::from_uid(&decode_text(value_of(bytes, element))))
            .unwrap_or_else(TransferSyntax::explicit_vr_little_endian);
        let byte_order = transfer_syntax.byte_order()?;

        let body = Walker::new(bytes, byte_order);
        while pos < bytes.len() {
            let (element, next) = body.read_element(pos, 0, Encoding::Explicit)?;
            trace!(tag = %element.tag, vr = %element.vr, length = element.length, "indexed element");
            elements.insert(element.tag, element);
            pos = next;
        }

        Ok(Self {
            bytes,
            elements,
            transfer_syntax,
            byte_order,
        })
    }

    #[must_use]
    pub fn transfer_syntax(&self) -> &TransferSyntax {
        &self.transfer_syntax
    }

    /// Byte order of the data set body (the meta group is always little endian)
    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    #[must_use]
    pub fn element(&self, tag: Tag) -> Option<&ElementRef> {
        self.elements.get(&tag)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Raw value bytes of an element
    #[must_use]
    pub fn value_bytes(&self, tag: Tag) -> Option<&'a [u8]> {
        self.element(tag).map(|element| value_of(self.bytes, element))
    }

    /// Whole text value with padding and surrounding whitespace removed
    #[must_use]
    pub fn get_string(&self, tag: Tag) -> Option<String> {
        self.value_bytes(tag).map(decode_text)
    }

    /// First binary 16-bit unsigned value
    #[must_use]
    pub fn get_uint16(&self, tag: Tag) -> Option<u16> {
        let element = self.element(tag)?;
        let chunk = value_of(self.bytes, element).get(..2)?;
        basic_decoder(element.byte_order).decode_us(chunk).ok()
    }

    /// First numeric value, whether encoded as text (DS, IS) or binary
    #[must_use]
    pub fn get_float_or_int(&self, tag: Tag) -> Option<f64> {
        self.get_float_values(tag)?.first()
    }

    /// All numeric values of an element
    #[must_use]
    pub fn get_float_values(&self, tag: Tag) -> Option<NumericValue> {
        let element = self.element(tag)?;
        let raw = value_of(self.bytes, element);
        let basic = basic_decoder(element.byte_order);

        // chunks_exact hands every decoder a full value
        let values: Vec<f64> = match element.vr {
            VR::US => raw.chunks_exact(2).filter_map(|c| basic.decode_us(c).ok()).map(f64::from).collect(),
            VR::SS => raw.chunks_exact(2).filter_map(|c| basic.decode_ss(c).ok()).map(f64::from).collect(),
            VR::UL => raw.chunks_exact(4).filter_map(|c| basic.decode_ul(c).ok()).map(f64::from).collect(),
            VR::SL => raw.chunks_exact(4).filter_map(|c| basic.decode_sl(c).ok()).map(f64::from).collect(),
            VR::FL => raw.chunks_exact(4).filter_map(|c| basic.decode_fl(c).ok()).map(f64::from).collect(),
            VR::FD => raw.chunks_exact(8).filter_map(|c| basic.decode_fd(c).ok()).collect(),
            _ => decode_text(raw)
                .split('\\')
                .filter_map(|v| v.trim().parse::<f64>().ok())
                .collect(),
        };

        NumericValue::from_values(values)
    }
}

#[inline]
fn has_preamble(bytes: &[u8]) -> bool {
    bytes.get(PREAMBLE_LEN..PREAMBLE_LEN + MAGIC_CODE.len()) == Some(MAGIC_CODE.as_slice())
}

#[inline]
fn value_of<'a>(bytes: &'a [u8], element: &ElementRef) -> &'a [u8] {
    // ranges were checked while walking
    &bytes[element.offset..element.offset + element.length]
}

fn decode_text(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

/// Primitive value decoder for one byte order
#[inline]
fn basic_decoder(order: ByteOrder) -> BasicDecoder {
    match order {
        ByteOrder::Little => BasicDecoder::new(Endianness::Little),
        ByteOrder::Big => BasicDecoder::new(Endianness::Big),
    }
}

/// How the headers of the records at a position are encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    /// Explicit VR in the data set's byte order
    Explicit,
    /// Items of an undefined-length UN element (PS3.5 6.2.2)
    ImplicitLittle,
}

/// Element and item header decoders, chosen per walk position
enum HeaderDecoder {
    ExplicitLe(ExplicitVRLittleEndianDecoder),
    ExplicitBe(ExplicitVRBigEndianDecoder),
    ImplicitLe(StandardImplicitVRLittleEndianDecoder),
}

macro_rules! with_decoder {
    ($s: expr, |$d: ident| $f: expr) => {
        match $s {
            HeaderDecoder::ExplicitLe($d) => $f,
            HeaderDecoder::ExplicitBe($d) => $f,
            HeaderDecoder::ImplicitLe($d) => $f,
        }
    };
}

impl HeaderDecoder {
    fn new(order: ByteOrder, encoding: Encoding) -> Self {
        match (encoding, order) {
            (Encoding::Explicit, ByteOrder::Little) => Self::ExplicitLe(ExplicitVRLittleEndianDecoder::default()),
            (Encoding::Explicit, ByteOrder::Big) => Self::ExplicitBe(ExplicitVRBigEndianDecoder::default()),
            (Encoding::ImplicitLittle, _) => Self::ImplicitLe(ImplicitVRLittleEndianDecoder::with_std_dict()),
        }
    }

    fn header(&self, mut source: &[u8]) -> std::result::Result<(DataElementHeader, usize), String> {
        with_decoder!(self, |d| d.decode_header(&mut source)).map_err(|e| e.to_string())
    }

    fn item_header(&self, mut source: &[u8]) -> std::result::Result<SequenceItemHeader, String> {
        with_decoder!(self, |d| d.decode_item_header(&mut source)).map_err(|e| e.to_string())
    }
}

/// Bounds-checked cursor-free reader over the whole buffer
struct Walker<'a> {
    bytes: &'a [u8],
    order: ByteOrder,
}

impl<'a> Walker<'a> {
    fn new(bytes: &'a [u8], order: ByteOrder) -> Self {
        Self { bytes, order }
    }

    fn take(&self, pos: usize, len: usize) -> Result<&'a [u8]> {
        pos.checked_add(len)
            .and_then(|end| self.bytes.get(pos..end))
            .ok_or_else(|| {
                DecodeError::malformed(
                    pos,
                    format!(
                        "record truncated: need {len} bytes, {} remain",
                        self.bytes.len().saturating_sub(pos)
                    ),
                )
            })
    }

    #[inline]
    fn rest(&self, pos: usize) -> &'a [u8] {
        self.bytes.get(pos..).unwrap_or_default()
    }

    fn byte_order_of(&self, encoding: Encoding) -> ByteOrder {
        match encoding {
            Encoding::Explicit => self.order,
            Encoding::ImplicitLittle => ByteOrder::Little,
        }
    }

    fn tag_at(&self, pos: usize, encoding: Encoding) -> Result<Tag> {
        let raw = self.take(pos, 4)?;
        basic_decoder(self.byte_order_of(encoding))
            .decode_tag(raw)
            .map_err(|e| DecodeError::malformed(pos, format!("unreadable tag: {e}")))
    }

    fn peek_group(&self, pos: usize) -> Option<u16> {
        let raw = self.take(pos, 2).ok()?;
        basic_decoder(self.order).decode_us(raw).ok()
    }

    fn advance(&self, pos: usize, len: usize) -> Result<usize> {
        self.take(pos, len).map(|_| pos + len)
    }

    /// Header of the element at `pos` and the number of bytes it spans
    fn read_header(&self, pos: usize, encoding: Encoding) -> Result<(DataElementHeader, usize)> {
        let tag = self.tag_at(pos, encoding)?;
        if tag.group() == 0xFFFE {
            return Err(DecodeError::malformed(
                pos,
                format!("unexpected item or delimiter {tag}"),
            ));
        }

        // the explicit decoders read unknown VR bytes as UN
        if encoding == Encoding::Explicit {
            let raw = self.take(pos + 4, 2)?;
            if VR::from_binary([raw[0], raw[1]]).is_none() {
                return Err(DecodeError::UnsupportedFormat(format!(
                    "element {tag} at byte {pos} has no explicit value representation (implicit VR data?)"
                )));
            }
        }

        HeaderDecoder::new(self.order, encoding)
            .header(self.rest(pos))
            .map_err(|e| DecodeError::malformed(pos, format!("record truncated: {e}")))
    }

    fn read_element(&self, pos: usize, depth: usize, encoding: Encoding) -> Result<(ElementRef, usize)> {
        let (DataElementHeader { tag, vr, len }, header_len) = self.read_header(pos, encoding)?;
        let offset = pos + header_len;

        if len.is_undefined() {
            if tag == tags::PIXEL_DATA {
                return Err(DecodeError::UnsupportedFormat(
                    "encapsulated (undefined length) pixel data".to_string(),
                ));
            }
            let items = match (encoding, vr) {
                (Encoding::Explicit, VR::SQ) => Encoding::Explicit,
                (Encoding::Explicit, VR::UN) | (Encoding::ImplicitLittle, _) => Encoding::ImplicitLittle,
                _ => {
                    return Err(DecodeError::malformed(
                        pos,
                        format!("element {tag} ({vr}) has undefined length"),
                    ));
                }
            };
            let end = self.skip_sequence(offset, depth + 1, items)?;
            let element = self.element_ref(tag, vr, offset, end - offset);
            return Ok((element, end));
        }

        let length = len.0 as usize;
        let remaining = self.bytes.len().saturating_sub(offset);
        if length > remaining {
            return Err(DecodeError::malformed(
                pos,
                format!("element {tag} declares {length} bytes but only {remaining} remain"),
            ));
        }

        Ok((self.element_ref(tag, vr, offset, length), offset + length))
    }

    fn element_ref(&self, tag: Tag, vr: VR, offset: usize, length: usize) -> ElementRef {
        ElementRef {
            tag,
            vr,
            offset,
            length,
            byte_order: self.order,
        }
    }

    /// Skip the items of an undefined-length sequence, returning the
    /// position just past its delimiter.
    fn skip_sequence(&self, mut pos: usize, depth: usize, encoding: Encoding) -> Result<usize> {
        if depth > MAX_SEQUENCE_DEPTH {
            return Err(DecodeError::malformed(pos, "sequences nested too deeply"));
        }

        let decoder = HeaderDecoder::new(self.order, encoding);
        loop {
            let item = decoder
                .item_header(self.rest(pos))
                .map_err(|e| DecodeError::malformed(pos, format!("expected a sequence item: {e}")))?;
            let item_start = pos + ITEM_HEADER_LEN;

            pos = match item {
                SequenceItemHeader::SequenceDelimiter => return Ok(item_start),
                SequenceItemHeader::ItemDelimiter => {
                    return Err(DecodeError::malformed(pos, "item delimiter outside an item"));
                }
                SequenceItemHeader::Item { len } if len.is_undefined() => {
                    self.skip_item(item_start, depth, encoding)?
                }
                SequenceItemHeader::Item { len } => self.advance(item_start, len.0 as usize)?,
            };
        }
    }

    fn skip_item(&self, mut pos: usize, depth: usize, encoding: Encoding) -> Result<usize> {
        loop {
            if self.tag_at(pos, encoding)? == ITEM_DELIMITER {
                return self.advance(pos, ITEM_HEADER_LEN);
            }
            let (_, next) = self.read_element(pos, depth, encoding)?;
            pos = next;
        }
    }
}
