//! TIFF header and IFD (Image File Directory) parsing.
//!
//! A TIFF file opens with a two-byte order mark ("II" little endian, "MM"
//! big endian), the magic number 42, and the offset of the first IFD. The
//! IFD is a table of 12-byte entries, each carrying a tag, a field type, a
//! value count, and either the value itself (when it fits in four bytes,
//! left-justified) or the offset where the value is stored.

use crate::error::TiffError;

// ===== Well-known tags =====

pub const TAG_IMAGE_WIDTH: u16 = 256;
pub const TAG_IMAGE_LENGTH: u16 = 257;
pub const TAG_BITS_PER_SAMPLE: u16 = 258;
pub const TAG_COMPRESSION: u16 = 259;
pub const TAG_STRIP_OFFSETS: u16 = 273;
pub const TAG_SAMPLES_PER_PIXEL: u16 = 277;
pub const TAG_ROWS_PER_STRIP: u16 = 278;
pub const TAG_STRIP_BYTE_COUNTS: u16 = 279;
pub const TAG_PLANAR_CONFIGURATION: u16 = 284;
pub const TAG_TILE_WIDTH: u16 = 322;
pub const TAG_SAMPLE_FORMAT: u16 = 339;
pub const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
pub const TAG_MODEL_TIEPOINT: u16 = 33922;
pub const TAG_MODEL_TRANSFORMATION: u16 = 34264;
pub const TAG_GDAL_NODATA: u16 = 42113;

// ===== Field types =====

pub const TYPE_BYTE: u16 = 1;
pub const TYPE_ASCII: u16 = 2;
pub const TYPE_SHORT: u16 = 3;
pub const TYPE_LONG: u16 = 4;
pub const TYPE_RATIONAL: u16 = 5;
pub const TYPE_SBYTE: u16 = 6;
pub const TYPE_UNDEFINED: u16 = 7;
pub const TYPE_SSHORT: u16 = 8;
pub const TYPE_SLONG: u16 = 9;
pub const TYPE_SRATIONAL: u16 = 10;
pub const TYPE_FLOAT: u16 = 11;
pub const TYPE_DOUBLE: u16 = 12;

/// Size in bytes of one value of the given field type.
fn field_type_size(field_type: u16) -> Option<usize> {
    match field_type {
        TYPE_BYTE | TYPE_ASCII | TYPE_SBYTE | TYPE_UNDEFINED => Some(1),
        TYPE_SHORT | TYPE_SSHORT => Some(2),
        TYPE_LONG | TYPE_SLONG | TYPE_FLOAT => Some(4),
        TYPE_RATIONAL | TYPE_SRATIONAL | TYPE_DOUBLE => Some(8),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    pub fn u16_from(self, raw: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Little => u16::from_le_bytes(raw),
            ByteOrder::Big => u16::from_be_bytes(raw),
        }
    }

    pub fn u32_from(self, raw: [u8; 4]) -> u32 {
        match self {
            ByteOrder::Little => u32::from_le_bytes(raw),
            ByteOrder::Big => u32::from_be_bytes(raw),
        }
    }

    pub fn i16_from(self, raw: [u8; 2]) -> i16 {
        match self {
            ByteOrder::Little => i16::from_le_bytes(raw),
            ByteOrder::Big => i16::from_be_bytes(raw),
        }
    }

    pub fn i32_from(self, raw: [u8; 4]) -> i32 {
        match self {
            ByteOrder::Little => i32::from_le_bytes(raw),
            ByteOrder::Big => i32::from_be_bytes(raw),
        }
    }

    pub fn f32_from(self, raw: [u8; 4]) -> f32 {
        match self {
            ByteOrder::Little => f32::from_le_bytes(raw),
            ByteOrder::Big => f32::from_be_bytes(raw),
        }
    }

    pub fn f64_from(self, raw: [u8; 8]) -> f64 {
        match self {
            ByteOrder::Little => f64::from_le_bytes(raw),
            ByteOrder::Big => f64::from_be_bytes(raw),
        }
    }
}

/// A TIFF byte stream together with its decoded byte order.
///
/// All multi-byte reads go through this struct so offsets are bounds
/// checked in one place.
pub struct TiffData<'a> {
    bytes: &'a [u8],
    pub order: ByteOrder,
}

impl<'a> TiffData<'a> {
    /// Parse the 8-byte TIFF header.
    ///
    /// Returns the wrapped data and the offset of the first IFD.
    pub fn parse_header(bytes: &'a [u8]) -> Result<(Self, u32), TiffError> {
        if bytes.len() < 8 {
            return Err(TiffError::InvalidFormat(
                "not enough data for TIFF header".to_string(),
            ));
        }

        // Header layout:
        // Bytes 0-1: byte order mark, "II" or "MM"
        // Bytes 2-3: magic number 42
        // Bytes 4-7: offset of the first IFD
        let order = match &bytes[0..2] {
            b"II" => ByteOrder::Little,
            b"MM" => ByteOrder::Big,
            other => {
                return Err(TiffError::InvalidFormat(format!(
                    "invalid byte order mark: {:?}",
                    other
                )))
            }
        };

        let data = Self { bytes, order };
        let magic = data.read_u16(2)?;
        if magic != 42 {
            return Err(TiffError::InvalidFormat(format!(
                "invalid TIFF magic number: {}",
                magic
            )));
        }

        let ifd_offset = data.read_u32(4)?;
        Ok((data, ifd_offset))
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16, TiffError> {
        let raw = self.slice(offset, 2)?;
        Ok(self.order.u16_from([raw[0], raw[1]]))
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32, TiffError> {
        let raw = self.slice(offset, 4)?;
        Ok(self.order.u32_from([raw[0], raw[1], raw[2], raw[3]]))
    }

    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], TiffError> {
        self.bytes
            .get(offset..offset.saturating_add(len))
            .ok_or_else(|| {
                TiffError::InvalidFormat(format!(
                    "read of {} bytes at offset {} past end of file ({} bytes)",
                    len,
                    offset,
                    self.bytes.len()
                ))
            })
    }
}

/// One 12-byte IFD entry.
#[derive(Debug, Clone)]
pub struct IfdEntry {
    pub tag: u16,
    pub field_type: u16,
    pub count: u32,
    value_field: [u8; 4],
}

impl IfdEntry {
    /// Resolve the raw value bytes, following the offset indirection when
    /// the value does not fit inline.
    fn payload_bytes<'s>(&'s self, data: &TiffData<'s>) -> Result<&'s [u8], TiffError> {
        let unit = field_type_size(self.field_type).ok_or_else(|| {
            TiffError::InvalidFormat(format!(
                "tag {} has unknown field type {}",
                self.tag, self.field_type
            ))
        })?;
        let size = unit * self.count as usize;
        if size <= 4 {
            Ok(&self.value_field[..size])
        } else {
            let offset = data.order.u32_from(self.value_field) as usize;
            data.slice(offset, size)
        }
    }

    /// Read the values as u32, accepting SHORT and LONG fields.
    pub fn values_u32(&self, data: &TiffData) -> Result<Vec<u32>, TiffError> {
        let payload = self.payload_bytes(data)?;
        match self.field_type {
            TYPE_SHORT => Ok(payload
                .chunks_exact(2)
                .map(|c| data.order.u16_from([c[0], c[1]]) as u32)
                .collect()),
            TYPE_LONG => Ok(payload
                .chunks_exact(4)
                .map(|c| data.order.u32_from([c[0], c[1], c[2], c[3]]))
                .collect()),
            other => Err(TiffError::InvalidFormat(format!(
                "tag {} has type {} where SHORT or LONG was expected",
                self.tag, other
            ))),
        }
    }

    /// Read the first value as u32, for tags that carry a single number.
    pub fn value_u32(&self, data: &TiffData) -> Result<u32, TiffError> {
        self.values_u32(data)?.first().copied().ok_or_else(|| {
            TiffError::InvalidFormat(format!("tag {} has no values", self.tag))
        })
    }

    /// Read the values as f64, for DOUBLE fields.
    pub fn values_f64(&self, data: &TiffData) -> Result<Vec<f64>, TiffError> {
        if self.field_type != TYPE_DOUBLE {
            return Err(TiffError::InvalidFormat(format!(
                "tag {} has type {} where DOUBLE was expected",
                self.tag, self.field_type
            )));
        }
        let payload = self.payload_bytes(data)?;
        Ok(payload
            .chunks_exact(8)
            .map(|c| {
                data.order
                    .f64_from([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]])
            })
            .collect())
    }

    /// Read the value as a NUL-terminated ASCII string.
    pub fn value_ascii(&self, data: &TiffData) -> Result<String, TiffError> {
        if self.field_type != TYPE_ASCII {
            return Err(TiffError::InvalidFormat(format!(
                "tag {} has type {} where ASCII was expected",
                self.tag, self.field_type
            )));
        }
        let payload = self.payload_bytes(data)?;
        let end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
        Ok(String::from_utf8_lossy(&payload[..end]).into_owned())
    }
}

/// Parse the IFD at the given offset.
///
/// Only the first IFD is ever read; GDAL stores reduced-resolution
/// overviews in later IFDs and those are deliberately ignored.
pub fn parse_ifd(data: &TiffData, offset: u32) -> Result<Vec<IfdEntry>, TiffError> {
    let offset = offset as usize;
    let count = data.read_u16(offset)? as usize;
    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        let base = offset + 2 + i * 12;
        let value_raw = data.slice(base + 8, 4)?;
        entries.push(IfdEntry {
            tag: data.read_u16(base)?,
            field_type: data.read_u16(base + 2)?,
            count: data.read_u32(base + 4)?,
            value_field: [value_raw[0], value_raw[1], value_raw[2], value_raw[3]],
        });
    }
    Ok(entries)
}

/// Find an entry by tag.
pub fn find_entry<'e>(entries: &'e [IfdEntry], tag: u16) -> Option<&'e IfdEntry> {
    entries.iter().find(|e| e.tag == tag)
}
