//! Synthetic GeoTIFF builder for raster fixtures.
//!
//! Produces striped baseline TIFFs with the georeferencing tags the
//! dashboard's raster products carry (ModelPixelScale, ModelTiepoint,
//! GDAL_NODATA, a minimal EPSG:4326 GeoKey directory). Every knob that the
//! reader has to handle is configurable: byte order, band count, sample
//! format, strip size, and Deflate compression.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

/// TIFF byte order marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// On-disk sample representation for every band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    U8,
    U16,
    U32,
    I16,
    I32,
    F32,
    F64,
}

impl SampleKind {
    fn bits(self) -> u16 {
        match self {
            SampleKind::U8 => 8,
            SampleKind::U16 | SampleKind::I16 => 16,
            SampleKind::U32 | SampleKind::I32 | SampleKind::F32 => 32,
            SampleKind::F64 => 64,
        }
    }

    /// TIFF SampleFormat code: 1 unsigned, 2 signed, 3 IEEE float.
    fn format_code(self) -> u16 {
        match self {
            SampleKind::U8 | SampleKind::U16 | SampleKind::U32 => 1,
            SampleKind::I16 | SampleKind::I32 => 2,
            SampleKind::F32 | SampleKind::F64 => 3,
        }
    }

    fn byte_size(self) -> usize {
        (self.bits() / 8) as usize
    }
}

/// Strip compression scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    None,
    /// Adobe Deflate (code 8): zlib-wrapped strips.
    Deflate,
}

// TIFF field types used by the builder.
const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_DOUBLE: u16 = 12;

/// Builder for synthetic GeoTIFF byte streams.
///
/// Defaults: one band of little-endian `f64` samples, a single strip, no
/// compression, no nodata, and a plausible bounding box over the Kali
/// Babon watershed (origin 110.3 E / 6.9 S, 0.001 degree pixels).
///
/// # Example
///
/// ```ignore
/// let bytes = TiffBuilder::new(2, 2)
///     .nodata(0.0)
///     .samples(vec![0.0, 10.0, 20.0, 30.0])
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct TiffBuilder {
    width: u32,
    height: u32,
    bands: u16,
    kind: SampleKind,
    order: ByteOrder,
    compression: TiffCompression,
    rows_per_strip: u32,
    nodata: Option<f64>,
    pixel_scale: (f64, f64),
    origin: (f64, f64),
    geo_tags: bool,
    samples: Vec<f64>,
}

impl TiffBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bands: 1,
            kind: SampleKind::F64,
            order: ByteOrder::Little,
            compression: TiffCompression::None,
            rows_per_strip: height.max(1),
            nodata: None,
            pixel_scale: (0.001, 0.001),
            origin: (110.3, -6.9),
            geo_tags: true,
            samples: Vec::new(),
        }
    }

    pub fn bands(mut self, bands: u16) -> Self {
        self.bands = bands;
        self
    }

    pub fn sample_kind(mut self, kind: SampleKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.order = order;
        self
    }

    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = compression;
        self
    }

    pub fn rows_per_strip(mut self, rows: u32) -> Self {
        self.rows_per_strip = rows.max(1);
        self
    }

    pub fn nodata(mut self, value: f64) -> Self {
        self.nodata = Some(value);
        self
    }

    /// Pixel size in degrees (x, y). The y scale is positive; rasters are
    /// stored north-up.
    pub fn pixel_scale(mut self, sx: f64, sy: f64) -> Self {
        self.pixel_scale = (sx, sy);
        self
    }

    /// Geographic position of the top-left raster corner.
    pub fn origin(mut self, west: f64, north: f64) -> Self {
        self.origin = (west, north);
        self
    }

    /// Omit the georeferencing tags entirely, producing a plain TIFF.
    pub fn without_geo(mut self) -> Self {
        self.geo_tags = false;
        self
    }

    /// Interleaved samples, row-major, `bands` values per pixel.
    ///
    /// Length must equal `width * height * bands`; `build` panics
    /// otherwise.
    pub fn samples(mut self, samples: Vec<f64>) -> Self {
        self.samples = samples;
        self
    }

    /// Serialize the configured raster to TIFF bytes.
    pub fn build(&self) -> Vec<u8> {
        let expected = self.width as usize * self.height as usize * self.bands as usize;
        assert_eq!(
            self.samples.len(),
            expected,
            "sample count {} does not match {}x{}x{}",
            self.samples.len(),
            self.width,
            self.height,
            self.bands
        );

        let strips = self.encode_strips();
        let mut entries = self.build_entries(&strips);

        // Layout: header (8) | IFD | out-of-line values | strip data.
        let ifd_size = 2 + entries.len() * 12 + 4;
        let mut cursor = 8 + ifd_size;
        for entry in entries.iter_mut() {
            if entry.payload.len() > 4 {
                entry.offset = Some(cursor as u32);
                cursor += entry.payload.len();
                if cursor % 2 == 1 {
                    cursor += 1;
                }
            }
        }

        let mut strip_offsets = Vec::with_capacity(strips.len());
        for strip in &strips {
            strip_offsets.push(cursor as u32);
            cursor += strip.len();
            if cursor % 2 == 1 {
                cursor += 1;
            }
        }

        // Strip positions are known now; rewrite tag 273's payload.
        let offsets_payload = self.encode_u32_array(&strip_offsets);
        for entry in entries.iter_mut() {
            if entry.tag == 273 {
                entry.payload = offsets_payload.clone();
            }
        }

        let mut out = Vec::with_capacity(cursor);
        match self.order {
            ByteOrder::Little => out.extend_from_slice(b"II"),
            ByteOrder::Big => out.extend_from_slice(b"MM"),
        }
        self.put_u16(&mut out, 42);
        self.put_u32(&mut out, 8);

        self.put_u16(&mut out, entries.len() as u16);
        for entry in &entries {
            self.put_u16(&mut out, entry.tag);
            self.put_u16(&mut out, entry.type_);
            self.put_u32(&mut out, entry.count);
            match entry.offset {
                Some(offset) => self.put_u32(&mut out, offset),
                None => {
                    // Inline value, left-justified in the 4-byte field.
                    let mut field = entry.payload.clone();
                    field.resize(4, 0);
                    out.extend_from_slice(&field);
                }
            }
        }
        self.put_u32(&mut out, 0); // no next IFD

        for entry in &entries {
            if entry.offset.is_some() {
                out.extend_from_slice(&entry.payload);
                if out.len() % 2 == 1 {
                    out.push(0);
                }
            }
        }

        for strip in &strips {
            out.extend_from_slice(strip);
            if out.len() % 2 == 1 {
                out.push(0);
            }
        }

        debug_assert_eq!(out.len(), cursor);
        out
    }

    // ===== Strip encoding =====

    fn encode_strips(&self) -> Vec<Vec<u8>> {
        let row_samples = self.width as usize * self.bands as usize;
        let mut strips = Vec::new();
        let mut row = 0u32;
        while row < self.height {
            let rows = self.rows_per_strip.min(self.height - row);
            let start = row as usize * row_samples;
            let end = (row + rows) as usize * row_samples;
            let mut raw = Vec::with_capacity((end - start) * self.kind.byte_size());
            for &value in &self.samples[start..end] {
                self.put_sample(&mut raw, value);
            }
            let data = match self.compression {
                TiffCompression::None => raw,
                TiffCompression::Deflate => {
                    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                    encoder.write_all(&raw).expect("zlib write");
                    encoder.finish().expect("zlib finish")
                }
            };
            strips.push(data);
            row += rows;
        }
        strips
    }

    fn put_sample(&self, buf: &mut Vec<u8>, value: f64) {
        match self.kind {
            SampleKind::U8 => buf.push(value as u8),
            SampleKind::U16 => self.put_u16(buf, value as u16),
            SampleKind::U32 => self.put_u32(buf, value as u32),
            SampleKind::I16 => {
                let v = value as i16;
                match self.order {
                    ByteOrder::Little => buf.extend_from_slice(&v.to_le_bytes()),
                    ByteOrder::Big => buf.extend_from_slice(&v.to_be_bytes()),
                }
            }
            SampleKind::I32 => {
                let v = value as i32;
                match self.order {
                    ByteOrder::Little => buf.extend_from_slice(&v.to_le_bytes()),
                    ByteOrder::Big => buf.extend_from_slice(&v.to_be_bytes()),
                }
            }
            SampleKind::F32 => {
                let v = value as f32;
                match self.order {
                    ByteOrder::Little => buf.extend_from_slice(&v.to_le_bytes()),
                    ByteOrder::Big => buf.extend_from_slice(&v.to_be_bytes()),
                }
            }
            SampleKind::F64 => match self.order {
                ByteOrder::Little => buf.extend_from_slice(&value.to_le_bytes()),
                ByteOrder::Big => buf.extend_from_slice(&value.to_be_bytes()),
            },
        }
    }

    // ===== IFD assembly =====

    fn build_entries(&self, strips: &[Vec<u8>]) -> Vec<IfdEntry> {
        let strip_count = strips.len() as u32;
        let bits: Vec<u16> = vec![self.kind.bits(); self.bands as usize];
        let formats: Vec<u16> = vec![self.kind.format_code(); self.bands as usize];
        let byte_counts: Vec<u32> = strips.iter().map(|s| s.len() as u32).collect();
        let compression_code = match self.compression {
            TiffCompression::None => 1,
            TiffCompression::Deflate => 8,
        };
        let photometric = if self.bands >= 3 { 2 } else { 1 };

        // Tags must stay in ascending order.
        let mut entries = vec![
            IfdEntry::new(256, TYPE_LONG, 1, self.encode_u32_array(&[self.width])),
            IfdEntry::new(257, TYPE_LONG, 1, self.encode_u32_array(&[self.height])),
            IfdEntry::new(
                258,
                TYPE_SHORT,
                self.bands as u32,
                self.encode_u16_array(&bits),
            ),
            IfdEntry::new(259, TYPE_SHORT, 1, self.encode_u16_array(&[compression_code])),
            IfdEntry::new(262, TYPE_SHORT, 1, self.encode_u16_array(&[photometric])),
            // Placeholder payload; real offsets are patched in after layout.
            IfdEntry::new(
                273,
                TYPE_LONG,
                strip_count,
                self.encode_u32_array(&vec![0u32; strip_count as usize]),
            ),
            IfdEntry::new(277, TYPE_SHORT, 1, self.encode_u16_array(&[self.bands])),
            IfdEntry::new(
                278,
                TYPE_LONG,
                1,
                self.encode_u32_array(&[self.rows_per_strip]),
            ),
            IfdEntry::new(
                279,
                TYPE_LONG,
                strip_count,
                self.encode_u32_array(&byte_counts),
            ),
            IfdEntry::new(284, TYPE_SHORT, 1, self.encode_u16_array(&[1])),
            IfdEntry::new(
                339,
                TYPE_SHORT,
                self.bands as u32,
                self.encode_u16_array(&formats),
            ),
        ];

        if self.geo_tags {
            entries.push(IfdEntry::new(
                33550,
                TYPE_DOUBLE,
                3,
                self.encode_f64_array(&[self.pixel_scale.0, self.pixel_scale.1, 0.0]),
            ));
            entries.push(IfdEntry::new(
                33922,
                TYPE_DOUBLE,
                6,
                self.encode_f64_array(&[0.0, 0.0, 0.0, self.origin.0, self.origin.1, 0.0]),
            ));
            // Minimal GeoKey directory: geographic model, pixel-is-area,
            // EPSG:4326. The reader skips it; real products carry it.
            entries.push(IfdEntry::new(
                34735,
                TYPE_SHORT,
                16,
                self.encode_u16_array(&[
                    1, 1, 0, 3, 1024, 0, 1, 2, 1025, 0, 1, 1, 2048, 0, 1, 4326,
                ]),
            ));
        }

        if let Some(nodata) = self.nodata {
            let mut text = if nodata == nodata.trunc() && nodata.is_finite() {
                format!("{}", nodata as i64)
            } else if nodata.is_nan() {
                "nan".to_string()
            } else {
                format!("{}", nodata)
            };
            text.push('\0');
            entries.push(IfdEntry::new(
                42113,
                TYPE_ASCII,
                text.len() as u32,
                text.into_bytes(),
            ));
        }

        entries
    }

    // ===== Byte-order helpers =====

    fn put_u16(&self, buf: &mut Vec<u8>, v: u16) {
        match self.order {
            ByteOrder::Little => buf.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::Big => buf.extend_from_slice(&v.to_be_bytes()),
        }
    }

    fn put_u32(&self, buf: &mut Vec<u8>, v: u32) {
        match self.order {
            ByteOrder::Little => buf.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::Big => buf.extend_from_slice(&v.to_be_bytes()),
        }
    }

    fn encode_u16_array(&self, values: &[u16]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(values.len() * 2);
        for &v in values {
            self.put_u16(&mut buf, v);
        }
        buf
    }

    fn encode_u32_array(&self, values: &[u32]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(values.len() * 4);
        for &v in values {
            self.put_u32(&mut buf, v);
        }
        buf
    }

    fn encode_f64_array(&self, values: &[f64]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(values.len() * 8);
        for &v in values {
            match self.order {
                ByteOrder::Little => buf.extend_from_slice(&v.to_le_bytes()),
                ByteOrder::Big => buf.extend_from_slice(&v.to_be_bytes()),
            }
        }
        buf
    }
}

struct IfdEntry {
    tag: u16,
    type_: u16,
    count: u32,
    payload: Vec<u8>,
    offset: Option<u32>,
}

impl IfdEntry {
    fn new(tag: u16, type_: u16, count: u32, payload: Vec<u8>) -> Self {
        Self {
            tag,
            type_,
            count,
            payload,
            offset: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_little_endian() {
        let bytes = TiffBuilder::new(2, 2).samples(vec![0.0; 4]).build();
        assert_eq!(&bytes[0..2], b"II");
        assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]), 42);
        assert_eq!(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 8);
    }

    #[test]
    fn test_header_big_endian() {
        let bytes = TiffBuilder::new(2, 2)
            .byte_order(ByteOrder::Big)
            .samples(vec![0.0; 4])
            .build();
        assert_eq!(&bytes[0..2], b"MM");
        assert_eq!(u16::from_be_bytes([bytes[2], bytes[3]]), 42);
    }

    #[test]
    #[should_panic(expected = "sample count")]
    fn test_sample_count_mismatch_panics() {
        TiffBuilder::new(3, 3).samples(vec![1.0; 4]).build();
    }

    #[test]
    fn test_deterministic_output() {
        let make = || {
            TiffBuilder::new(4, 3)
                .nodata(-9999.0)
                .samples((0..12).map(|i| i as f64).collect())
                .build()
        };
        assert_eq!(make(), make());
    }

    #[test]
    fn test_even_length_output() {
        // Word alignment padding keeps every offset even.
        let bytes = TiffBuilder::new(3, 1)
            .sample_kind(SampleKind::U8)
            .samples(vec![1.0, 2.0, 3.0])
            .build();
        assert_eq!(bytes.len() % 2, 0);
    }
}
