//! Raster assembly from parsed TIFF structures.
//!
//! `parse_geotiff` walks the first IFD, validates that the file uses the
//! supported striped baseline layout, decodes every strip into interleaved
//! `f64` samples, and derives the geographic bounds from the
//! ModelPixelScale and ModelTiepoint tags.

use std::io::Read;
use std::path::Path;

use flate2::read::ZlibDecoder;
use flood_common::LatLonBounds;

use crate::error::TiffError;
use crate::ifd::{self, ByteOrder, IfdEntry, TiffData};

// Compression codes the reader accepts: none, Adobe Deflate, and the
// older Deflate code some writers still emit.
const COMPRESSION_NONE: u32 = 1;
const COMPRESSION_ADOBE_DEFLATE: u32 = 8;
const COMPRESSION_DEFLATE: u32 = 32946;

/// A decoded raster with geographic bounds.
#[derive(Debug, Clone)]
pub struct RasterLayer {
    pub width: u32,
    pub height: u32,
    pub band_count: usize,
    /// Interleaved samples, row-major, `band_count` values per pixel.
    pub samples: Vec<f64>,
    /// Sentinel value marking no-data pixels, from the GDAL_NODATA tag.
    pub nodata: Option<f64>,
    pub bounds: LatLonBounds,
}

impl RasterLayer {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Sample value at (col, row) for the given zero-based band.
    pub fn sample(&self, col: u32, row: u32, band: usize) -> f64 {
        let pixel = row as usize * self.width as usize + col as usize;
        self.samples[pixel * self.band_count + band]
    }
}

/// Read and parse a GeoTIFF file.
pub fn read_geotiff(path: &Path) -> Result<RasterLayer, TiffError> {
    let bytes = std::fs::read(path)?;
    parse_geotiff(&bytes)
}

/// Parse a GeoTIFF byte stream.
pub fn parse_geotiff(bytes: &[u8]) -> Result<RasterLayer, TiffError> {
    let (data, ifd_offset) = TiffData::parse_header(bytes)?;
    let entries = ifd::parse_ifd(&data, ifd_offset)?;

    if ifd::find_entry(&entries, ifd::TAG_TILE_WIDTH).is_some() {
        return Err(TiffError::Unsupported(
            "tiled TIFF layout (striped layout required)".to_string(),
        ));
    }

    let width = required(&entries, ifd::TAG_IMAGE_WIDTH, "ImageWidth")?.value_u32(&data)?;
    let height = required(&entries, ifd::TAG_IMAGE_LENGTH, "ImageLength")?.value_u32(&data)?;
    if width == 0 || height == 0 {
        return Err(TiffError::InvalidFormat(format!(
            "zero raster dimension: {}x{}",
            width, height
        )));
    }

    let band_count = match ifd::find_entry(&entries, ifd::TAG_SAMPLES_PER_PIXEL) {
        Some(entry) => entry.value_u32(&data)? as usize,
        None => 1,
    };
    if band_count == 0 {
        return Err(TiffError::InvalidFormat("zero samples per pixel".to_string()));
    }

    let bits = uniform_per_band(
        &entries,
        &data,
        ifd::TAG_BITS_PER_SAMPLE,
        "BitsPerSample",
        8,
    )?;
    let sample_format = uniform_per_band(
        &entries,
        &data,
        ifd::TAG_SAMPLE_FORMAT,
        "SampleFormat",
        1,
    )?;

    let compression = match ifd::find_entry(&entries, ifd::TAG_COMPRESSION) {
        Some(entry) => entry.value_u32(&data)?,
        None => COMPRESSION_NONE,
    };
    if !matches!(
        compression,
        COMPRESSION_NONE | COMPRESSION_ADOBE_DEFLATE | COMPRESSION_DEFLATE
    ) {
        return Err(TiffError::Unsupported(format!(
            "compression scheme {}",
            compression
        )));
    }

    if let Some(entry) = ifd::find_entry(&entries, ifd::TAG_PLANAR_CONFIGURATION) {
        if entry.value_u32(&data)? != 1 {
            return Err(TiffError::Unsupported(
                "planar band organization (chunky layout required)".to_string(),
            ));
        }
    }

    let bounds = read_bounds(&entries, &data, width, height)?;
    let nodata = read_nodata(&entries, &data)?;

    let strip_offsets =
        required(&entries, ifd::TAG_STRIP_OFFSETS, "StripOffsets")?.values_u32(&data)?;
    let strip_byte_counts =
        required(&entries, ifd::TAG_STRIP_BYTE_COUNTS, "StripByteCounts")?.values_u32(&data)?;
    if strip_offsets.len() != strip_byte_counts.len() {
        return Err(TiffError::InvalidFormat(format!(
            "{} strip offsets but {} byte counts",
            strip_offsets.len(),
            strip_byte_counts.len()
        )));
    }

    // Some writers put 2^32-1 here to mean "all rows in one strip".
    let rows_per_strip = match ifd::find_entry(&entries, ifd::TAG_ROWS_PER_STRIP) {
        Some(entry) => {
            let rows = entry.value_u32(&data)?;
            if rows == 0 {
                height
            } else {
                rows.min(height)
            }
        }
        None => height,
    };

    let samples_per_row = width as usize * band_count;
    let bytes_per_sample = (bits / 8) as usize;
    let mut samples = Vec::with_capacity(samples_per_row * height as usize);
    let mut rows_done: u32 = 0;

    for (index, (&offset, &byte_count)) in
        strip_offsets.iter().zip(&strip_byte_counts).enumerate()
    {
        if rows_done >= height {
            return Err(TiffError::InvalidFormat(format!(
                "strip {} lies beyond the raster's {} rows",
                index, height
            )));
        }
        let rows_in_strip = rows_per_strip.min(height - rows_done);
        let raw = data.slice(offset as usize, byte_count as usize)?;

        let inflated;
        let strip_bytes: &[u8] = if compression == COMPRESSION_NONE {
            raw
        } else {
            inflated = inflate_strip(raw, index)?;
            &inflated
        };

        let expected = rows_in_strip as usize * samples_per_row * bytes_per_sample;
        if strip_bytes.len() < expected {
            return Err(TiffError::InvalidFormat(format!(
                "strip {} holds {} bytes, expected {}",
                index,
                strip_bytes.len(),
                expected
            )));
        }

        decode_samples(
            &strip_bytes[..expected],
            sample_format,
            bits,
            data.order,
            &mut samples,
        )?;
        rows_done += rows_in_strip;
    }

    if rows_done != height {
        return Err(TiffError::InvalidFormat(format!(
            "strips cover {} of {} rows",
            rows_done, height
        )));
    }

    tracing::debug!(
        width,
        height,
        bands = band_count,
        nodata = ?nodata,
        "parsed geotiff"
    );

    Ok(RasterLayer {
        width,
        height,
        band_count,
        samples,
        nodata,
        bounds,
    })
}

fn required<'e>(
    entries: &'e [IfdEntry],
    tag: u16,
    name: &str,
) -> Result<&'e IfdEntry, TiffError> {
    ifd::find_entry(entries, tag)
        .ok_or_else(|| TiffError::InvalidFormat(format!("missing required tag {}", name)))
}

/// Read a per-band tag (BitsPerSample, SampleFormat) and require that all
/// bands agree; mixed-band layouts are not worth supporting.
fn uniform_per_band(
    entries: &[IfdEntry],
    data: &TiffData,
    tag: u16,
    name: &str,
    default: u32,
) -> Result<u32, TiffError> {
    let values = match ifd::find_entry(entries, tag) {
        Some(entry) => entry.values_u32(data)?,
        None => return Ok(default),
    };
    match values.first() {
        Some(&first) if values.iter().all(|&v| v == first) => Ok(first),
        Some(_) => Err(TiffError::Unsupported(format!(
            "mixed per-band {} values {:?}",
            name, values
        ))),
        None => Ok(default),
    }
}

fn read_bounds(
    entries: &[IfdEntry],
    data: &TiffData,
    width: u32,
    height: u32,
) -> Result<LatLonBounds, TiffError> {
    let scale_entry = ifd::find_entry(entries, ifd::TAG_MODEL_PIXEL_SCALE);
    let tiepoint_entry = ifd::find_entry(entries, ifd::TAG_MODEL_TIEPOINT);

    let (scale_entry, tiepoint_entry) = match (scale_entry, tiepoint_entry) {
        (Some(s), Some(t)) => (s, t),
        _ => {
            // An affine transformation matrix could also georeference the
            // raster, but none of the products use one.
            if ifd::find_entry(entries, ifd::TAG_MODEL_TRANSFORMATION).is_some() {
                return Err(TiffError::Unsupported(
                    "ModelTransformation georeferencing".to_string(),
                ));
            }
            return Err(TiffError::MissingGeoReference);
        }
    };

    let scale = scale_entry.values_f64(data)?;
    if scale.len() < 2 {
        return Err(TiffError::InvalidFormat(
            "ModelPixelScale needs at least 2 values".to_string(),
        ));
    }
    let (sx, sy) = (scale[0], scale[1]);
    if !(sx.is_finite() && sy.is_finite() && sx > 0.0 && sy > 0.0) {
        return Err(TiffError::InvalidFormat(format!(
            "non-positive pixel scale ({}, {})",
            sx, sy
        )));
    }

    let tiepoint = tiepoint_entry.values_f64(data)?;
    if tiepoint.len() < 6 {
        return Err(TiffError::InvalidFormat(
            "ModelTiepoint needs at least 6 values".to_string(),
        ));
    }
    // Tiepoint maps raster position (i, j) to model position (x, y).
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
    let west = x - i * sx;
    let north = y + j * sy;
    let east = west + sx * width as f64;
    let south = north - sy * height as f64;

    Ok(LatLonBounds::new(south, west, north, east))
}

fn read_nodata(entries: &[IfdEntry], data: &TiffData) -> Result<Option<f64>, TiffError> {
    let entry = match ifd::find_entry(entries, ifd::TAG_GDAL_NODATA) {
        Some(entry) => entry,
        None => return Ok(None),
    };
    let text = entry.value_ascii(data)?;
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("nan") {
        return Ok(Some(f64::NAN));
    }
    match trimmed.parse::<f64>() {
        Ok(value) => Ok(Some(value)),
        Err(_) => {
            tracing::warn!(value = %trimmed, "unparseable GDAL_NODATA tag, ignoring");
            Ok(None)
        }
    }
}

fn inflate_strip(raw: &[u8], index: usize) -> Result<Vec<u8>, TiffError> {
    let mut decoder = ZlibDecoder::new(raw);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| TiffError::InvalidFormat(format!("deflate strip {}: {}", index, e)))?;
    Ok(out)
}

fn decode_samples(
    raw: &[u8],
    format: u32,
    bits: u32,
    order: ByteOrder,
    out: &mut Vec<f64>,
) -> Result<(), TiffError> {
    match (format, bits) {
        (1, 8) => out.extend(raw.iter().map(|&b| b as f64)),
        (1, 16) => out.extend(
            raw.chunks_exact(2)
                .map(|c| order.u16_from([c[0], c[1]]) as f64),
        ),
        (1, 32) => out.extend(
            raw.chunks_exact(4)
                .map(|c| order.u32_from([c[0], c[1], c[2], c[3]]) as f64),
        ),
        (2, 16) => out.extend(
            raw.chunks_exact(2)
                .map(|c| order.i16_from([c[0], c[1]]) as f64),
        ),
        (2, 32) => out.extend(
            raw.chunks_exact(4)
                .map(|c| order.i32_from([c[0], c[1], c[2], c[3]]) as f64),
        ),
        (3, 32) => out.extend(
            raw.chunks_exact(4)
                .map(|c| order.f32_from([c[0], c[1], c[2], c[3]]) as f64),
        ),
        (3, 64) => out.extend(raw.chunks_exact(8).map(|c| {
            order.f64_from([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]])
        })),
        (f, b) => {
            return Err(TiffError::Unsupported(format!(
                "sample format {} with {} bits per sample",
                f, b
            )))
        }
    }
    Ok(())
}
