//! RGBA rendering of decoded rasters.
//!
//! Every raster arrives pre-styled or pre-classified upstream; this module
//! only converts sample values to screen pixels. The band count decides the
//! conversion and there is no fallback between modes.

use flood_common::{DashboardError, LatLonBounds};
use geotiff_parser::RasterLayer;
use thiserror::Error;
use tracing::debug;

/// Grayscale level assigned to every valid pixel of a constant raster.
const CONSTANT_RASTER_LEVEL: u8 = 128;

/// Errors from converting a raster into an overlay image.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unsupported band count: {0} (expected 1, 3 or 4)")]
    UnsupportedBandCount(usize),

    #[error("PNG encoding failed: {0}")]
    PngEncode(String),
}

impl From<RenderError> for DashboardError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::UnsupportedBandCount(bands) => {
                DashboardError::UnsupportedBandCount(bands)
            }
            RenderError::PngEncode(message) => DashboardError::RenderError(message),
        }
    }
}

/// A raster rendered to RGBA pixels, ready for PNG encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedOverlay {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA bytes, 4 per pixel.
    pub pixels: Vec<u8>,
    /// Geographic extent of the image, for map placement.
    pub bounds: LatLonBounds,
}

impl RenderedOverlay {
    /// Encode the overlay as a PNG, indexed when the image has few enough
    /// colors and RGBA otherwise.
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        crate::png::create_png_auto(&self.pixels, self.width as usize, self.height as usize)
            .map_err(RenderError::PngEncode)
    }
}

/// Render a decoded raster into an RGBA overlay.
///
/// Dispatches on the exact band count. 1 band is rescaled to grayscale,
/// 3 bands pass through as opaque RGB, 4 bands pass through as RGBA. Any
/// other count fails with [`RenderError::UnsupportedBandCount`].
///
/// # Arguments
/// * `layer` - Decoded raster with interleaved samples
///
/// # Returns
/// The rendered overlay, or an error when the band count is unsupported.
pub fn render_overlay(layer: &RasterLayer) -> Result<RenderedOverlay, RenderError> {
    let pixels = match layer.band_count {
        1 => render_grayscale(layer),
        3 => render_rgb(layer),
        4 => render_rgba(layer),
        other => return Err(RenderError::UnsupportedBandCount(other)),
    };

    debug!(
        width = layer.width,
        height = layer.height,
        bands = layer.band_count,
        "Rendered raster overlay"
    );

    Ok(RenderedOverlay {
        width: layer.width,
        height: layer.height,
        pixels,
        bounds: layer.bounds,
    })
}

/// Saturating conversion of a channel sample to a byte.
///
/// Values outside [0, 255] clamp to the nearest bound and NaN maps to 0,
/// both via Rust's saturating float-to-int cast.
#[inline(always)]
fn channel_to_byte(value: f64) -> u8 {
    value as u8
}

/// Render a 4-band raster by passing R, G, B and A through unchanged.
fn render_rgba(layer: &RasterLayer) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(layer.pixel_count() * 4);
    for sample in layer.samples.chunks_exact(4) {
        pixels.push(channel_to_byte(sample[0]));
        pixels.push(channel_to_byte(sample[1]));
        pixels.push(channel_to_byte(sample[2]));
        pixels.push(channel_to_byte(sample[3]));
    }
    pixels
}

/// Render a 3-band raster as opaque RGB.
fn render_rgb(layer: &RasterLayer) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(layer.pixel_count() * 4);
    for sample in layer.samples.chunks_exact(3) {
        pixels.push(channel_to_byte(sample[0]));
        pixels.push(channel_to_byte(sample[1]));
        pixels.push(channel_to_byte(sample[2]));
        pixels.push(255);
    }
    pixels
}

/// Render a single-band raster as a min/max-rescaled grayscale ramp.
///
/// The min and max come from finite samples that are not the nodata
/// sentinel. Nodata samples map to level 0, and every pixel whose level is
/// exactly 0 (nodata or the band minimum) becomes fully transparent. A
/// raster with no valid samples renders fully transparent; a constant
/// raster renders its valid pixels at a fixed mid-gray.
fn render_grayscale(layer: &RasterLayer) -> Vec<u8> {
    let is_nodata = |value: f64| match layer.nodata {
        Some(sentinel) if sentinel.is_nan() => value.is_nan(),
        Some(sentinel) => value == sentinel,
        None => false,
    };

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut valid_samples = 0usize;
    for &value in &layer.samples {
        if is_nodata(value) || !value.is_finite() {
            continue;
        }
        if value < min {
            min = value;
        }
        if value > max {
            max = value;
        }
        valid_samples += 1;
    }

    let mut pixels = Vec::with_capacity(layer.pixel_count() * 4);

    if valid_samples == 0 {
        pixels.resize(layer.pixel_count() * 4, 0);
        return pixels;
    }

    let range = max - min;
    for &value in &layer.samples {
        let level = if is_nodata(value) {
            0
        } else if range > 0.0 {
            ((value - min) / range * 255.0) as u8
        } else {
            CONSTANT_RASTER_LEVEL
        };

        if level == 0 {
            pixels.extend_from_slice(&[0, 0, 0, 0]);
        } else {
            pixels.extend_from_slice(&[level, level, level, 255]);
        }
    }

    pixels
}
