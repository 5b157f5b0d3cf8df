//! GeoTIFF reader for the dashboard's styled raster products.
//!
//! This crate provides a pure Rust implementation for reading the subset of
//! GeoTIFF the pre-computed analysis products use: striped baseline TIFF,
//! both byte orders, uncompressed or Deflate strips, one to four bands of
//! integer or floating point samples, and the georeferencing tags that
//! anchor a raster to a geographic rectangle (ModelPixelScale,
//! ModelTiepoint, GDAL_NODATA).
//!
//! Tiled layouts and planar band organization are out of scope and rejected
//! with a descriptive error rather than misread.

pub mod error;
pub mod ifd;
pub mod reader;

pub use error::TiffError;
pub use reader::{parse_geotiff, read_geotiff, RasterLayer};
