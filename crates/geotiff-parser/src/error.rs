//! Error types for GeoTIFF parsing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TiffError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TIFF data: {0}")]
    InvalidFormat(String),

    #[error("Unsupported TIFF feature: {0}")]
    Unsupported(String),

    #[error("Raster carries no geographic reference (ModelPixelScale/ModelTiepoint missing)")]
    MissingGeoReference,
}

impl From<TiffError> for flood_common::DashboardError {
    fn from(err: TiffError) -> Self {
        flood_common::DashboardError::RasterError(err.to_string())
    }
}
