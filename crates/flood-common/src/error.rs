//! Error types for flood-monitor services.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using DashboardError.
pub type DashboardResult<T> = Result<T, DashboardError>;

/// Primary error type for dashboard operations.
#[derive(Debug, Error)]
pub enum DashboardError {
    // === Input table errors ===
    #[error("Input file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Invalid record at line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },

    // === Station matching errors ===
    #[error("No candidate stations to match against")]
    NoCandidates,

    // === Raster errors ===
    #[error("Unsupported raster band count: {0}")]
    UnsupportedBandCount(usize),

    #[error("Invalid raster data: {0}")]
    RasterError(String),

    #[error("Rendering failed: {0}")]
    RenderError(String),

    // === Request errors ===
    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Infrastructure errors ===
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl DashboardError {
    /// Get the stable error code used in JSON error bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            DashboardError::MissingFile(_) => "MissingFile",
            DashboardError::InvalidRecord { .. } => "InvalidRecord",
            DashboardError::NoCandidates => "NoCandidates",
            DashboardError::UnsupportedBandCount(_) => "UnsupportedBandCount",
            DashboardError::RasterError(_) => "RasterError",
            DashboardError::RenderError(_) => "RenderError",
            DashboardError::LayerNotFound(_) => "LayerNotFound",
            DashboardError::InvalidParameter { .. } => "InvalidParameter",
            DashboardError::InternalError(_) => "InternalError",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            DashboardError::InvalidParameter { .. } => 400,

            DashboardError::MissingFile(_) | DashboardError::LayerNotFound(_) => 404,

            DashboardError::InvalidRecord { .. }
            | DashboardError::NoCandidates
            | DashboardError::UnsupportedBandCount(_) => 422,

            _ => 500,
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for DashboardError {
    fn from(err: std::io::Error) -> Self {
        DashboardError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::InternalError(format!("JSON error: {}", err))
    }
}
