//! Raster overlay rendering for the flood dashboard.
//!
//! Turns a decoded [`geotiff_parser::RasterLayer`] into an RGBA image ready
//! for a web map, encodes it as PNG, and keeps the encoded result in a
//! process-wide cache keyed by source path.
//!
//! Rendering is driven by the raster's band count:
//! - **1 band**: values are rescaled to a grayscale ramp between the band's
//!   observed min and max, with nodata rendered transparent.
//! - **3 bands**: treated as pre-styled RGB, made fully opaque.
//! - **4 bands**: treated as pre-styled RGBA and passed through.
//!
//! Any other band count is rejected with [`RenderError::UnsupportedBandCount`].

pub mod cache;
pub mod overlay;
pub mod png;

pub use cache::{CachedOverlay, OverlayCache, OverlayCacheStats};
pub use overlay::{render_overlay, RenderError, RenderedOverlay};
