//! Dashboard API service library.
//!
//! HTTP server for the flood-monitor dashboard: flood incidents with
//! nearest-station context, per-station rainfall series, rendered raster
//! overlays, watershed vector layers and the static legend tables.

pub mod handlers;
pub mod server;
pub mod state;
