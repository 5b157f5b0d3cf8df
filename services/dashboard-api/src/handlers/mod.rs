//! Request handlers for the dashboard API.

pub mod cache;
pub mod catalog;
pub mod common;
pub mod health;
pub mod legends;
pub mod overlays;
pub mod vectors;
