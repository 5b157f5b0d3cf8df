//! Process-wide cache of rendered overlays.
//!
//! Rendering a raster means decoding the GeoTIFF, converting samples to
//! RGBA and deflating a PNG. The inputs are pre-computed files that change
//! rarely, so the cache keeps every rendered overlay for the lifetime of
//! the process and never evicts. Entries are keyed by the source path and
//! dropped only through [`OverlayCache::invalidate`] or
//! [`OverlayCache::clear`], which is how a replaced file on disk gets
//! picked up.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use flood_common::{DashboardError, DashboardResult};
use serde::Serialize;
use tracing::info;

use crate::overlay::{render_overlay, RenderedOverlay};

/// A rendered overlay together with its encoded PNG bytes.
///
/// Cloning is cheap: the overlay is shared through an `Arc` and the PNG
/// through `Bytes`.
#[derive(Debug, Clone)]
pub struct CachedOverlay {
    pub overlay: Arc<RenderedOverlay>,
    pub png: Bytes,
}

/// Snapshot of cache counters, for the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct OverlayCacheStats {
    /// Number of overlays currently cached
    pub entries: usize,
    /// Total cache hits
    pub hits: u64,
    /// Total cache misses
    pub misses: u64,
    /// Cache hit rate as a percentage (0-100)
    pub hit_rate: f64,
}

/// Path-keyed cache of rendered overlays.
///
/// Design considerations:
/// - RwLock for concurrent reads (common case: cache hits)
/// - Rendering happens outside the lock, so a slow raster never blocks
///   hits on other layers
/// - No eviction and no TTL; the input set is small and fixed
pub struct OverlayCache {
    entries: RwLock<HashMap<PathBuf, CachedOverlay>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for OverlayCache {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached overlay for `path`, rendering it first on a miss.
    ///
    /// The path is the cache key exactly as given. Repeated calls for the
    /// same path return the same PNG bytes until the entry is invalidated.
    ///
    /// # Arguments
    /// * `path` - GeoTIFF file to render
    ///
    /// # Returns
    /// The cached overlay, or an error when the file is missing, cannot be
    /// decoded, or has an unsupported band count. Failed renders are not
    /// cached.
    pub fn get_or_render(&self, path: &Path) -> DashboardResult<CachedOverlay> {
        if let Some(cached) = self.read_entries().get(path) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(cached.clone());
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        if !path.exists() {
            return Err(DashboardError::MissingFile(path.to_path_buf()));
        }

        let layer = geotiff_parser::read_geotiff(path)?;
        let overlay = render_overlay(&layer)?;
        let png = Bytes::from(overlay.encode_png()?);

        info!(
            path = %path.display(),
            width = overlay.width,
            height = overlay.height,
            png_bytes = png.len(),
            "Rendered and cached overlay"
        );

        let cached = CachedOverlay {
            overlay: Arc::new(overlay),
            png,
        };

        // Concurrent misses may render the same path twice; the first
        // insert wins, so every caller sees a single byte sequence.
        let mut entries = self.write_entries();
        let entry = entries.entry(path.to_path_buf()).or_insert(cached);
        Ok(entry.clone())
    }

    /// Drop the cached overlay for `path`, if present.
    ///
    /// Returns `true` when an entry was removed. The next
    /// [`get_or_render`](Self::get_or_render) for the path re-reads the
    /// file from disk.
    pub fn invalidate(&self, path: &Path) -> bool {
        let removed = self.write_entries().remove(path).is_some();
        if removed {
            info!(path = %path.display(), "Invalidated cached overlay");
        }
        removed
    }

    /// Drop all cached overlays and reset the counters.
    pub fn clear(&self) {
        self.write_entries().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Snapshot the current counters.
    pub fn stats(&self) -> OverlayCacheStats {
        let entries = self.read_entries().len();
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        };
        OverlayCacheStats {
            entries,
            hits,
            misses,
            hit_rate,
        }
    }

    /// Number of cached overlays.
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    // A poisoned lock means a panic while the map was held; the map itself
    // is still consistent, so recover it rather than propagate.
    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<PathBuf, CachedOverlay>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<PathBuf, CachedOverlay>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
