//! Test data generators for creating synthetic raster grids.
//!
//! These generators create predictable, verifiable value patterns that can
//! be used across the test suite.

/// Creates a single-band grid where each cell equals its pixel index.
///
/// `grid[row * width + col] == (row * width + col) as f64`, which makes
/// min/max rescaling arithmetic easy to verify by hand.
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
///
/// # Returns
///
/// A `Vec<f64>` in row-major order.
pub fn create_index_grid(width: usize, height: usize) -> Vec<f64> {
    (0..width * height).map(|i| i as f64).collect()
}

/// Creates a grid filled with a constant value.
///
/// Useful for exercising the constant-raster rendering fallback.
pub fn create_constant_grid(width: usize, height: usize, value: f64) -> Vec<f64> {
    vec![value; width * height]
}

/// Creates an index grid with the sentinel value at specified positions.
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
/// * `nodata` - The sentinel value to place
/// * `positions` - List of (col, row) positions that should be sentinel
pub fn create_grid_with_nodata(
    width: usize,
    height: usize,
    nodata: f64,
    positions: &[(usize, usize)],
) -> Vec<f64> {
    let mut data = create_index_grid(width, height);
    for &(col, row) in positions {
        if col < width && row < height {
            data[row * width + col] = nodata;
        }
    }
    data
}

/// Creates interleaved RGB samples (three bands per pixel).
///
/// Red encodes the column, green the row, blue is constant 128. Values are
/// kept inside [0, 255] so they pass through rendering unchanged.
pub fn create_rgb_samples(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height * 3);
    for row in 0..height {
        for col in 0..width {
            data.push((col % 256) as f64);
            data.push((row % 256) as f64);
            data.push(128.0);
        }
    }
    data
}

/// Creates interleaved RGBA samples (four bands per pixel).
///
/// Same pattern as [`create_rgb_samples`] plus an alpha band that fades
/// from transparent at the top row to opaque at the bottom row.
pub fn create_rgba_samples(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height * 4);
    for row in 0..height {
        let alpha = if height > 1 {
            (row * 255 / (height - 1)) as f64
        } else {
            255.0
        };
        for col in 0..width {
            data.push((col % 256) as f64);
            data.push((row % 256) as f64);
            data.push(128.0);
            data.push(alpha);
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_index_grid() {
        let grid = create_index_grid(4, 3);
        assert_eq!(grid.len(), 12);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[5], 5.0);
        assert_eq!(grid[11], 11.0);
    }

    #[test]
    fn test_create_constant_grid() {
        let grid = create_constant_grid(10, 10, 42.0);
        assert_eq!(grid.len(), 100);
        assert!(grid.iter().all(|&v| v == 42.0));
    }

    #[test]
    fn test_create_grid_with_nodata() {
        let grid = create_grid_with_nodata(4, 3, -9999.0, &[(0, 0), (2, 1)]);
        assert_eq!(grid[0], -9999.0);
        assert_eq!(grid[6], -9999.0); // row 1 * 4 + col 2
        assert_eq!(grid[1], 1.0);
    }

    #[test]
    fn test_create_rgb_samples() {
        let data = create_rgb_samples(2, 2);
        assert_eq!(data.len(), 12);
        // Pixel (1, 0): r=1, g=0, b=128
        assert_eq!(&data[3..6], &[1.0, 0.0, 128.0]);
    }

    #[test]
    fn test_create_rgba_samples_alpha_ramp() {
        let data = create_rgba_samples(2, 3);
        assert_eq!(data.len(), 24);
        assert_eq!(data[3], 0.0); // top row transparent
        assert_eq!(data[23], 255.0); // bottom row opaque
    }
}
