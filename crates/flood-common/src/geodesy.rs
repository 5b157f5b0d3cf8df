//! Geodesic distance on the WGS84 ellipsoid.
//!
//! Station matching uses the ellipsoidal (Vincenty inverse) distance, which
//! agrees with the survey tooling that produced the input tables. The
//! spherical haversine form is kept as a fallback for the rare pairs where
//! Vincenty's iteration fails to converge (near-antipodal points).

use crate::geo::GeoPoint;

/// WGS84 semi-major axis in meters.
pub const WGS84_SEMI_MAJOR_M: f64 = 6_378_137.0;

/// WGS84 inverse flattening.
pub const WGS84_INV_FLATTENING: f64 = 298.257_223_563;

/// Mean Earth radius in meters (IUGG), used by the haversine fallback.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

const VINCENTY_MAX_ITERATIONS: usize = 100;
const VINCENTY_CONVERGENCE: f64 = 1e-12;

/// Distance between two points in meters.
///
/// Vincenty when it converges, haversine otherwise. This is the distance
/// every caller in the workspace should use; the two underlying formulas
/// are public mainly for tests and calibration.
pub fn geodesic_distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    vincenty_distance_m(a, b).unwrap_or_else(|| haversine_distance_m(a, b))
}

/// Vincenty inverse solution on the WGS84 ellipsoid.
///
/// Returns `None` if the lambda iteration does not converge within the
/// iteration budget, which only happens for near-antipodal point pairs.
pub fn vincenty_distance_m(a: GeoPoint, b: GeoPoint) -> Option<f64> {
    let f = 1.0 / WGS84_INV_FLATTENING;
    let semi_minor = WGS84_SEMI_MAJOR_M * (1.0 - f);

    let l = (b.lon - a.lon).to_radians();
    let u1 = ((1.0 - f) * a.lat.to_radians().tan()).atan();
    let u2 = ((1.0 - f) * b.lat.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..VINCENTY_MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // Coincident points.
            return Some(0.0);
        }

        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // cos_sq_alpha is zero for points along the equator.
        let cos_2sigma_m = if cos_sq_alpha.abs() < 1e-12 {
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        };

        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let lambda_prev = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m
                            + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        if (lambda - lambda_prev).abs() < VINCENTY_CONVERGENCE {
            let u_sq = cos_sq_alpha * (WGS84_SEMI_MAJOR_M.powi(2) - semi_minor.powi(2))
                / semi_minor.powi(2);
            let a_term = 1.0
                + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let b_term = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = b_term
                * sin_sigma
                * (cos_2sigma_m
                    + b_term / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                            - b_term / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                                * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));
            return Some(semi_minor * a_term * (sigma - delta_sigma));
        }
    }

    None
}

/// Haversine great-circle distance between two points in meters.
pub fn haversine_distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_M * c
}
