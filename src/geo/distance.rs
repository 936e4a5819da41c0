//! Geodesic distance on the WGS-84 ellipsoid (Vincenty's inverse formula).

use super::gazetteer::Coordinate;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const WGS84_B: f64 = (1.0 - WGS84_F) * WGS84_A;
const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;
const METERS_PER_MILE: f64 = 1_609.344;

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE: f64 = 1e-12;

/// Distance in statute miles between two coordinates.
pub fn distance_miles(a: Coordinate, b: Coordinate) -> f64 {
    geodesic_meters(a, b) / METERS_PER_MILE
}

/// Ellipsoidal distance in meters.
///
/// Vincenty does not converge for some nearly antipodal pairs; those fall
/// back to the spherical great-circle distance.
pub fn geodesic_meters(a: Coordinate, b: Coordinate) -> f64 {
    vincenty_inverse(a, b).unwrap_or_else(|| {
        log::debug!("vincenty did not converge for {a:?} -> {b:?}, using great circle");
        great_circle_meters(a, b)
    })
}

fn vincenty_inverse(p1: Coordinate, p2: Coordinate) -> Option<f64> {
    let f = WGS84_F;
    let l = (p2.longitude - p1.longitude).to_radians();
    let u1 = ((1.0 - f) * p1.latitude.to_radians().tan()).atan();
    let u2 = ((1.0 - f) * p2.latitude.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..MAX_ITERATIONS {
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
        // Equatorial lines have cos²α = 0.
        let cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };
        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if (lambda - previous).abs() < CONVERGENCE {
            let u_sq = cos_sq_alpha * (WGS84_A.powi(2) - WGS84_B.powi(2)) / WGS84_B.powi(2);
            let big_a =
                1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = big_b
                * sin_sigma
                * (cos_2sigma_m
                    + big_b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - big_b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
            return Some(WGS84_B * big_a * (sigma - delta_sigma));
        }
    }
    None
}

fn great_circle_meters(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * MEAN_EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn flinders_peak_to_buninyong() {
        // Reference geodesic from Vincenty's 1975 paper: 54 972.271 m.
        let flinders = Coordinate::new(-37.951_033_416_666_67, 144.424_867_888_888_9);
        let buninyong = Coordinate::new(-37.652_821_138_888_89, 143.926_495_527_777_8);
        let meters = geodesic_meters(flinders, buninyong);
        assert!((meters - 54_972.271).abs() < 0.5, "got {meters}");
    }

    #[test]
    fn one_degree_along_the_equator() {
        let meters = geodesic_meters(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        assert!((meters - 111_319.491).abs() < 0.01, "got {meters}");
    }

    #[test]
    fn nearly_antipodal_points_still_measure() {
        let miles = distance_miles(Coordinate::new(0.0, 0.0), Coordinate::new(0.5, 179.7));
        assert!(miles.is_finite());
        assert!(miles > 12_000.0 && miles < 12_500.0, "got {miles}");
    }

    #[test]
    fn new_york_to_naperville_is_about_seven_hundred_miles() {
        let miles = distance_miles(
            Coordinate::new(40.750633, -73.997177),
            Coordinate::new(41.703866, -88.195733),
        );
        assert!(miles > 680.0 && miles < 800.0, "got {miles}");
    }

    /// Points across the contiguous United States.
    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (24.0f64..50.0, -125.0f64..-66.0).prop_map(|(lat, lon)| Coordinate::new(lat, lon))
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(a in coordinate(), b in coordinate()) {
            let ab = distance_miles(a, b);
            let ba = distance_miles(b, a);
            prop_assert!((ab - ba).abs() < 1e-6, "{ab} vs {ba}");
        }

        #[test]
        fn distance_to_self_is_zero(a in coordinate()) {
            prop_assert!(distance_miles(a, a).abs() < 1e-9);
        }
    }
}
