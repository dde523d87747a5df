//! Great-circle distance.
//!
//! Used by the nearest-neighbor sequencer and for path lengths.

use crate::model::GeoPoint;
use crate::traits::DistanceMetric;

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine metric, in kilometers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Haversine;

impl DistanceMetric for Haversine {
    fn distance(&self, from: GeoPoint, to: GeoPoint) -> f64 {
        haversine_km(from, to)
    }
}

/// Calculate haversine distance between two points in kilometers.
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 for antipodal points.
    let c = 2.0 * a.min(1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng)
    }

    #[test]
    fn test_haversine_same_point() {
        let point = p(40.7580, -73.9855);
        assert_eq!(haversine_km(point, point), 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Times Square to the Statue of Liberty, ~9 km
        let dist = haversine_km(p(40.7580, -73.9855), p(40.6892, -74.0445));
        assert!(dist > 8.0 && dist < 9.5, "expected ~9km, got {}", dist);
    }

    #[test]
    fn test_one_degree_of_longitude_on_equator() {
        let dist = haversine_km(p(0.0, 0.0), p(0.0, 1.0));
        let expected = EARTH_RADIUS_KM * 1.0_f64.to_radians();
        assert!((dist - expected).abs() < 1e-9);
    }

    #[test]
    fn test_antipodal_points_are_finite() {
        let dist = haversine_km(p(0.0, 0.0), p(0.0, 180.0));
        assert!(dist.is_finite());
        assert!((dist - EARTH_RADIUS_KM * std::f64::consts::PI).abs() < 1e-6);

        let pole_to_pole = haversine_km(p(90.0, 0.0), p(-90.0, 0.0));
        assert!((pole_to_pole - EARTH_RADIUS_KM * std::f64::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn test_symmetric_across_equator() {
        let a = p(-33.8688, 151.2093);
        let b = p(35.6762, 139.6503);
        assert_eq!(haversine_km(a, b), haversine_km(b, a));
    }

    #[test]
    fn test_metric_trait_matches_function() {
        let a = p(40.7484, -73.9857);
        let b = p(40.7527, -73.9772);
        assert_eq!(Haversine.distance(a, b), haversine_km(a, b));
    }
}
