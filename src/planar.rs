//! Flat-plane distance on raw latitude/longitude deltas.
//!
//! This is what the persisted anchor sort has always used. It is not
//! numerically comparable with [`crate::haversine`].

use crate::model::GeoPoint;
use crate::traits::DistanceMetric;

/// Euclidean distance in degree space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Planar;

impl DistanceMetric for Planar {
    fn distance(&self, from: GeoPoint, to: GeoPoint) -> f64 {
        planar_degrees(from, to)
    }
}

/// `sqrt(dlat^2 + dlng^2)` with both deltas in degrees.
pub fn planar_degrees(from: GeoPoint, to: GeoPoint) -> f64 {
    let d_lat = from.lat - to.lat;
    let d_lng = from.lng - to.lng;
    (d_lat.powi(2) + d_lng.powi(2)).sqrt()
}
