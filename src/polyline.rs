//! Route line for a day, as drawn on the map.
//!
//! The line starts at the trip's base location (when there is one) and then
//! follows the stops in their current order. Encoding for a map widget
//! happens at the boundary, not here.

use serde::{Deserialize, Serialize};

use crate::haversine::haversine_km;
use crate::model::GeoPoint;
use crate::traits::Located;

/// A polyline as decoded (lat, lng) points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    ///
    /// Each point is a (latitude, longitude) tuple.
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    /// Base location first, then each stop in list order.
    pub fn for_day<S: Located>(base: Option<GeoPoint>, stops: &[S]) -> Self {
        let points = base
            .into_iter()
            .chain(stops.iter().map(Located::location))
            .map(|point| point.as_tuple())
            .collect();
        Self { points }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }

    /// Great-circle length along the line, in kilometers.
    pub fn length_km(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| haversine_km(pair[0].into(), pair[1].into()))
            .sum()
    }

    /// South-west and north-east corners, for fitting a map view.
    pub fn bounds(&self) -> Option<(GeoPoint, GeoPoint)> {
        let (&first, rest) = self.points.split_first()?;
        let (mut south, mut west) = first;
        let (mut north, mut east) = first;
        for &(lat, lng) in rest {
            south = south.min(lat);
            north = north.max(lat);
            west = west.min(lng);
            east = east.max(lng);
        }
        Some((GeoPoint::new(south, west), GeoPoint::new(north, east)))
    }
}
