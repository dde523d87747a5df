//! Core traits for the stop sequencer.
//!
//! The sequencer only ever looks at geometry. Anything that can report an
//! identifier and a coordinate can be ordered.

use std::hash::Hash;

use crate::model::GeoPoint;

/// Unique identifier for sequenced entities.
pub trait Id: Clone + Eq + Hash {}

impl<T> Id for T where T: Clone + Eq + Hash {}

/// A point of interest that can be placed in a visiting order.
pub trait Located {
    type Id: Id;

    fn id(&self) -> &Self::Id;

    /// Coordinates in decimal degrees (WGS84).
    fn location(&self) -> GeoPoint;
}

impl<T: Located> Located for &T {
    type Id = T::Id;

    fn id(&self) -> &Self::Id {
        (*self).id()
    }

    fn location(&self) -> GeoPoint {
        (*self).location()
    }
}

/// Distance between two coordinates.
///
/// Units are metric-specific: haversine reports kilometres, the planar
/// metric reports raw degrees.
pub trait DistanceMetric {
    fn distance(&self, from: GeoPoint, to: GeoPoint) -> f64;
}

impl<M: DistanceMetric + ?Sized> DistanceMetric for &M {
    fn distance(&self, from: GeoPoint, to: GeoPoint) -> f64 {
        (**self).distance(from, to)
    }
}
