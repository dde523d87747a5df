//! Property tests for the sequencer and the distance metrics.

use proptest::prelude::*;

use trip_sequencer::haversine::haversine_km;
use trip_sequencer::model::{GeoPoint, Stop, StopDetails};
use trip_sequencer::sequencer::{anchor_order, apply_order, nearest_neighbor_order};

fn point() -> impl Strategy<Value = GeoPoint> {
    (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lng)| GeoPoint::new(lat, lng))
}

/// Stops with unique ids, clustered around a city so ties are rare but not
/// impossible.
fn day_stops(max: usize) -> impl Strategy<Value = Vec<Stop>> {
    prop::collection::vec((40.6f64..40.9, -74.1f64..-73.8), 0..max).prop_map(|coords| {
        coords
            .into_iter()
            .enumerate()
            .map(|(i, (lat, lng))| {
                let details = StopDetails::titled(format!("Stop {}", i));
                Stop::new(format!("s{}", i), GeoPoint::new(lat, lng), details)
            })
            .collect()
    })
}

fn is_permutation(order: &[usize], n: usize) -> bool {
    let mut seen = vec![false; n];
    order.len() == n
        && order.iter().all(|&i| i < n && !std::mem::replace(&mut seen[i], true))
}

proptest! {
    /// Both strategies return every input position exactly once.
    #[test]
    fn orders_are_permutations(stops in day_stops(12), anchor in point()) {
        prop_assert!(is_permutation(&nearest_neighbor_order(&stops), stops.len()));
        prop_assert!(is_permutation(&anchor_order(&stops, anchor), stops.len()));
    }

    /// Sorting an already-sorted day by the same anchor changes nothing.
    #[test]
    fn anchor_sort_is_idempotent(stops in day_stops(12), anchor in point()) {
        let order = anchor_order(&stops, anchor);
        let sorted = apply_order(stops, &order);
        let again = anchor_order(&sorted, anchor);
        prop_assert_eq!(again, (0..sorted.len()).collect::<Vec<_>>());
    }

    /// Nearest neighbor always starts where the user started.
    #[test]
    fn nearest_neighbor_keeps_first(stops in day_stops(12)) {
        prop_assume!(!stops.is_empty());
        prop_assert_eq!(nearest_neighbor_order(&stops)[0], 0);
    }

    /// Reordering moves stops but never changes them.
    #[test]
    fn reordering_preserves_stops(stops in day_stops(12)) {
        let reordered = apply_order(stops.clone(), &nearest_neighbor_order(&stops));
        prop_assert_eq!(reordered.len(), stops.len());
        for stop in &reordered {
            prop_assert!(stops.contains(stop));
        }
    }

    #[test]
    fn haversine_is_symmetric(a in point(), b in point()) {
        let ab = haversine_km(a, b);
        prop_assert_eq!(ab, haversine_km(b, a));
        prop_assert!(ab >= 0.0 && ab.is_finite());
    }

    #[test]
    fn haversine_self_distance_is_zero(a in point()) {
        prop_assert_eq!(haversine_km(a, a), 0.0);
    }

    /// Antipodal pairs are half the circumference apart.
    #[test]
    fn haversine_antipodes(lat in -89.0f64..=89.0, lng in -179.0f64..=0.0) {
        let a = GeoPoint::new(lat, lng);
        let b = GeoPoint::new(-lat, lng + 180.0);
        let half = trip_sequencer::haversine::EARTH_RADIUS_KM * std::f64::consts::PI;
        prop_assert!((haversine_km(a, b) - half).abs() < 1e-3);
    }
}
