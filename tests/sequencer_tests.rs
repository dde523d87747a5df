//! Sequencer behaviour tests
//!
//! Concrete orderings, tie-breaking, degenerate inputs and payload handling,
//! plus realistic days built from real New York City locations.

mod fixtures;

use std::collections::HashSet;

use trip_sequencer::haversine::haversine_km;
use trip_sequencer::model::{GeoPoint, Stop, StopDetails, StopId};
use trip_sequencer::sequencer::{
    AnchorMetric, Strategy, anchor_order, apply_order, assignments, nearest_neighbor_order,
    path_length_km, sequence, sequence_checked,
};
use trip_sequencer::traits::Located;

use fixtures::nyc_locations::{self, Location};

// ============================================================================
// Test Fixtures
// ============================================================================

/// A stop with an arbitrary payload, to check payloads pass through untouched.
#[derive(Clone, Debug, PartialEq)]
struct TestStop {
    id: String,
    point: GeoPoint,
    note: Vec<u8>,
}

impl TestStop {
    fn new(id: &str, lat: f64, lng: f64) -> Self {
        Self {
            id: id.to_string(),
            point: GeoPoint::new(lat, lng),
            note: id.bytes().rev().collect(),
        }
    }
}

impl Located for TestStop {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn location(&self) -> GeoPoint {
        self.point
    }
}

fn ids<S: Located<Id = String>>(stops: &[S], order: &[usize]) -> Vec<String> {
    order.iter().map(|&i| stops[i].id().clone()).collect()
}

fn day_of(locations: &[Location]) -> Vec<Stop> {
    locations
        .iter()
        .enumerate()
        .map(|(i, loc)| {
            let mut stop = Stop::new(
                loc.name,
                GeoPoint::new(loc.lat, loc.lng),
                StopDetails::titled(loc.name),
            );
            stop.order_index = i as i32;
            stop
        })
        .collect()
}

fn names(stops: &[Stop]) -> Vec<&str> {
    stops.iter().map(|s| s.id.as_str()).collect()
}

// ============================================================================
// Concrete scenarios
// ============================================================================

#[test]
fn nearest_neighbor_chains_along_a_line() {
    let stops = vec![
        TestStop::new("A", 0.0, 0.0),
        TestStop::new("B", 0.0, 10.0),
        TestStop::new("C", 0.0, 1.0),
        TestStop::new("D", 0.0, 2.0),
    ];

    let order = nearest_neighbor_order(&stops);

    assert_eq!(ids(&stops, &order), vec!["A", "C", "D", "B"]);
}

#[test]
fn anchor_sort_orders_by_distance_from_anchor() {
    let stops = vec![
        TestStop::new("X", 0.0, 5.0),
        TestStop::new("Y", 0.0, 1.0),
        TestStop::new("Z", 0.0, 3.0),
    ];

    let order = anchor_order(&stops, GeoPoint::new(0.0, 0.0));

    assert_eq!(ids(&stops, &order), vec!["Y", "Z", "X"]);
}

#[test]
fn nearest_neighbor_keeps_user_chosen_start() {
    // B and C are the closest pair, but A was placed first and stays first.
    let stops = vec![
        TestStop::new("A", 0.0, 0.0),
        TestStop::new("B", 0.0, 5.0),
        TestStop::new("C", 0.0, 5.1),
    ];

    let order = nearest_neighbor_order(&stops);

    assert_eq!(order[0], 0);
    assert_eq!(ids(&stops, &order), vec!["A", "B", "C"]);
}

#[test]
fn nearest_neighbor_does_not_return_to_start() {
    let stops = vec![
        TestStop::new("A", 0.0, 0.0),
        TestStop::new("B", 0.0, 1.0),
        TestStop::new("C", 0.0, 2.0),
    ];

    let order = nearest_neighbor_order(&stops);

    assert_eq!(order.len(), 3);
    assert_eq!(ids(&stops, &order).last().map(String::as_str), Some("C"));
}

#[test]
fn nearest_neighbor_ties_resolve_left_to_right() {
    // From A, B and D are equally far; B comes first in the remaining list.
    // From B, C is nearest. From C, D is the only one left.
    let stops = vec![
        TestStop::new("A", 0.0, 0.0),
        TestStop::new("B", 1.0, 0.0),
        TestStop::new("C", 1.5, 0.0),
        TestStop::new("D", -1.0, 0.0),
    ];

    let order = nearest_neighbor_order(&stops);

    assert_eq!(ids(&stops, &order), vec!["A", "B", "C", "D"]);
}

#[test]
fn anchor_ties_preserve_input_order() {
    let stops = vec![
        TestStop::new("north", 1.0, 0.0),
        TestStop::new("east", 0.0, 1.0),
        TestStop::new("south", -1.0, 0.0),
        TestStop::new("near", 0.0, 0.5),
    ];

    let order = anchor_order(&stops, GeoPoint::new(0.0, 0.0));

    assert_eq!(ids(&stops, &order), vec!["near", "north", "east", "south"]);
}

#[test]
fn anchor_is_never_part_of_the_sequence() {
    let stops = vec![TestStop::new("A", 0.0, 1.0), TestStop::new("B", 0.0, 2.0)];

    let order = anchor_order(&stops, GeoPoint::new(0.0, 0.0));

    assert_eq!(order.len(), stops.len());
}

// ============================================================================
// Degenerate inputs
// ============================================================================

#[test]
fn empty_and_single_inputs_are_no_ops() {
    let empty: Vec<TestStop> = Vec::new();
    assert!(sequence(&empty, Strategy::NearestNeighbor).is_empty());
    assert!(sequence(&empty, Strategy::anchor(GeoPoint::new(0.0, 0.0))).is_empty());

    let single = vec![TestStop::new("only", 40.0, -73.0)];
    let order = sequence(&single, Strategy::NearestNeighbor);
    assert_eq!(order, vec![0]);
    let reordered = apply_order(single.clone(), &order);
    assert_eq!(reordered, single);

    let order = sequence(&single, Strategy::anchor(GeoPoint::new(0.0, 0.0)));
    assert_eq!(apply_order(single.clone(), &order), single);
}

#[test]
fn two_stops_with_anchor_can_swap() {
    let stops = vec![TestStop::new("far", 0.0, 2.0), TestStop::new("near", 0.0, 1.0)];

    let order = anchor_order(&stops, GeoPoint::new(0.0, 0.0));
    assert_eq!(ids(&stops, &order), vec!["near", "far"]);

    // Nearest neighbor never moves the first stop.
    let order = nearest_neighbor_order(&stops);
    assert_eq!(ids(&stops, &order), vec!["far", "near"]);
}

// ============================================================================
// Payload and output contract
// ============================================================================

#[test]
fn payload_is_untouched_by_reordering() {
    let stops = vec![
        TestStop::new("A", 0.0, 0.0),
        TestStop::new("B", 0.0, 10.0),
        TestStop::new("C", 0.0, 1.0),
    ];
    let before = stops.clone();

    let order = nearest_neighbor_order(&stops);
    let reordered = apply_order(stops, &order);

    for stop in &reordered {
        let original = before.iter().find(|s| s.id == stop.id).unwrap();
        assert_eq!(stop, original);
    }
}

#[test]
fn assignments_cover_every_stop_once() {
    let stops = day_of(nyc_locations::MIDTOWN);
    let order = anchor_order(&stops, nyc_locations::hotel().point);

    let written = assignments(&stops, &order);

    let indexes: Vec<i32> = written.iter().map(|a| a.order_index).collect();
    assert_eq!(indexes, (0..stops.len() as i32).collect::<Vec<_>>());

    let unique: HashSet<&StopId> = written.iter().map(|a| &a.stop_id).collect();
    assert_eq!(unique.len(), stops.len());
}

#[test]
fn checked_sequencing_rejects_invalid_coordinates() {
    let stops = vec![
        TestStop::new("ok", 40.7, -73.9),
        TestStop::new("broken", 40.7, f64::NAN),
    ];

    assert!(sequence_checked(&stops, Strategy::NearestNeighbor).is_err());
    assert!(sequence_checked(&stops, Strategy::anchor(GeoPoint::new(40.7, -73.9))).is_err());
}

#[test]
fn checked_sequencing_matches_unchecked_on_valid_input() {
    let stops = day_of(nyc_locations::UPTOWN);
    let strategy = Strategy::AnchorDistance {
        anchor: nyc_locations::hotel().point,
        metric: AnchorMetric::Haversine,
    };

    assert_eq!(sequence_checked(&stops, strategy).unwrap(), sequence(&stops, strategy));
}

// ============================================================================
// Realistic days
// ============================================================================

#[test]
fn midtown_day_from_the_hotel() {
    let stops = day_of(nyc_locations::MIDTOWN);

    let order = anchor_order(&stops, nyc_locations::hotel().point);
    let reordered = apply_order(stops, &order);

    // Times Square is a block from the hotel; Empire State is the furthest south.
    assert_eq!(reordered.first().map(|s| s.id.as_str()), Some("Times Square"));
    assert_eq!(reordered.last().map(|s| s.id.as_str()), Some("Empire State"));
}

#[test]
fn downtown_walk_shortens_a_scrambled_day() {
    // Scrambled: zig-zag between Lower Manhattan and Brooklyn.
    let scrambled = [
        nyc_locations::DOWNTOWN[0].clone(), // SoHo
        nyc_locations::DOWNTOWN[5].clone(), // DUMBO
        nyc_locations::DOWNTOWN[2].clone(), // One World Trade
        nyc_locations::DOWNTOWN[4].clone(), // Brooklyn Bridge
        nyc_locations::DOWNTOWN[1].clone(), // Chinatown
        nyc_locations::DOWNTOWN[3].clone(), // 9/11 Memorial
    ];
    let stops = day_of(&scrambled);
    let before_km = path_length_km(&stops);

    let order = nearest_neighbor_order(&stops);
    let reordered = apply_order(stops, &order);

    assert_eq!(names(&reordered)[0], "SoHo");
    assert!(
        path_length_km(&reordered) < before_km,
        "expected a shorter walk: {:.2}km vs {:.2}km",
        path_length_km(&reordered),
        before_km
    );

    // One World Trade and the Memorial are ~130m apart; they end up adjacent.
    let wtc = names(&reordered).iter().position(|n| *n == "One World Trade").unwrap();
    let memorial = names(&reordered).iter().position(|n| *n == "9/11 Memorial").unwrap();
    assert_eq!(wtc.abs_diff(memorial), 1);
}

#[test]
fn real_distances_are_plausible() {
    let times_square = GeoPoint::new(40.7580, -73.9855);
    let empire_state = GeoPoint::new(40.7484, -73.9857);

    let km = haversine_km(times_square, empire_state);

    assert!(km > 1.0 && km < 1.2, "Times Square to Empire State ~1.07km, got {}", km);
}
