//! Stop sequencing.
//!
//! Two strategies order a day's stops:
//!
//! - greedy nearest-neighbor chaining from the first stop (haversine km)
//! - ascending distance from an anchor point (planar degrees by default)
//!
//! Both return a permutation of input positions. Neither touches the stops
//! themselves; callers apply the permutation with [`apply_order`] or turn it
//! into `order_index` writes with [`assignments`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SequenceError;
use crate::haversine::{Haversine, haversine_km};
use crate::model::GeoPoint;
use crate::planar::Planar;
use crate::traits::{DistanceMetric, Located};

/// Which metric the anchor sort measures with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMetric {
    #[default]
    Planar,
    Haversine,
}

impl DistanceMetric for AnchorMetric {
    fn distance(&self, from: GeoPoint, to: GeoPoint) -> f64 {
        match self {
            AnchorMetric::Planar => Planar.distance(from, to),
            AnchorMetric::Haversine => Haversine.distance(from, to),
        }
    }
}

/// How to sequence one list of stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    /// Greedy chaining from the first stop, haversine distance.
    NearestNeighbor,
    /// Sort by distance from a fixed anchor.
    AnchorDistance { anchor: GeoPoint, metric: AnchorMetric },
}

impl Strategy {
    /// Anchor sort with the planar metric.
    pub fn anchor(anchor: GeoPoint) -> Self {
        Strategy::AnchorDistance {
            anchor,
            metric: AnchorMetric::Planar,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Strategy::NearestNeighbor => "nearest_neighbor",
            Strategy::AnchorDistance { .. } => "anchor_distance",
        }
    }
}

/// New position for one stop, ready for a batch `order_index` write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAssignment<Id> {
    pub stop_id: Id,
    pub order_index: i32,
}

/// Greedy nearest-neighbor order using haversine distance.
pub fn nearest_neighbor_order<S: Located>(stops: &[S]) -> Vec<usize> {
    nearest_neighbor_order_by(stops, Haversine)
}

/// Greedy nearest-neighbor order under `metric`.
///
/// Starts at `stops[0]` whatever its position relative to the rest. At each
/// step the strictly closest remaining stop wins; equal distances keep the
/// earliest candidate in scan order.
pub fn nearest_neighbor_order_by<S, M>(stops: &[S], metric: M) -> Vec<usize>
where
    S: Located,
    M: DistanceMetric,
{
    if stops.len() <= 1 {
        return (0..stops.len()).collect();
    }

    let mut remaining: Vec<usize> = (1..stops.len()).collect();
    let mut order = Vec::with_capacity(stops.len());
    let mut current = 0;
    order.push(current);

    while !remaining.is_empty() {
        let from = stops[current].location();
        let mut nearest = 0;
        let mut min_distance = f64::INFINITY;

        for (slot, &candidate) in remaining.iter().enumerate() {
            let distance = metric.distance(from, stops[candidate].location());
            if distance < min_distance {
                min_distance = distance;
                nearest = slot;
            }
        }

        current = remaining.remove(nearest);
        order.push(current);
    }

    order
}

/// Anchor-distance order using the planar metric.
pub fn anchor_order<S: Located>(stops: &[S], anchor: GeoPoint) -> Vec<usize> {
    anchor_order_by(stops, anchor, Planar)
}

/// Ascending distance from `anchor` under `metric`, stable on ties.
pub fn anchor_order_by<S, M>(stops: &[S], anchor: GeoPoint, metric: M) -> Vec<usize>
where
    S: Located,
    M: DistanceMetric,
{
    let mut keyed: Vec<(usize, f64)> = stops
        .iter()
        .enumerate()
        .map(|(index, stop)| (index, metric.distance(stop.location(), anchor)))
        .collect();

    // `sort_by` is stable, so equal keys keep their input order.
    keyed.sort_by(|a, b| a.1.total_cmp(&b.1));
    keyed.into_iter().map(|(index, _)| index).collect()
}

/// Run `strategy` without validating coordinates.
pub fn sequence<S: Located>(stops: &[S], strategy: Strategy) -> Vec<usize> {
    let order = match strategy {
        Strategy::NearestNeighbor => nearest_neighbor_order(stops),
        Strategy::AnchorDistance { anchor, metric } => anchor_order_by(stops, anchor, metric),
    };

    debug!(
        strategy = strategy.name(),
        stops = stops.len(),
        before_km = path_length_km(stops),
        after_km = ordered_length_km(stops, &order),
        "sequenced stops"
    );

    order
}

/// Validate every coordinate (and the anchor), then run `strategy`.
pub fn sequence_checked<S>(stops: &[S], strategy: Strategy) -> Result<Vec<usize>, SequenceError>
where
    S: Located,
    S::Id: std::fmt::Display,
{
    for stop in stops {
        stop.location().validate(&stop.id().to_string())?;
    }
    if let Strategy::AnchorDistance { anchor, .. } = strategy {
        anchor.validate("anchor")?;
    }
    Ok(sequence(stops, strategy))
}

/// Permute `items` by `order` (a permutation of `0..items.len()`).
pub fn apply_order<T>(items: Vec<T>, order: &[usize]) -> Vec<T> {
    debug_assert_eq!(items.len(), order.len());
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order
        .iter()
        .filter_map(|&index| slots.get_mut(index).and_then(Option::take))
        .collect()
}

/// Turn a permutation into `order_index` writes, 0..n-1.
pub fn assignments<S: Located>(stops: &[S], order: &[usize]) -> Vec<OrderAssignment<S::Id>> {
    order
        .iter()
        .enumerate()
        .map(|(position, &index)| OrderAssignment {
            stop_id: stops[index].id().clone(),
            order_index: position as i32,
        })
        .collect()
}

/// Total haversine length walking the stops in list order.
pub fn path_length_km<S: Located>(stops: &[S]) -> f64 {
    stops
        .windows(2)
        .map(|pair| haversine_km(pair[0].location(), pair[1].location()))
        .sum()
}

fn ordered_length_km<S: Located>(stops: &[S], order: &[usize]) -> f64 {
    order
        .windows(2)
        .map(|pair| haversine_km(stops[pair[0]].location(), stops[pair[1]].location()))
        .sum()
}
