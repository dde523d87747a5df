//! Itinerary service: stop mutations with synchronous re-sequencing.
//!
//! Every add or edit runs as one unit: mutate the in-memory day, compute the
//! new order from that settled list, then persist the order in one batch.
//! Nothing waits on a timer for an earlier write to land. Deletes and visited
//! toggles never re-sequence.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ItineraryError;
use crate::generator::{GeneratedItinerary, ItineraryGenerator, ItineraryRequest};
use crate::model::{
    BaseLocation, Day, DayId, GeoPoint, NewDay, NewStop, Stop, StopId, Trip, TripId,
};
use crate::polyline::Polyline;
use crate::sequencer::{
    AnchorMetric, Strategy, apply_order, assignments, sequence, sequence_checked,
};
use crate::store::ItineraryStore;

/// Ordering used when a day's order is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderPolicy {
    /// Sort by distance from the trip's base location.
    #[default]
    AnchorDistance,
    /// Greedy chaining from the day's first stop.
    NearestNeighbor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceOptions {
    /// Strategy for persisted re-orders.
    pub persisted_policy: ReorderPolicy,
    /// Metric for the anchor sort. Planar keeps historical orders stable.
    pub anchor_metric: AnchorMetric,
    /// Reject NaN/out-of-range coordinates before sequencing.
    pub validate_coordinates: bool,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            persisted_policy: ReorderPolicy::AnchorDistance,
            anchor_metric: AnchorMetric::Planar,
            validate_coordinates: true,
        }
    }
}

/// A loaded trip and its days, backed by a store.
#[derive(Debug)]
pub struct Itinerary<S: ItineraryStore> {
    store: S,
    options: SequenceOptions,
    trip: Option<Trip>,
    days: Vec<Day>,
}

impl<S: ItineraryStore> Itinerary<S> {
    pub fn new(store: S, options: SequenceOptions) -> Self {
        Self {
            store,
            options,
            trip: None,
            days: Vec::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn options(&self) -> &SequenceOptions {
        &self.options
    }

    pub fn trip(&self) -> Option<&Trip> {
        self.trip.as_ref()
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn day(&self, day_id: &DayId) -> Option<&Day> {
        self.days.iter().find(|day| &day.id == day_id)
    }

    /// Load a trip, its days and every day's stops.
    pub fn load(&mut self, trip_id: &TripId) -> Result<(), ItineraryError> {
        let trip = self.store.get_trip(trip_id)?;
        let mut days = self.store.list_days(trip_id)?;
        for day in &mut days {
            day.stops = self.store.list_stops(&day.id)?;
        }
        debug!(trip = %trip_id, days = days.len(), "loaded trip");
        self.trip = Some(trip);
        self.days = days;
        Ok(())
    }

    /// Re-read the loaded trip from the store.
    pub fn refresh(&mut self) -> Result<(), ItineraryError> {
        let trip_id = self.trip_id()?;
        self.load(&trip_id)
    }

    /// Create an empty day in the loaded trip.
    pub fn add_day(&mut self, new_day: &NewDay) -> Result<Day, ItineraryError> {
        let trip_id = self.trip_id()?;
        let created = self.store.create_day(&trip_id, new_day)?;
        self.days.push(created.clone());
        self.days.sort_by_key(|day| day.day_number);
        info!(trip = %trip_id, day = %created.id, "added day");
        Ok(created)
    }

    /// Save a day's number, title and colour. Its stops are not touched.
    pub fn update_day(&mut self, day: &Day) -> Result<Day, ItineraryError> {
        let index = self.day_index(&day.id)?;
        let saved = self.store.update_day(day)?;
        let existing = &mut self.days[index];
        existing.day_number = saved.day_number;
        existing.title = saved.title.clone();
        existing.color = saved.color.clone();
        self.days.sort_by_key(|day| day.day_number);
        Ok(saved)
    }

    /// Delete a day and its stops.
    pub fn remove_day(&mut self, day_id: &DayId) -> Result<(), ItineraryError> {
        let index = self.day_index(day_id)?;
        self.store.delete_day(day_id)?;
        self.days.remove(index);
        info!(day = %day_id, "removed day");
        Ok(())
    }

    /// Create a stop at the end of the day, then re-sequence and persist.
    pub fn add_stop(&mut self, day_id: &DayId, new_stop: NewStop) -> Result<Stop, ItineraryError> {
        if self.options.validate_coordinates {
            new_stop.point.validate("new stop")?;
        }
        let index = self.day_index(day_id)?;
        let created = self.store.create_stop(day_id, &new_stop)?;
        self.days[index].stops.push(created.clone());
        info!(day = %day_id, stop = %created.id, "added stop");

        self.resequence(index)?;
        Ok(created)
    }

    /// Save an edited stop, then re-sequence and persist.
    pub fn update_stop(&mut self, day_id: &DayId, stop: Stop) -> Result<Stop, ItineraryError> {
        if self.options.validate_coordinates {
            stop.point.validate(stop.id.as_str())?;
        }
        let index = self.day_index(day_id)?;
        if self.days[index].stop(&stop.id).is_none() {
            return Err(ItineraryError::UnknownStop(stop.id));
        }

        let saved = self.store.update_stop(&stop)?;
        if let Some(existing) = self.days[index].stop_mut(&saved.id) {
            existing.point = saved.point;
            existing.payload = saved.payload.clone();
        }

        self.resequence(index)?;
        Ok(saved)
    }

    /// Delete a stop. Remaining stops keep their order.
    pub fn remove_stop(&mut self, day_id: &DayId, stop_id: &StopId) -> Result<(), ItineraryError> {
        let index = self.day_index(day_id)?;
        if self.days[index].stop(stop_id).is_none() {
            return Err(ItineraryError::UnknownStop(stop_id.clone()));
        }
        self.store.delete_stop(stop_id)?;
        self.days[index].stops.retain(|stop| &stop.id != stop_id);
        info!(day = %day_id, stop = %stop_id, "removed stop");
        Ok(())
    }

    /// Flip a stop's visited flag. Returns the new value.
    pub fn toggle_visited(&mut self, stop_id: &StopId) -> Result<bool, ItineraryError> {
        let stop = self
            .days
            .iter_mut()
            .flat_map(|day| day.stops.iter_mut())
            .find(|stop| &stop.id == stop_id)
            .ok_or_else(|| ItineraryError::UnknownStop(stop_id.clone()))?;

        let visited = !stop.payload.is_visited;
        let saved = self.store.set_visited(stop_id, visited)?;
        stop.payload.is_visited = saved.payload.is_visited;
        Ok(saved.payload.is_visited)
    }

    /// Re-sequence a day with the persisted policy and write its order.
    pub fn reorder_day(&mut self, day_id: &DayId) -> Result<(), ItineraryError> {
        let index = self.day_index(day_id)?;
        self.resequence(index)
    }

    /// Reorder a day in memory only, by nearest neighbor from its first stop.
    pub fn preview_nearest_neighbor(&mut self, day_id: &DayId) -> Result<&Day, ItineraryError> {
        let index = self.day_index(day_id)?;
        self.days[index].reorder_nearest_neighbor();
        Ok(&self.days[index])
    }

    /// Insert every generated day and stop, then sequence each new day.
    pub fn import_generated(
        &mut self,
        itinerary: &GeneratedItinerary,
    ) -> Result<Vec<DayId>, ItineraryError> {
        let trip_id = self.trip_id()?;
        if self.options.validate_coordinates {
            for stop in itinerary.days.iter().flat_map(|day| &day.stops) {
                GeoPoint::new(stop.lat, stop.lng).validate(&stop.title)?;
            }
        }
        let mut imported = Vec::with_capacity(itinerary.days.len());

        for (position, generated) in itinerary.days.iter().enumerate() {
            let mut day = self.store.create_day(&trip_id, &generated.to_new_day(position))?;
            for stop in &generated.stops {
                day.stops.push(self.store.create_stop(&day.id, &stop.to_new_stop())?);
            }
            imported.push(day.id.clone());
            self.days.push(day);
        }
        self.days.sort_by_key(|day| day.day_number);

        for day_id in &imported {
            let index = self.day_index(day_id)?;
            self.resequence(index)?;
        }

        info!(
            trip = %trip_id,
            days = imported.len(),
            stops = itinerary.stop_count(),
            "imported generated itinerary"
        );
        Ok(imported)
    }

    /// Ask `generator` for an itinerary for the loaded trip and import it.
    pub fn generate<G: ItineraryGenerator>(
        &mut self,
        generator: &G,
        request: &ItineraryRequest,
    ) -> Result<Vec<DayId>, ItineraryError> {
        self.trip_id()?;
        let itinerary = generator.generate(request)?;
        self.import_generated(&itinerary)
    }

    /// Replace the trip's base location. Existing day orders are left as is.
    pub fn set_base_location(&mut self, base: Option<BaseLocation>) -> Result<(), ItineraryError> {
        if let Some(base) = &base {
            base.point.validate("base location")?;
        }
        let mut trip = self.trip.clone().ok_or(ItineraryError::NotLoaded)?;
        trip.base_location = base;
        self.trip = Some(self.store.update_trip(&trip)?);
        Ok(())
    }

    /// Map line for a day: base location, then stops in order.
    pub fn day_route(&self, day_id: &DayId) -> Result<Polyline, ItineraryError> {
        let day = self
            .day(day_id)
            .ok_or_else(|| ItineraryError::UnknownDay(day_id.clone()))?;
        let base = self
            .trip
            .as_ref()
            .and_then(|trip| trip.base_location.as_ref())
            .map(|base| base.point);
        Ok(Polyline::for_day(base, &day.stops))
    }

    fn trip_id(&self) -> Result<TripId, ItineraryError> {
        self.trip
            .as_ref()
            .map(|trip| trip.id.clone())
            .ok_or(ItineraryError::NotLoaded)
    }

    fn day_index(&self, day_id: &DayId) -> Result<usize, ItineraryError> {
        self.days
            .iter()
            .position(|day| &day.id == day_id)
            .ok_or_else(|| ItineraryError::UnknownDay(day_id.clone()))
    }

    fn persisted_strategy(&self) -> Strategy {
        let base = self
            .trip
            .as_ref()
            .and_then(|trip| trip.base_location.as_ref());

        match (self.options.persisted_policy, base) {
            (ReorderPolicy::AnchorDistance, Some(base)) => Strategy::AnchorDistance {
                anchor: base.point,
                metric: self.options.anchor_metric,
            },
            (ReorderPolicy::AnchorDistance, None) => {
                warn!("trip has no base location; ordering by nearest neighbor instead");
                Strategy::NearestNeighbor
            }
            (ReorderPolicy::NearestNeighbor, _) => Strategy::NearestNeighbor,
        }
    }

    /// Order the in-memory day, then persist. The in-memory order stands even
    /// when the write fails.
    fn resequence(&mut self, index: usize) -> Result<(), ItineraryError> {
        let day = &self.days[index];
        if day.stops.len() <= 1 {
            // A delete can leave the lone stop at a nonzero index.
            if day.stops.iter().all(|stop| stop.order_index == 0) {
                return Ok(());
            }
            self.days[index].renumber();
            return self.write_order(index);
        }

        let strategy = self.persisted_strategy();
        let order = if self.options.validate_coordinates {
            sequence_checked(&self.days[index].stops, strategy)?
        } else {
            sequence(&self.days[index].stops, strategy)
        };

        let day = &mut self.days[index];
        let stops = std::mem::take(&mut day.stops);
        day.stops = apply_order(stops, &order);
        day.renumber();

        self.write_order(index)
    }

    /// Write the in-memory list positions of a day as its `order_index`.
    fn write_order(&mut self, index: usize) -> Result<(), ItineraryError> {
        let day = &self.days[index];
        let positions: Vec<usize> = (0..day.stops.len()).collect();
        let written = assignments(&day.stops, &positions);

        if let Err(err) = self.store.set_order(&day.id, &written) {
            warn!(
                day = %day.id,
                retryable = err.is_retryable(),
                error = %err,
                "failed to persist stop order"
            );
            return Err(ItineraryError::Store(err));
        }
        info!(day = %day.id, stops = written.len(), "persisted stop order");
        Ok(())
    }

    /// Re-send the current in-memory order of a day, e.g. after a failed write.
    pub fn persist_order(&mut self, day_id: &DayId) -> Result<(), ItineraryError> {
        let index = self.day_index(day_id)?;
        self.write_order(index)
    }
}
