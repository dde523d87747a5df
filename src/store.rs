//! Persistence boundary for trips, days and stops.
//!
//! The backing service is opaque. [`ItineraryStore`] is the seam the rest of
//! the crate talks to; [`InMemoryStore`] is a complete implementation for
//! tests and offline use, and [`crate::rest::RestStore`] talks HTTP.

use std::collections::HashMap;

use crate::error::StoreError;
use crate::model::{Day, DayId, NewDay, NewStop, NewTrip, Stop, StopId, Trip, TripId};
use crate::sequencer::OrderAssignment;

/// CRUD over the itinerary entities plus a batch order write.
pub trait ItineraryStore {
    /// All trips, newest first.
    fn list_trips(&self) -> Result<Vec<Trip>, StoreError>;

    fn get_trip(&self, trip_id: &TripId) -> Result<Trip, StoreError>;

    fn create_trip(&mut self, trip: &NewTrip) -> Result<Trip, StoreError>;

    fn update_trip(&mut self, trip: &Trip) -> Result<Trip, StoreError>;

    /// Deleting a trip deletes its days and their stops.
    fn delete_trip(&mut self, trip_id: &TripId) -> Result<(), StoreError>;

    /// Days of a trip ordered by `day_number`. Stops are not populated.
    fn list_days(&self, trip_id: &TripId) -> Result<Vec<Day>, StoreError>;

    /// A single day. Stops are not populated.
    fn get_day(&self, day_id: &DayId) -> Result<Day, StoreError>;

    fn create_day(&mut self, trip_id: &TripId, day: &NewDay) -> Result<Day, StoreError>;

    /// Overwrite number, title and colour. Stops are left alone.
    fn update_day(&mut self, day: &Day) -> Result<Day, StoreError>;

    /// Deleting a day deletes its stops.
    fn delete_day(&mut self, day_id: &DayId) -> Result<(), StoreError>;

    /// Stops of a day ordered by `order_index`.
    fn list_stops(&self, day_id: &DayId) -> Result<Vec<Stop>, StoreError>;

    fn get_stop(&self, stop_id: &StopId) -> Result<Stop, StoreError>;

    /// New stops go to the end: `order_index` is the day's current count.
    fn create_stop(&mut self, day_id: &DayId, stop: &NewStop) -> Result<Stop, StoreError>;

    /// Overwrite coordinates and details. `order_index` is left alone.
    fn update_stop(&mut self, stop: &Stop) -> Result<Stop, StoreError>;

    fn delete_stop(&mut self, stop_id: &StopId) -> Result<(), StoreError>;

    fn set_visited(&mut self, stop_id: &StopId, visited: bool) -> Result<Stop, StoreError>;

    /// Write a new `order_index` for each listed stop of `day_id`.
    fn set_order(
        &mut self,
        day_id: &DayId,
        order: &[OrderAssignment<StopId>],
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
struct StoredStop {
    day_id: DayId,
    stop: Stop,
}

#[derive(Debug, Clone)]
struct StoredTrip {
    seq: u64,
    trip: Trip,
}

#[derive(Debug, Clone)]
struct StoredDay {
    trip_id: TripId,
    day: Day,
}

/// In-process store with generated ids.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    trips: HashMap<TripId, StoredTrip>,
    days: HashMap<DayId, StoredDay>,
    stops: HashMap<StopId, StoredStop>,
    next_id: u64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a trip.
    pub fn insert_trip(&mut self, trip: Trip) {
        self.next_id += 1;
        let stored = StoredTrip {
            seq: self.next_id,
            trip,
        };
        self.trips.insert(stored.trip.id.clone(), stored);
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn stored_day(&self, day_id: &DayId) -> Result<&StoredDay, StoreError> {
        self.days
            .get(day_id)
            .ok_or_else(|| StoreError::not_found("day", day_id))
    }

    fn stop_count(&self, day_id: &DayId) -> usize {
        self.stops
            .values()
            .filter(|stored| &stored.day_id == day_id)
            .count()
    }
}

impl ItineraryStore for InMemoryStore {
    fn list_trips(&self) -> Result<Vec<Trip>, StoreError> {
        let mut stored: Vec<&StoredTrip> = self.trips.values().collect();
        stored.sort_by(|a, b| b.seq.cmp(&a.seq));
        Ok(stored.into_iter().map(|s| s.trip.clone()).collect())
    }

    fn get_trip(&self, trip_id: &TripId) -> Result<Trip, StoreError> {
        self.trips
            .get(trip_id)
            .map(|stored| stored.trip.clone())
            .ok_or_else(|| StoreError::not_found("trip", trip_id))
    }

    fn create_trip(&mut self, trip: &NewTrip) -> Result<Trip, StoreError> {
        let created = Trip {
            id: TripId::new(self.next_id("trip")),
            name: trip.name.clone(),
            city: trip.city.clone(),
            country: trip.country.clone(),
            base_location: trip.base_location.clone(),
        };
        self.insert_trip(created.clone());
        Ok(created)
    }

    fn update_trip(&mut self, trip: &Trip) -> Result<Trip, StoreError> {
        let stored = self
            .trips
            .get_mut(&trip.id)
            .ok_or_else(|| StoreError::not_found("trip", &trip.id))?;
        stored.trip = trip.clone();
        Ok(stored.trip.clone())
    }

    fn delete_trip(&mut self, trip_id: &TripId) -> Result<(), StoreError> {
        self.trips
            .remove(trip_id)
            .ok_or_else(|| StoreError::not_found("trip", trip_id))?;
        let days: Vec<DayId> = self
            .days
            .iter()
            .filter(|(_, stored)| &stored.trip_id == trip_id)
            .map(|(id, _)| id.clone())
            .collect();
        for day_id in &days {
            self.delete_day(day_id)?;
        }
        Ok(())
    }

    fn list_days(&self, trip_id: &TripId) -> Result<Vec<Day>, StoreError> {
        let mut days: Vec<Day> = self
            .days
            .values()
            .filter(|stored| &stored.trip_id == trip_id)
            .map(|stored| stored.day.clone())
            .collect();
        days.sort_by(|a, b| a.day_number.cmp(&b.day_number).then_with(|| a.id.cmp(&b.id)));
        Ok(days)
    }

    fn get_day(&self, day_id: &DayId) -> Result<Day, StoreError> {
        self.stored_day(day_id).map(|stored| stored.day.clone())
    }

    fn create_day(&mut self, trip_id: &TripId, day: &NewDay) -> Result<Day, StoreError> {
        if !self.trips.contains_key(trip_id) {
            return Err(StoreError::not_found("trip", trip_id));
        }
        let id = DayId::new(self.next_id("day"));
        let created = Day {
            id: id.clone(),
            day_number: day.day_number,
            title: day.title.clone(),
            color: day.color_or_default(),
            stops: Vec::new(),
        };
        self.days.insert(
            id,
            StoredDay {
                trip_id: trip_id.clone(),
                day: created.clone(),
            },
        );
        Ok(created)
    }

    fn update_day(&mut self, day: &Day) -> Result<Day, StoreError> {
        let stored = self
            .days
            .get_mut(&day.id)
            .ok_or_else(|| StoreError::not_found("day", &day.id))?;
        stored.day.day_number = day.day_number;
        stored.day.title = day.title.clone();
        stored.day.color = day.color.clone();
        Ok(stored.day.clone())
    }

    fn delete_day(&mut self, day_id: &DayId) -> Result<(), StoreError> {
        self.days
            .remove(day_id)
            .ok_or_else(|| StoreError::not_found("day", day_id))?;
        self.stops.retain(|_, stored| &stored.day_id != day_id);
        Ok(())
    }

    fn list_stops(&self, day_id: &DayId) -> Result<Vec<Stop>, StoreError> {
        let mut stops: Vec<Stop> = self
            .stops
            .values()
            .filter(|stored| &stored.day_id == day_id)
            .map(|stored| stored.stop.clone())
            .collect();
        stops.sort_by(|a, b| a.order_index.cmp(&b.order_index).then_with(|| a.id.cmp(&b.id)));
        Ok(stops)
    }

    fn get_stop(&self, stop_id: &StopId) -> Result<Stop, StoreError> {
        self.stops
            .get(stop_id)
            .map(|stored| stored.stop.clone())
            .ok_or_else(|| StoreError::not_found("stop", stop_id))
    }

    fn create_stop(&mut self, day_id: &DayId, stop: &NewStop) -> Result<Stop, StoreError> {
        if !self.days.contains_key(day_id) {
            return Err(StoreError::not_found("day", day_id));
        }
        let mut created = Stop::new(
            StopId::new(self.next_id("stop")),
            stop.point,
            stop.details.clone(),
        );
        created.order_index = self.stop_count(day_id) as i32;
        created.payload.is_visited = false;

        self.stops.insert(
            created.id.clone(),
            StoredStop {
                day_id: day_id.clone(),
                stop: created.clone(),
            },
        );
        Ok(created)
    }

    fn update_stop(&mut self, stop: &Stop) -> Result<Stop, StoreError> {
        let stored = self
            .stops
            .get_mut(&stop.id)
            .ok_or_else(|| StoreError::not_found("stop", &stop.id))?;
        stored.stop.point = stop.point;
        stored.stop.payload = stop.payload.clone();
        Ok(stored.stop.clone())
    }

    fn delete_stop(&mut self, stop_id: &StopId) -> Result<(), StoreError> {
        self.stops
            .remove(stop_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("stop", stop_id))
    }

    fn set_visited(&mut self, stop_id: &StopId, visited: bool) -> Result<Stop, StoreError> {
        let stored = self
            .stops
            .get_mut(stop_id)
            .ok_or_else(|| StoreError::not_found("stop", stop_id))?;
        stored.stop.payload.is_visited = visited;
        Ok(stored.stop.clone())
    }

    fn set_order(
        &mut self,
        day_id: &DayId,
        order: &[OrderAssignment<StopId>],
    ) -> Result<(), StoreError> {
        // Check everything first so a bad id leaves the day untouched.
        for assignment in order {
            match self.stops.get(&assignment.stop_id) {
                Some(stored) if &stored.day_id == day_id => {}
                _ => return Err(StoreError::not_found("stop", &assignment.stop_id)),
            }
        }
        for assignment in order {
            if let Some(stored) = self.stops.get_mut(&assignment.stop_id) {
                stored.stop.order_index = assignment.order_index;
            }
        }
        Ok(())
    }
}
