//! Real New York City locations for realistic test fixtures.
//!
//! Coordinates match the public landmark positions (WGS84).

#![allow(dead_code)]

use trip_sequencer::model::{BaseLocation, Category, NewStop};

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
    pub category: Category,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64, category: Category) -> Self {
        Self {
            name,
            lat,
            lng,
            category,
        }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }

    pub fn new_stop(&self) -> NewStop {
        NewStop::new(self.name, self.lat, self.lng).with_category(self.category)
    }
}

/// Hotel used as the trip's base location.
pub fn hotel() -> BaseLocation {
    BaseLocation {
        desc: Some("Base of operations".to_string()),
        ..BaseLocation::new("Hotel RIU Plaza Times Square", 40.7592, -73.9846)
    }
}

// ============================================================================
// Midtown
// ============================================================================

pub const MIDTOWN: &[Location] = &[
    Location::new("Times Square", 40.7580, -73.9855, Category::Icono),
    Location::new("NY Public Library", 40.7532, -73.9822, Category::Cultura),
    Location::new("Bryant Park", 40.7536, -73.9832, Category::Relax),
    Location::new("Empire State", 40.7484, -73.9857, Category::Vista),
    Location::new("SUMMIT One", 40.7527, -73.9772, Category::Experiencia),
    Location::new("Rockefeller Center", 40.7587, -73.9787, Category::Icono),
];

// ============================================================================
// Central Park and Upper Manhattan
// ============================================================================

pub const UPTOWN: &[Location] = &[
    Location::new("Central Park", 40.7644, -73.9738, Category::Naturaleza),
    Location::new("Apple 5th Ave", 40.7648, -73.9730, Category::Compras),
    Location::new("MET Museum", 40.7789, -73.9637, Category::Museo),
    Location::new("Natural History Museum", 40.7813, -73.9735, Category::Museo),
    Location::new("Upper West Side", 40.7756, -73.9761, Category::Paseo),
];

// ============================================================================
// Downtown and Brooklyn
// ============================================================================

pub const DOWNTOWN: &[Location] = &[
    Location::new("SoHo", 40.7240, -74.0000, Category::Moda),
    Location::new("Chinatown", 40.7158, -73.9970, Category::Restaurante),
    Location::new("One World Trade", 40.7127, -74.0134, Category::Vista),
    Location::new("9/11 Memorial", 40.7115, -74.0134, Category::Memoria),
    Location::new("Brooklyn Bridge", 40.7061, -73.9969, Category::Paseo),
    Location::new("DUMBO", 40.7033, -73.9881, Category::Foto),
];

/// Returns all locations as a single list.
pub fn all_locations() -> Vec<Location> {
    let mut all = Vec::with_capacity(MIDTOWN.len() + UPTOWN.len() + DOWNTOWN.len());
    all.extend_from_slice(MIDTOWN);
    all.extend_from_slice(UPTOWN);
    all.extend_from_slice(DOWNTOWN);
    all
}
