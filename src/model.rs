//! Trip, day and stop data model.
//!
//! A [`Stop`] is a fixed geometric core (`id`, `point`, `order_index`) with an
//! arbitrary payload. Sequencing only ever moves stops around; it has no way
//! to reach into the payload.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SequenceError;
use crate::sequencer::{apply_order, nearest_neighbor_order};
use crate::traits::Located;

/// Colour given to days that do not specify one.
pub const DEFAULT_DAY_COLOR: &str = "#3b82f6";

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Opaque trip identifier.
    TripId
);
string_id!(
    /// Opaque day identifier.
    DayId
);
string_id!(
    /// Opaque stop identifier.
    StopId
);

/// Latitude/longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Reject NaN, infinite and out-of-range coordinates.
    pub fn validate(&self, stop_id: &str) -> Result<(), SequenceError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(SequenceError::InvalidCoordinate {
                stop_id: stop_id.to_string(),
                lat: self.lat,
                lng: self.lng,
            })
        }
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// A point of interest within a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop<P = StopDetails> {
    pub id: StopId,
    #[serde(flatten)]
    pub point: GeoPoint,
    pub order_index: i32,
    #[serde(flatten)]
    pub payload: P,
}

impl<P> Stop<P> {
    pub fn new(id: impl Into<StopId>, point: GeoPoint, payload: P) -> Self {
        Self {
            id: id.into(),
            point,
            order_index: 0,
            payload,
        }
    }
}

impl<P> Located for Stop<P> {
    type Id = StopId;

    fn id(&self) -> &StopId {
        &self.id
    }

    fn location(&self) -> GeoPoint {
        self.point
    }
}

/// Descriptive attributes of a stop. Opaque to sequencing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StopDetails {
    pub title: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub tip: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub is_visited: bool,
}

impl StopDetails {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Input for creating a stop.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStop {
    pub point: GeoPoint,
    pub details: StopDetails,
}

impl NewStop {
    pub fn new(title: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            point: GeoPoint::new(lat, lng),
            details: StopDetails::titled(title),
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.details.category = category;
        self
    }

    pub fn with_tip(mut self, tip: impl Into<String>) -> Self {
        self.details.tip = Some(tip.into());
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.details.time = Some(time.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.details.address = Some(address.into());
        self
    }
}

/// An ordered collection of stops within a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub id: DayId,
    pub day_number: i32,
    pub title: String,
    pub color: String,
    #[serde(default)]
    pub stops: Vec<Stop>,
}

impl Day {
    /// Order stops by greedy nearest-neighbor from the current first stop.
    ///
    /// This is the client-side reorder: it only touches the in-memory list and
    /// never feeds the persisted order.
    pub fn reorder_nearest_neighbor(&mut self) {
        if self.stops.len() <= 1 {
            return;
        }
        let order = nearest_neighbor_order(&self.stops);
        let stops = std::mem::take(&mut self.stops);
        self.stops = apply_order(stops, &order);
        self.renumber();
    }

    /// Rewrite `order_index` to match list position.
    pub fn renumber(&mut self) {
        for (index, stop) in self.stops.iter_mut().enumerate() {
            stop.order_index = index as i32;
        }
    }

    pub fn stop(&self, stop_id: &StopId) -> Option<&Stop> {
        self.stops.iter().find(|stop| &stop.id == stop_id)
    }

    pub fn stop_mut(&mut self, stop_id: &StopId) -> Option<&mut Stop> {
        self.stops.iter_mut().find(|stop| &stop.id == stop_id)
    }
}

/// Input for creating a day.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDay {
    pub day_number: i32,
    pub title: String,
    pub color: Option<String>,
}

impl NewDay {
    pub fn new(day_number: i32, title: impl Into<String>) -> Self {
        Self {
            day_number,
            title: title.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn color_or_default(&self) -> String {
        self.color
            .clone()
            .unwrap_or_else(|| DEFAULT_DAY_COLOR.to_string())
    }
}

/// The trip's lodging or starting point. Never part of a day's sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseLocation {
    #[serde(flatten)]
    pub point: GeoPoint,
    pub title: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
}

impl BaseLocation {
    pub fn new(title: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            point: GeoPoint::new(lat, lng),
            title: title.into(),
            desc: None,
            img: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub base_location: Option<BaseLocation>,
}

/// Input for creating a trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTrip {
    pub name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub base_location: Option<BaseLocation>,
}

impl NewTrip {
    pub fn new(
        name: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            city: Some(city.into()),
            country: Some(country.into()),
            base_location: None,
        }
    }

    pub fn with_base_location(mut self, base: BaseLocation) -> Self {
        self.base_location = Some(base);
        self
    }
}

/// Stop categories with their display metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Icono,
    Cultura,
    Relax,
    Vista,
    Experiencia,
    Naturaleza,
    Arte,
    Museo,
    Paseo,
    Moda,
    Memoria,
    Foto,
    Deporte,
    Restaurante,
    Compras,
    Monumento,
    Historia,
    Entretenimiento,
    #[default]
    Interes,
}

impl Category {
    pub const ALL: [Category; 19] = [
        Category::Icono,
        Category::Cultura,
        Category::Relax,
        Category::Vista,
        Category::Experiencia,
        Category::Naturaleza,
        Category::Arte,
        Category::Museo,
        Category::Paseo,
        Category::Moda,
        Category::Memoria,
        Category::Foto,
        Category::Deporte,
        Category::Restaurante,
        Category::Compras,
        Category::Monumento,
        Category::Historia,
        Category::Entretenimiento,
        Category::Interes,
    ];

    pub fn id(self) -> &'static str {
        self.meta().0
    }

    pub fn label(self) -> &'static str {
        self.meta().1
    }

    pub fn icon(self) -> &'static str {
        self.meta().2
    }

    pub fn color(self) -> &'static str {
        self.meta().3
    }

    fn meta(self) -> (&'static str, &'static str, &'static str, &'static str) {
        match self {
            Category::Icono => ("icono", "Icono", "fa-landmark", "#ef4444"),
            Category::Cultura => ("cultura", "Cultura", "fa-book", "#8b5cf6"),
            Category::Relax => ("relax", "Relax", "fa-leaf", "#10b981"),
            Category::Vista => ("vista", "Vista", "fa-eye", "#3b82f6"),
            Category::Experiencia => ("experiencia", "Experiencia", "fa-star", "#f59e0b"),
            Category::Naturaleza => ("naturaleza", "Naturaleza", "fa-tree", "#22c55e"),
            Category::Arte => ("arte", "Arte", "fa-palette", "#ec4899"),
            Category::Museo => ("museo", "Museo", "fa-building-columns", "#6366f1"),
            Category::Paseo => ("paseo", "Paseo", "fa-walking", "#14b8a6"),
            Category::Moda => ("moda", "Moda", "fa-shirt", "#a855f7"),
            Category::Memoria => ("memoria", "Memoria", "fa-heart", "#64748b"),
            Category::Foto => ("foto", "Foto", "fa-camera", "#06b6d4"),
            Category::Deporte => ("deporte", "Deporte", "fa-baseball", "#f97316"),
            Category::Restaurante => ("restaurante", "Restaurante", "fa-utensils", "#dc2626"),
            Category::Compras => ("compras", "Compras", "fa-shopping-bag", "#7c3aed"),
            Category::Monumento => ("monumento", "Monumento", "fa-monument", "#78716c"),
            Category::Historia => ("historia", "Historia", "fa-scroll", "#92400e"),
            Category::Entretenimiento => {
                ("entretenimiento", "Entretenimiento", "fa-ticket", "#db2777")
            }
            Category::Interes => ("interes", "Interés", "fa-map-pin", "#059669"),
        }
    }

    /// Lenient lookup by id or label, case-insensitive.
    ///
    /// Unknown names map to [`Category::Interes`].
    pub fn lookup(name: &str) -> Self {
        let normalized = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|cat| cat.id() == normalized || cat.label().to_lowercase() == normalized)
            .unwrap_or_default()
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        Category::lookup(&name)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.label().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
