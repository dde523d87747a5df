//! trip-sequencer core
//!
//! Orders a trip day's stops by proximity and keeps the persisted order in
//! step with every add and edit.

pub mod error;
pub mod generator;
pub mod haversine;
pub mod itinerary;
pub mod model;
pub mod planar;
pub mod polyline;
pub mod rest;
pub mod sequencer;
pub mod store;
pub mod traits;
