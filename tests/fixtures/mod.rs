//! Test fixtures for trip-sequencer.
//!
//! Provides realistic test data including:
//! - Real New York City points of interest
//! - Builders for seeded in-memory stores

pub mod nyc_locations;

pub use nyc_locations::*;
