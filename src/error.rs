//! Error types.
//!
//! Sequencing itself is total over valid coordinates; the only error it can
//! raise is a validation failure. Everything I/O-shaped belongs to the store
//! or the generator boundary.

use crate::model::{DayId, StopId};

/// Validation failures raised before sequencing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SequenceError {
    /// NaN, infinite or out-of-range latitude/longitude
    #[error("stop {stop_id} has invalid coordinates ({lat}, {lng})")]
    InvalidCoordinate { stop_id: String, lat: f64, lng: f64 },
}

/// Errors raised by an [`crate::store::ItineraryStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected rows
    #[error("decode error: {message}")]
    Decode { message: String },

    /// Entity does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// API key cannot be sent as a header
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl StoreError {
    /// Whether the same request may succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Http(err) => {
                err.is_timeout()
                    || err.is_connect()
                    || err.status().is_some_and(|status| status.is_server_error())
            }
            StoreError::Api { status, .. } => *status == 429 || (500..600).contains(status),
            StoreError::Decode { .. }
            | StoreError::NotFound { .. }
            | StoreError::InvalidHeader(_) => false,
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Errors raised by an [`crate::generator::ItineraryGenerator`].
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Completion endpoint returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Payload was not valid JSON
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload parsed but is not a usable itinerary
    #[error("invalid itinerary: {0}")]
    InvalidItinerary(String),
}

/// Errors raised by [`crate::itinerary::Itinerary`].
#[derive(Debug, thiserror::Error)]
pub enum ItineraryError {
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error("day {0} is not part of the loaded trip")]
    UnknownDay(DayId),

    #[error("stop {0} is not part of the loaded trip")]
    UnknownStop(StopId),

    #[error("no trip loaded")]
    NotLoaded,
}
