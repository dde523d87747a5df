//! PostgREST adapter for the itinerary store.
//!
//! Tables `trips`, `days` and `stops` live under `/rest/v1/`. Columns are
//! snake_case; base location is flattened into `base_location_*` columns.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::model::{
    BaseLocation, Category, Day, DayId, GeoPoint, NewDay, NewStop, NewTrip, Stop, StopDetails,
    StopId, Trip, TripId,
};
use crate::sequencer::OrderAssignment;
use crate::store::ItineraryStore;

#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    /// Project URL, without the `/rest/v1` suffix.
    pub base_url: String,
    /// Sent both as `apikey` and as a bearer token.
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for RestStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

impl RestStoreConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Read `TRIP_STORE_URL` and `TRIP_STORE_KEY`, keeping defaults for
    /// anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("TRIP_STORE_URL") {
            config.base_url = url;
        }
        match std::env::var("TRIP_STORE_KEY") {
            Ok(key) => config.api_key = key,
            Err(_) => warn!("TRIP_STORE_KEY not set; store requests will be anonymous"),
        }
        config
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }
}

#[derive(Debug, Clone)]
pub struct RestStore {
    config: RestStoreConfig,
    client: Client,
}

impl RestStore {
    pub fn new(config: RestStoreConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        if !config.api_key.is_empty() {
            let key = HeaderValue::from_str(&config.api_key)?;
            let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))?;
            headers.insert(HeaderName::from_static("apikey"), key);
            headers.insert(AUTHORIZATION, bearer);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn select(&self, table: &str, filters: &[(&str, String)]) -> RequestBuilder {
        self.client
            .get(self.config.table_url(table))
            .query(&[("select", "*")])
            .query(filters)
    }

    fn returning(builder: RequestBuilder) -> RequestBuilder {
        builder.header("Prefer", "return=representation")
    }

    fn fetch_rows<T: DeserializeOwned>(builder: RequestBuilder) -> Result<Vec<T>, StoreError> {
        let response = check_status(builder.send()?)?;
        let body = response.text()?;
        serde_json::from_str(&body).map_err(|err| StoreError::Decode {
            message: err.to_string(),
        })
    }

    fn fetch_one<T: DeserializeOwned>(
        builder: RequestBuilder,
        entity: &'static str,
        id: &str,
    ) -> Result<T, StoreError> {
        first_row(Self::fetch_rows(builder)?, entity, id)
    }

    fn execute(builder: RequestBuilder) -> Result<(), StoreError> {
        check_status(builder.send()?)?;
        Ok(())
    }
}

/// An empty representation means the filter matched nothing.
fn first_row<T>(rows: Vec<T>, entity: &'static str, id: &str) -> Result<T, StoreError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::not_found(entity, id))
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().unwrap_or_default();
    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

impl ItineraryStore for RestStore {
    fn list_trips(&self) -> Result<Vec<Trip>, StoreError> {
        let rows: Vec<TripRow> =
            Self::fetch_rows(self.select("trips", &[("order", "created_at.desc".to_string())]))?;
        Ok(rows.into_iter().map(Trip::from).collect())
    }

    fn get_trip(&self, trip_id: &TripId) -> Result<Trip, StoreError> {
        let row: TripRow = Self::fetch_one(
            self.select("trips", &[("id", eq(trip_id))]),
            "trip",
            trip_id.as_str(),
        )?;
        Ok(row.into())
    }

    fn create_trip(&mut self, trip: &NewTrip) -> Result<Trip, StoreError> {
        let columns = TripColumns::new(
            trip.name.clone(),
            trip.city.clone(),
            trip.country.clone(),
            trip.base_location.as_ref(),
        );
        let builder = self.client.post(self.config.table_url("trips")).json(&[columns]);
        let label = trip.name.as_deref().unwrap_or_default();
        let row: TripRow = Self::fetch_one(Self::returning(builder), "trip", label)?;
        Ok(row.into())
    }

    fn update_trip(&mut self, trip: &Trip) -> Result<Trip, StoreError> {
        let builder = self
            .client
            .patch(self.config.table_url("trips"))
            .query(&[("id", eq(&trip.id))])
            .json(&TripRow::from(trip).columns);
        let row: TripRow = Self::fetch_one(Self::returning(builder), "trip", trip.id.as_str())?;
        Ok(row.into())
    }

    fn delete_trip(&mut self, trip_id: &TripId) -> Result<(), StoreError> {
        // Days and stops go with it through ON DELETE CASCADE.
        let builder = self
            .client
            .delete(self.config.table_url("trips"))
            .query(&[("id", eq(trip_id))]);
        let _: TripRow = Self::fetch_one(Self::returning(builder), "trip", trip_id.as_str())?;
        Ok(())
    }

    fn list_days(&self, trip_id: &TripId) -> Result<Vec<Day>, StoreError> {
        let rows: Vec<DayRow> = Self::fetch_rows(self.select(
            "days",
            &[
                ("trip_id", eq(trip_id)),
                ("order", "day_number.asc".to_string()),
            ],
        ))?;
        Ok(rows.into_iter().map(Day::from).collect())
    }

    fn get_day(&self, day_id: &DayId) -> Result<Day, StoreError> {
        let row: DayRow = Self::fetch_one(
            self.select("days", &[("id", eq(day_id))]),
            "day",
            day_id.as_str(),
        )?;
        Ok(row.into())
    }

    fn create_day(&mut self, trip_id: &TripId, day: &NewDay) -> Result<Day, StoreError> {
        let body = json!([{
            "trip_id": trip_id,
            "day_number": day.day_number,
            "title": day.title,
            "color": day.color_or_default(),
        }]);
        let builder = self.client.post(self.config.table_url("days")).json(&body);
        let row: DayRow = Self::fetch_one(Self::returning(builder), "day", trip_id.as_str())?;
        Ok(row.into())
    }

    fn update_day(&mut self, day: &Day) -> Result<Day, StoreError> {
        let body = json!({
            "day_number": day.day_number,
            "title": day.title,
            "color": day.color,
        });
        let builder = self
            .client
            .patch(self.config.table_url("days"))
            .query(&[("id", eq(&day.id))])
            .json(&body);
        let row: DayRow = Self::fetch_one(Self::returning(builder), "day", day.id.as_str())?;
        Ok(row.into())
    }

    fn delete_day(&mut self, day_id: &DayId) -> Result<(), StoreError> {
        Self::execute(
            self.client
                .delete(self.config.table_url("days"))
                .query(&[("id", eq(day_id))]),
        )
    }

    fn list_stops(&self, day_id: &DayId) -> Result<Vec<Stop>, StoreError> {
        let rows: Vec<StopRow> = Self::fetch_rows(self.select(
            "stops",
            &[
                ("day_id", eq(day_id)),
                ("order", "order_index.asc".to_string()),
            ],
        ))?;
        debug!(day = %day_id, count = rows.len(), "listed stops");
        Ok(rows.into_iter().map(Stop::from).collect())
    }

    fn get_stop(&self, stop_id: &StopId) -> Result<Stop, StoreError> {
        let row: StopRow = Self::fetch_one(
            self.select("stops", &[("id", eq(stop_id))]),
            "stop",
            stop_id.as_str(),
        )?;
        Ok(row.into())
    }

    fn create_stop(&mut self, day_id: &DayId, stop: &NewStop) -> Result<Stop, StoreError> {
        let existing: Vec<IdRow> = Self::fetch_rows(
            self.client
                .get(self.config.table_url("stops"))
                .query(&[("select", "id".to_string()), ("day_id", eq(day_id))]),
        )?;

        let row = NewStopRow {
            day_id: day_id.clone(),
            lat: stop.point.lat,
            lng: stop.point.lng,
            details: DetailColumns::from(&stop.details),
            order_index: existing.len() as i32,
            is_visited: false,
        };
        let builder = self.client.post(self.config.table_url("stops")).json(&[row]);
        let created: StopRow = Self::fetch_one(Self::returning(builder), "day", day_id.as_str())?;
        Ok(created.into())
    }

    fn update_stop(&mut self, stop: &Stop) -> Result<Stop, StoreError> {
        let body = StopUpdateRow {
            lat: stop.point.lat,
            lng: stop.point.lng,
            details: DetailColumns::from(&stop.payload),
            is_visited: stop.payload.is_visited,
        };
        let builder = self
            .client
            .patch(self.config.table_url("stops"))
            .query(&[("id", eq(&stop.id))])
            .json(&body);
        let row: StopRow = Self::fetch_one(Self::returning(builder), "stop", stop.id.as_str())?;
        Ok(row.into())
    }

    fn delete_stop(&mut self, stop_id: &StopId) -> Result<(), StoreError> {
        Self::execute(
            self.client
                .delete(self.config.table_url("stops"))
                .query(&[("id", eq(stop_id))]),
        )
    }

    fn set_visited(&mut self, stop_id: &StopId, visited: bool) -> Result<Stop, StoreError> {
        let builder = self
            .client
            .patch(self.config.table_url("stops"))
            .query(&[("id", eq(stop_id))])
            .json(&json!({ "is_visited": visited }));
        let row: StopRow = Self::fetch_one(Self::returning(builder), "stop", stop_id.as_str())?;
        Ok(row.into())
    }

    fn set_order(
        &mut self,
        day_id: &DayId,
        order: &[OrderAssignment<StopId>],
    ) -> Result<(), StoreError> {
        for assignment in order {
            // A stop outside `day_id` matches no row; PostgREST still answers 200.
            let builder = self
                .client
                .patch(self.config.table_url("stops"))
                .query(&[("id", eq(&assignment.stop_id)), ("day_id", eq(day_id))])
                .json(&json!({ "order_index": assignment.order_index }));
            let _: IdRow = Self::fetch_one(
                Self::returning(builder),
                "stop",
                assignment.stop_id.as_str(),
            )?;
        }
        debug!(day = %day_id, count = order.len(), "wrote stop order");
        Ok(())
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TripRow {
    id: TripId,
    #[serde(flatten)]
    columns: TripColumns,
}

/// Writable trip columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TripColumns {
    name: Option<String>,
    city: Option<String>,
    country: Option<String>,
    base_location_lat: Option<f64>,
    base_location_lng: Option<f64>,
    base_location_title: Option<String>,
    base_location_desc: Option<String>,
    base_location_img: Option<String>,
}

impl TripColumns {
    fn new(
        name: Option<String>,
        city: Option<String>,
        country: Option<String>,
        base: Option<&BaseLocation>,
    ) -> Self {
        TripColumns {
            name,
            city,
            country,
            base_location_lat: base.map(|b| b.point.lat),
            base_location_lng: base.map(|b| b.point.lng),
            base_location_title: base.map(|b| b.title.clone()),
            base_location_desc: base.and_then(|b| b.desc.clone()),
            base_location_img: base.and_then(|b| b.img.clone()),
        }
    }
}

impl From<TripRow> for Trip {
    fn from(row: TripRow) -> Self {
        let columns = row.columns;
        let base_location = match (columns.base_location_lat, columns.base_location_lng) {
            (Some(lat), Some(lng)) => Some(BaseLocation {
                point: GeoPoint::new(lat, lng),
                title: columns
                    .base_location_title
                    .or_else(|| columns.city.clone())
                    .unwrap_or_default(),
                desc: columns.base_location_desc,
                img: columns.base_location_img,
            }),
            _ => None,
        };
        Trip {
            id: row.id,
            name: columns.name,
            city: columns.city,
            country: columns.country,
            base_location,
        }
    }
}

impl From<&Trip> for TripRow {
    fn from(trip: &Trip) -> Self {
        TripRow {
            id: trip.id.clone(),
            columns: TripColumns::new(
                trip.name.clone(),
                trip.city.clone(),
                trip.country.clone(),
                trip.base_location.as_ref(),
            ),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct DayRow {
    id: DayId,
    day_number: i32,
    title: Option<String>,
    color: Option<String>,
}

impl From<DayRow> for Day {
    fn from(row: DayRow) -> Self {
        Day {
            id: row.id,
            day_number: row.day_number,
            title: row.title.unwrap_or_default(),
            color: row
                .color
                .unwrap_or_else(|| crate::model::DEFAULT_DAY_COLOR.to_string()),
            stops: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct IdRow {
    #[allow(dead_code)]
    id: StopId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DetailColumns {
    title: String,
    category: Option<String>,
    img: Option<String>,
    tip: Option<String>,
    time: Option<String>,
    address: Option<String>,
}

impl From<&StopDetails> for DetailColumns {
    fn from(details: &StopDetails) -> Self {
        DetailColumns {
            title: details.title.clone(),
            category: Some(details.category.label().to_string()),
            img: details.img.clone(),
            tip: details.tip.clone(),
            time: details.time.clone(),
            address: details.address.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct StopRow {
    id: StopId,
    lat: f64,
    lng: f64,
    order_index: Option<i32>,
    #[serde(default)]
    is_visited: Option<bool>,
    #[serde(flatten)]
    details: DetailColumns,
}

impl From<StopRow> for Stop {
    fn from(row: StopRow) -> Self {
        Stop {
            id: row.id,
            point: GeoPoint::new(row.lat, row.lng),
            order_index: row.order_index.unwrap_or_default(),
            payload: StopDetails {
                title: row.details.title,
                category: row
                    .details
                    .category
                    .as_deref()
                    .map(Category::lookup)
                    .unwrap_or_default(),
                img: row.details.img,
                tip: row.details.tip,
                time: row.details.time,
                address: row.details.address,
                is_visited: row.is_visited.unwrap_or(false),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct NewStopRow {
    day_id: DayId,
    lat: f64,
    lng: f64,
    #[serde(flatten)]
    details: DetailColumns,
    order_index: i32,
    is_visited: bool,
}

#[derive(Debug, Clone, Serialize)]
struct StopUpdateRow {
    lat: f64,
    lng: f64,
    #[serde(flatten)]
    details: DetailColumns,
    is_visited: bool,
}
