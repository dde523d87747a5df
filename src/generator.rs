//! AI itinerary generation.
//!
//! The completion service is an opaque collaborator: a structured request goes
//! in, a JSON itinerary comes out. [`GeneratedItinerary::parse`] is the only
//! place that decides whether that JSON is usable.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::GeneratorError;
use crate::model::{Category, GeoPoint, NewDay, NewStop, StopDetails};

const SYSTEM_PROMPT: &str =
    "You are a travel planning assistant that produces detailed itineraries as JSON.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Budget {
    Low,
    #[default]
    Medium,
    High,
}

impl Budget {
    fn describe(self) -> &'static str {
        match self {
            Budget::Low => "economical, preferring free or low-cost options",
            Budget::Medium => "moderate, balancing quality and price",
            Budget::High => "premium, prioritising exclusive experiences",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryRequest {
    pub city: String,
    pub country: String,
    pub num_days: u32,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub budget: Budget,
}

impl ItineraryRequest {
    pub fn new(city: impl Into<String>, country: impl Into<String>, num_days: u32) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
            num_days,
            interests: Vec::new(),
            budget: Budget::default(),
        }
    }

    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests = interests.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    /// Fixed prompt template for the completion call.
    pub fn prompt(&self) -> String {
        let interests = if self.interests.is_empty() {
            "general sightseeing, culture, food".to_string()
        } else {
            self.interests.join(", ")
        };
        let categories = Category::ALL
            .iter()
            .map(|cat| cat.label())
            .collect::<Vec<_>>()
            .join("|");

        format!(
            "Create a detailed itinerary for a trip to {city}, {country}.\n\
             - Duration: {days} days\n\
             - Interests: {interests}\n\
             - Budget: {budget}\n\
             - Real, verifiable places with accurate GPS coordinates\n\
             - 4 to 6 stops per day, ordered by geographic proximity\n\n\
             Respond with JSON only, in this shape:\n\
             {{\"days\": [{{\"dayNumber\": 1, \"title\": \"\", \"color\": \"#hex\", \"stops\": \
             [{{\"title\": \"\", \"lat\": 0.0, \"lng\": 0.0, \"category\": \"{categories}\", \
             \"tip\": \"\", \"time\": \"\", \"address\": \"\"}}]}}]}}",
            city = self.city,
            country = self.country,
            days = self.num_days,
            interests = interests,
            budget = self.budget.describe(),
            categories = categories,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedStop {
    pub title: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tip: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl GeneratedStop {
    pub fn to_new_stop(&self) -> NewStop {
        NewStop {
            point: GeoPoint::new(self.lat, self.lng),
            details: StopDetails {
                title: self.title.clone(),
                category: self
                    .category
                    .as_deref()
                    .map(Category::lookup)
                    .unwrap_or_default(),
                img: None,
                tip: self.tip.clone(),
                time: self.time.clone(),
                address: self.address.clone(),
                is_visited: false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDay {
    #[serde(default)]
    pub day_number: Option<i32>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub stops: Vec<GeneratedStop>,
}

impl GeneratedDay {
    /// `position` is the 0-based index of this day in the itinerary.
    pub fn to_new_day(&self, position: usize) -> NewDay {
        NewDay {
            day_number: self.day_number.unwrap_or(position as i32 + 1),
            title: self.title.clone(),
            color: self.color.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedItinerary {
    pub days: Vec<GeneratedDay>,
}

impl GeneratedItinerary {
    /// Parse and validate a completion payload.
    pub fn parse(text: &str) -> Result<Self, GeneratorError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if !value.get("days").is_some_and(|days| days.is_array()) {
            return Err(GeneratorError::InvalidItinerary(
                "missing `days` array".to_string(),
            ));
        }

        let itinerary: GeneratedItinerary = serde_json::from_value(value)?;
        for (day_index, day) in itinerary.days.iter().enumerate() {
            for stop in &day.stops {
                if !GeoPoint::new(stop.lat, stop.lng).is_valid() {
                    return Err(GeneratorError::InvalidItinerary(format!(
                        "day {} stop `{}` has invalid coordinates ({}, {})",
                        day_index + 1,
                        stop.title,
                        stop.lat,
                        stop.lng
                    )));
                }
            }
        }
        Ok(itinerary)
    }

    pub fn stop_count(&self) -> usize {
        self.days.iter().map(|day| day.stops.len()).sum()
    }
}

/// Produces an itinerary for a trip request.
pub trait ItineraryGenerator {
    fn generate(&self, request: &ItineraryRequest) -> Result<GeneratedItinerary, GeneratorError>;
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// OpenAI-compatible API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4-turbo-preview".to_string(),
            temperature: 0.7,
            max_tokens: 4000,
            timeout_secs: 60,
        }
    }
}

impl GeneratorConfig {
    /// Read `ITINERARY_AI_URL`, `ITINERARY_AI_KEY` and `ITINERARY_AI_MODEL`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("ITINERARY_AI_URL") {
            config.base_url = url;
        }
        match std::env::var("ITINERARY_AI_KEY") {
            Ok(key) => config.api_key = key,
            Err(_) => warn!("ITINERARY_AI_KEY not set; generation requests will fail"),
        }
        if let Ok(model) = std::env::var("ITINERARY_AI_MODEL") {
            config.model = model;
        }
        config
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Blocking client for a `/chat/completions` endpoint in JSON mode.
#[derive(Debug, Clone)]
pub struct ChatCompletionsGenerator {
    config: GeneratorConfig,
    client: reqwest::blocking::Client,
}

impl ChatCompletionsGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, GeneratorError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn request_body(&self, request: &ItineraryRequest) -> serde_json::Value {
        json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": request.prompt() },
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "response_format": { "type": "json_object" },
        })
    }
}

impl ItineraryGenerator for ChatCompletionsGenerator {
    fn generate(&self, request: &ItineraryRequest) -> Result<GeneratedItinerary, GeneratorError> {
        debug!(city = %request.city, days = request.num_days, "requesting itinerary");

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(request))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                message: response.text().unwrap_or_default(),
            });
        }

        let body: ChatResponse = response.json()?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GeneratorError::InvalidItinerary("empty completion".to_string()))?;

        let itinerary = GeneratedItinerary::parse(&content)?;
        info!(
            city = %request.city,
            days = itinerary.days.len(),
            stops = itinerary.stop_count(),
            "generated itinerary"
        );
        Ok(itinerary)
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
