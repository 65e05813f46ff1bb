//! Trip requests
//!
//! `WireTripRequest` is the shape the front door deserializes (camelCase
//! field names). `TripRequest` is the normalized, immutable input to the
//! planning pipeline.

pub mod preferences;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

pub use preferences::Preferences;

/// Accepted date spellings: ISO first, then the US form the web client sent
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Errors converting a wire request into a `TripRequest`
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid date for {field}: '{value}' (expected YYYY-MM-DD or MM/DD/YYYY)")]
    InvalidDate { field: &'static str, value: String },
}

/// Travel date range. `start <= end` is assumed, not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Inbound request as the front door receives it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTripRequest {
    pub starting_location: Option<String>,
    #[serde(default)]
    pub ending_location: Option<String>,
    #[serde(default)]
    pub middle_locations: Option<Vec<String>>,
    pub fix_order: bool,
    #[serde(default)]
    pub preferences: Option<Map<String, JsonValue>>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub additional_requests: Option<String>,
}

/// Normalized trip request
///
/// Starting and ending locations are always non-empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRequest {
    starting_location: String,
    ending_location: String,
    middle_locations: Vec<String>,
    fix_order: bool,
    preferences: Preferences,
    travel_dates: DateRange,
    additional_requests: String,
}

impl TripRequest {
    /// Build a request directly (already-normalized preferences)
    ///
    /// A blank ending location defaults to the starting location; blank
    /// middle entries are dropped.
    pub fn new(
        starting_location: impl Into<String>,
        ending_location: Option<String>,
        middle_locations: Vec<String>,
        fix_order: bool,
        preferences: Preferences,
        travel_dates: DateRange,
        additional_requests: impl Into<String>,
    ) -> Result<Self, RequestError> {
        let starting_location = starting_location.into().trim().to_string();
        if starting_location.is_empty() {
            return Err(RequestError::MissingField("startingLocation"));
        }

        let ending_location = ending_location
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| starting_location.clone());

        let middle_locations = middle_locations
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            starting_location,
            ending_location,
            middle_locations,
            fix_order,
            preferences,
            travel_dates,
            additional_requests: additional_requests.into().trim().to_string(),
        })
    }

    /// Convert the front door's wire request, normalizing preferences
    pub fn from_wire(wire: WireTripRequest) -> Result<Self, RequestError> {
        let start = wire
            .starting_location
            .ok_or(RequestError::MissingField("startingLocation"))?;
        let travel_dates = DateRange {
            start: parse_date("startDate", wire.start_date.as_deref())?,
            end: parse_date("endDate", wire.end_date.as_deref())?,
        };
        let preferences = Preferences::normalize(wire.preferences.as_ref());

        Self::new(
            start,
            wire.ending_location,
            wire.middle_locations.unwrap_or_default(),
            wire.fix_order,
            preferences,
            travel_dates,
            wire.additional_requests.unwrap_or_default(),
        )
    }

    pub fn starting_location(&self) -> &str {
        &self.starting_location
    }

    pub fn ending_location(&self) -> &str {
        &self.ending_location
    }

    pub fn middle_locations(&self) -> &[String] {
        &self.middle_locations
    }

    pub fn fix_order(&self) -> bool {
        self.fix_order
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn travel_dates(&self) -> &DateRange {
        &self.travel_dates
    }

    pub fn additional_requests(&self) -> &str {
        &self.additional_requests
    }

    /// Full location list in input order: start, middles, end
    pub fn locations(&self) -> Vec<&str> {
        let mut all = Vec::with_capacity(self.middle_locations.len() + 2);
        all.push(self.starting_location.as_str());
        all.extend(self.middle_locations.iter().map(String::as_str));
        all.push(self.ending_location.as_str());
        all
    }

    /// Number of stops an itinerary for this trip must have
    pub fn stop_count(&self) -> usize {
        self.middle_locations.len() + 2
    }
}

fn parse_date(field: &'static str, value: Option<&str>) -> Result<NaiveDate, RequestError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(RequestError::MissingField(field))?;

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .ok_or_else(|| RequestError::InvalidDate {
            field,
            value: value.to_string(),
        })
}
