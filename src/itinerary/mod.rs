//! Validated itineraries
//!
//! An `Itinerary` only comes out of `validate_itinerary`; once accepted it is
//! never mutated. Serializes back to the canonical stop-list schema.

mod errors;
mod validator;

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::rules::TransportMode;

pub use errors::ValidationError;
pub use validator::validate_itinerary;

/// One stop and the mode used to leave it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leg {
    pub location: String,
    /// `None` only for the final stop (serialized as "")
    #[serde(serialize_with = "serialize_mode")]
    pub mode: Option<TransportMode>,
}

impl Leg {
    pub fn new(location: impl Into<String>, mode: Option<TransportMode>) -> Self {
        Self {
            location: location.into(),
            mode,
        }
    }

    /// Wire spelling of the mode ("" for the final stop)
    pub fn mode_str(&self) -> &'static str {
        self.mode.map(|m| m.as_str()).unwrap_or("")
    }
}

fn serialize_mode<S: Serializer>(mode: &Option<TransportMode>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(mode.map(|m| m.as_str()).unwrap_or(""))
}

/// Accepted itinerary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Itinerary {
    stops: Vec<Leg>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    activities: BTreeMap<String, String>,
}

impl Itinerary {
    pub(crate) fn new(stops: Vec<Leg>, activities: BTreeMap<String, String>) -> Self {
        Self { stops, activities }
    }

    pub fn legs(&self) -> &[Leg] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Location names in travel order
    pub fn locations(&self) -> Vec<&str> {
        self.stops.iter().map(|l| l.location.as_str()).collect()
    }

    /// Suggested activities per location
    pub fn activities(&self) -> &BTreeMap<String, String> {
        &self.activities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_to_canonical_schema() {
        let itinerary = Itinerary::new(
            vec![
                Leg::new("Irvine, CA", Some(TransportMode::Driving)),
                Leg::new("Los Angeles, CA", None),
            ],
            BTreeMap::new(),
        );
        let json = serde_json::to_value(&itinerary).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "stops": [
                    {"location": "Irvine, CA", "mode": "DRIVING"},
                    {"location": "Los Angeles, CA", "mode": ""}
                ]
            })
        );
    }

    #[test]
    fn test_activities_serialized_when_present() {
        let mut activities = BTreeMap::new();
        activities.insert("Los Angeles, CA".to_string(), "Griffith Observatory".to_string());
        let itinerary = Itinerary::new(
            vec![
                Leg::new("Irvine, CA", Some(TransportMode::Transit)),
                Leg::new("Los Angeles, CA", None),
            ],
            activities,
        );
        let json = serde_json::to_value(&itinerary).unwrap();
        assert_eq!(json["activities"]["Los Angeles, CA"], "Griffith Observatory");
        assert_eq!(itinerary.locations(), vec!["Irvine, CA", "Los Angeles, CA"]);
        assert_eq!(itinerary.legs()[1].mode_str(), "");
    }
}
