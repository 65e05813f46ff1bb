//! Itinerary validator
//!
//! Strict accept/reject of the parsed model output against the trip. Schema
//! shape is checked first; the semantic rules then run in a fixed order:
//! mode vocabulary, substitution thresholds, location set, ordering, leg
//! count, activities. The first violation is returned. Nothing is coerced.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::{Map, Value as JsonValue};

use crate::distance::DistanceOracle;
use crate::itinerary::{Itinerary, Leg, ValidationError};
use crate::rules::{self, TransportMode};
use crate::trip::TripRequest;

const STOPS: &str = "stops";
const ACTIVITIES: &str = "activities";
const LOCATION: &str = "location";
const MODE: &str = "mode";

/// A stop that passed the shape check
struct RawStop<'a> {
    location: &'a str,
    mode: &'a str,
}

/// Validate parsed model output for `trip`
pub fn validate_itinerary<D: DistanceOracle + ?Sized>(
    parsed: &JsonValue,
    trip: &TripRequest,
    distances: &D,
) -> Result<Itinerary, ValidationError> {
    let (stops, activities) = check_shape(parsed)?;

    let legs = check_modes(&stops)?;
    check_thresholds(&legs, distances)?;

    let expected = trip.locations();
    let expected_set: HashSet<&str> = expected.iter().copied().collect();
    check_location_set(&legs, &expected, &expected_set)?;
    check_ordering(&legs, trip, &expected)?;

    if legs.len() != expected.len() {
        return Err(ValidationError::LegCountMismatch {
            expected: expected.len(),
            found: legs.len(),
        });
    }

    if let Some(location) = activities
        .keys()
        .find(|k| !expected_set.contains(k.as_str()))
    {
        return Err(ValidationError::UnknownActivityLocation {
            location: location.clone(),
        });
    }

    Ok(Itinerary::new(legs, activities))
}

fn check_shape(
    parsed: &JsonValue,
) -> Result<(Vec<RawStop<'_>>, BTreeMap<String, String>), ValidationError> {
    let root = parsed.as_object().ok_or(ValidationError::NotAnObject {
        found: type_name(parsed),
    })?;
    reject_unknown_fields(root, &[STOPS, ACTIVITIES], "")?;

    let stops_raw = root.get(STOPS).ok_or_else(|| ValidationError::MissingField {
        path: STOPS.to_string(),
    })?;
    let stops_raw = stops_raw
        .as_array()
        .ok_or_else(|| ValidationError::WrongType {
            path: STOPS.to_string(),
            expected: "an array",
            found: type_name(stops_raw),
        })?;

    let mut stops = Vec::with_capacity(stops_raw.len());
    for (idx, stop_raw) in stops_raw.iter().enumerate() {
        let path = format!("{}[{}]", STOPS, idx);
        let stop = stop_raw
            .as_object()
            .ok_or_else(|| ValidationError::WrongType {
                path: path.clone(),
                expected: "an object",
                found: type_name(stop_raw),
            })?;
        reject_unknown_fields(stop, &[LOCATION, MODE], &path)?;

        stops.push(RawStop {
            location: string_field(stop, LOCATION, &path)?,
            mode: string_field(stop, MODE, &path)?,
        });
    }

    let mut activities = BTreeMap::new();
    if let Some(raw) = root.get(ACTIVITIES) {
        let map = raw.as_object().ok_or_else(|| ValidationError::WrongType {
            path: ACTIVITIES.to_string(),
            expected: "an object",
            found: type_name(raw),
        })?;
        for (location, value) in map {
            let text = value.as_str().ok_or_else(|| ValidationError::WrongType {
                path: format!("{}.{}", ACTIVITIES, location),
                expected: "a string",
                found: type_name(value),
            })?;
            activities.insert(location.clone(), text.to_string());
        }
    }

    Ok((stops, activities))
}

fn reject_unknown_fields(
    object: &Map<String, JsonValue>,
    allowed: &[&str],
    parent: &str,
) -> Result<(), ValidationError> {
    match object.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(key) => Err(ValidationError::UnexpectedField {
            path: join_path(parent, key),
        }),
        None => Ok(()),
    }
}

fn string_field<'a>(
    object: &'a Map<String, JsonValue>,
    field: &str,
    parent: &str,
) -> Result<&'a str, ValidationError> {
    let value = object.get(field).ok_or_else(|| ValidationError::MissingField {
        path: join_path(parent, field),
    })?;
    value.as_str().ok_or_else(|| ValidationError::WrongType {
        path: join_path(parent, field),
        expected: "a string",
        found: type_name(value),
    })
}

fn join_path(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", parent, field)
    }
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Vocabulary membership, plus the empty-mode rule for the final stop
fn check_modes(stops: &[RawStop<'_>]) -> Result<Vec<Leg>, ValidationError> {
    let last = stops.len().saturating_sub(1);
    let mut legs = Vec::with_capacity(stops.len());

    for (idx, stop) in stops.iter().enumerate() {
        let stop_no = idx + 1;
        if idx == last {
            if !stop.mode.is_empty() {
                return Err(ValidationError::TerminalModeNotEmpty {
                    stop: stop_no,
                    location: stop.location.to_string(),
                    mode: stop.mode.to_string(),
                });
            }
            legs.push(Leg::new(stop.location, None));
            continue;
        }

        if stop.mode.is_empty() {
            return Err(ValidationError::MissingMode {
                stop: stop_no,
                location: stop.location.to_string(),
            });
        }
        let mode = TransportMode::from_wire(stop.mode).ok_or_else(|| ValidationError::UnknownMode {
            stop: stop_no,
            location: stop.location.to_string(),
            mode: stop.mode.to_string(),
        })?;
        legs.push(Leg::new(stop.location, Some(mode)));
    }

    Ok(legs)
}

/// Substitution thresholds, for every leg whose distance is known
fn check_thresholds<D: DistanceOracle + ?Sized>(
    legs: &[Leg],
    distances: &D,
) -> Result<(), ValidationError> {
    for (idx, pair) in legs.windows(2).enumerate() {
        let (from, to) = (&pair[0], &pair[1]);
        let Some(mode) = from.mode else { continue };
        let Some(miles) = distances.distance_between(&from.location, &to.location) else {
            continue;
        };
        if let Some(required) = rules::required_mode(mode, miles) {
            return Err(ValidationError::ThresholdViolation {
                stop: idx + 1,
                from: from.location.clone(),
                to: to.location.clone(),
                mode,
                miles,
                required,
            });
        }
    }
    Ok(())
}

/// Distinct-name comparison: first missing, then first unexpected
fn check_location_set(
    legs: &[Leg],
    expected: &[&str],
    expected_set: &HashSet<&str>,
) -> Result<(), ValidationError> {
    let found: HashSet<&str> = legs.iter().map(|l| l.location.as_str()).collect();

    if let Some(missing) = expected.iter().find(|loc| !found.contains(*loc)) {
        return Err(ValidationError::LocationMissing {
            location: missing.to_string(),
        });
    }
    if let Some((idx, leg)) = legs
        .iter()
        .enumerate()
        .find(|(_, leg)| !expected_set.contains(leg.location.as_str()))
    {
        return Err(ValidationError::UnexpectedLocation {
            stop: idx + 1,
            location: leg.location.clone(),
        });
    }
    Ok(())
}

/// Ordering rule. Pure length differences are left to the leg-count rule.
fn check_ordering(
    legs: &[Leg],
    trip: &TripRequest,
    expected: &[&str],
) -> Result<(), ValidationError> {
    if trip.fix_order() {
        for (idx, (want, leg)) in expected.iter().zip(legs).enumerate() {
            if leg.location != *want {
                return Err(mismatch(idx, want, &leg.location));
            }
        }
        return Ok(());
    }

    let (Some(first), Some(last)) = (legs.first(), legs.last()) else {
        return Ok(());
    };
    if first.location != trip.starting_location() {
        return Err(mismatch(0, trip.starting_location(), &first.location));
    }
    if last.location != trip.ending_location() {
        return Err(mismatch(legs.len() - 1, trip.ending_location(), &last.location));
    }

    if legs.len() == expected.len() && legs.len() >= 2 {
        let mut allowed: HashMap<&str, usize> = HashMap::new();
        for m in trip.middle_locations() {
            *allowed.entry(m.as_str()).or_default() += 1;
        }
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for leg in &legs[1..legs.len() - 1] {
            let count = seen.entry(leg.location.as_str()).or_default();
            *count += 1;
            let limit = allowed.get(leg.location.as_str()).copied().unwrap_or(0);
            if *count > limit {
                let found = legs[1..legs.len() - 1]
                    .iter()
                    .filter(|l| l.location == leg.location)
                    .count();
                return Err(ValidationError::DuplicateLocation {
                    location: leg.location.clone(),
                    expected: limit,
                    found,
                });
            }
        }
    }

    Ok(())
}

fn mismatch(idx: usize, expected: &str, found: &str) -> ValidationError {
    ValidationError::OrderingMismatch {
        stop: idx + 1,
        expected: expected.to_string(),
        found: found.to_string(),
    }
}
