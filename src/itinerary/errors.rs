//! Validation failures
//!
//! Each variant names exactly one violated rule and the offending value.
//! Stop numbers are 1-based, matching the numbered list in the prompt.

use crate::rules::TransportMode;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("expected a JSON object at the top level, found {found}")]
    NotAnObject { found: &'static str },

    #[error("missing required field '{path}'")]
    MissingField { path: String },

    #[error("unexpected field '{path}'")]
    UnexpectedField { path: String },

    #[error("field '{path}' must be {expected}, found {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("stop {stop} ('{location}') uses mode '{mode}', which is not in the allowed vocabulary")]
    UnknownMode {
        stop: usize,
        location: String,
        mode: String,
    },

    #[error("stop {stop} ('{location}') has an empty mode but is not the final stop")]
    MissingMode { stop: usize, location: String },

    #[error("final stop {stop} ('{location}') has mode '{mode}' but must have an empty mode")]
    TerminalModeNotEmpty {
        stop: usize,
        location: String,
        mode: String,
    },

    #[error("stop {stop} uses {mode} for {miles:.1} miles from '{from}' to '{to}', but {required} is required")]
    ThresholdViolation {
        stop: usize,
        from: String,
        to: String,
        mode: TransportMode,
        miles: f64,
        required: TransportMode,
    },

    #[error("requested location '{location}' is missing from the itinerary")]
    LocationMissing { location: String },

    #[error("stop {stop} ('{location}') is not one of the requested locations")]
    UnexpectedLocation { stop: usize, location: String },

    #[error("stop {stop} is '{found}' but must be '{expected}'")]
    OrderingMismatch {
        stop: usize,
        expected: String,
        found: String,
    },

    #[error("location '{location}' appears {found} time(s) among the middle stops, expected {expected}")]
    DuplicateLocation {
        location: String,
        expected: usize,
        found: usize,
    },

    #[error("itinerary has {found} stops, expected {expected}")]
    LegCountMismatch { expected: usize, found: usize },

    #[error("activities reference '{location}', which is not a requested location")]
    UnknownActivityLocation { location: String },
}

impl ValidationError {
    /// Rule category, for logs and diagnostics
    pub fn rule(&self) -> &'static str {
        match self {
            ValidationError::NotAnObject { .. }
            | ValidationError::MissingField { .. }
            | ValidationError::UnexpectedField { .. }
            | ValidationError::WrongType { .. } => "schema",
            ValidationError::UnknownMode { .. }
            | ValidationError::MissingMode { .. }
            | ValidationError::TerminalModeNotEmpty { .. } => "mode_vocabulary",
            ValidationError::ThresholdViolation { .. } => "mode_substitution",
            ValidationError::LocationMissing { .. } | ValidationError::UnexpectedLocation { .. } => {
                "location_set"
            }
            ValidationError::OrderingMismatch { .. } | ValidationError::DuplicateLocation { .. } => {
                "ordering"
            }
            ValidationError::LegCountMismatch { .. } => "leg_count",
            ValidationError::UnknownActivityLocation { .. } => "activities",
        }
    }

    /// Corrective clause for the next generation request
    pub fn corrective_note(&self) -> String {
        match self {
            ValidationError::NotAnObject { .. }
            | ValidationError::MissingField { .. }
            | ValidationError::UnexpectedField { .. }
            | ValidationError::WrongType { .. } => format!(
                "previous output did not match the required format ({}); return only the JSON object with \"stops\" and optional \"activities\", and no other fields",
                self
            ),
            ValidationError::UnknownMode { stop, mode, .. } => format!(
                "previous output used mode '{}' at stop {}, which is not in the allowed vocabulary; use only the listed modes: {}",
                mode,
                stop,
                TransportMode::vocabulary()
            ),
            ValidationError::MissingMode { stop, .. } => format!(
                "previous output left the mode of stop {} empty; only the final stop may have an empty mode",
                stop
            ),
            ValidationError::TerminalModeNotEmpty { mode, .. } => format!(
                "previous output gave the final stop mode '{}'; the mode of the last stop must be an empty string",
                mode
            ),
            ValidationError::ThresholdViolation {
                stop,
                from,
                to,
                mode,
                miles,
                required,
            } => format!(
                "previous output used {} from '{}' to '{}' (stop {}, about {:.1} miles); that distance requires {}",
                mode, from, to, stop, miles, required
            ),
            ValidationError::LocationMissing { location } => format!(
                "previous output omitted '{}'; every listed location must appear, spelled exactly as listed",
                location
            ),
            ValidationError::UnexpectedLocation { location, .. } => format!(
                "previous output included '{}', which was not requested; use only the listed locations, spelled exactly as listed",
                location
            ),
            ValidationError::OrderingMismatch {
                stop,
                expected,
                found,
            } => format!(
                "previous output put '{}' at stop {} where '{}' is required; follow the ordering rule",
                found, stop, expected
            ),
            ValidationError::DuplicateLocation { location, .. } => format!(
                "previous output repeated '{}'; each listed location appears exactly once",
                location
            ),
            ValidationError::LegCountMismatch { expected, found } => format!(
                "previous output had {} stops; the itinerary must have exactly {} stops",
                found, expected
            ),
            ValidationError::UnknownActivityLocation { location } => format!(
                "previous output listed activities for '{}'; activity keys must be listed location names",
                location
            ),
        }
    }
}
