//! Domain rule table
//!
//! Closed transportation-mode vocabulary and the distance thresholds that
//! force a mode substitution. Consumed by the constraint compiler (rendered
//! into the prompt) and by the itinerary validator (checked per leg).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Transportation mode (closed vocabulary, fixed upper-case spelling)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransportMode {
    Walking,
    Bicycling,
    Driving,
    /// Independent mode, never subject to substitution
    Transit,
    Flight,
}

impl TransportMode {
    /// All modes, in ascending order of reach (TRANSIT sits outside the ladder)
    pub const ALL: [TransportMode; 5] = [
        TransportMode::Walking,
        TransportMode::Bicycling,
        TransportMode::Driving,
        TransportMode::Transit,
        TransportMode::Flight,
    ];

    /// Wire spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Walking => "WALKING",
            TransportMode::Bicycling => "BICYCLING",
            TransportMode::Driving => "DRIVING",
            TransportMode::Transit => "TRANSIT",
            TransportMode::Flight => "FLIGHT",
        }
    }

    /// Parse wire spelling. Exact match only: no synonyms, no case folding.
    pub fn from_wire(s: &str) -> Option<Self> {
        TransportMode::ALL.into_iter().find(|m| m.as_str() == s)
    }

    /// Comma-separated vocabulary, used in prompts and corrective notes
    pub fn vocabulary() -> String {
        TransportMode::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a threshold comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Violated when distance is strictly greater than the limit
    Above,
    /// Violated when distance is strictly less than the limit
    Below,
}

/// One row of the substitution table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubstitutionRule {
    /// Mode the rule applies to
    pub mode: TransportMode,
    pub bound: Bound,
    /// Limit in miles
    pub miles: f64,
    /// Mode that must be used instead once the rule fires
    pub forced: TransportMode,
}

impl SubstitutionRule {
    /// Whether this rule fires for a leg of the given length
    pub fn is_violated_by(&self, distance_miles: f64) -> bool {
        match self.bound {
            Bound::Above => distance_miles > self.miles,
            Bound::Below => distance_miles < self.miles,
        }
    }

    /// Prompt/diagnostic rendering of the rule
    pub fn describe(&self) -> String {
        let cmp = match self.bound {
            Bound::Above => "over",
            Bound::Below => "under",
        };
        format!(
            "If the mode of transportation is {} and the distance is {} {} miles, the mode MUST be {}.",
            self.mode, cmp, self.miles, self.forced
        )
    }
}

/// The substitution table
pub const SUBSTITUTION_RULES: [SubstitutionRule; 4] = [
    SubstitutionRule {
        mode: TransportMode::Walking,
        bound: Bound::Above,
        miles: 1.5,
        forced: TransportMode::Bicycling,
    },
    SubstitutionRule {
        mode: TransportMode::Bicycling,
        bound: Bound::Above,
        miles: 3.0,
        forced: TransportMode::Driving,
    },
    SubstitutionRule {
        mode: TransportMode::Driving,
        bound: Bound::Above,
        miles: 800.0,
        forced: TransportMode::Flight,
    },
    SubstitutionRule {
        mode: TransportMode::Flight,
        bound: Bound::Below,
        miles: 400.0,
        forced: TransportMode::Driving,
    },
];

/// Find the rule (if any) that the assigned mode violates at this distance
pub fn violated_rule(mode: TransportMode, distance_miles: f64) -> Option<&'static SubstitutionRule> {
    SUBSTITUTION_RULES
        .iter()
        .find(|rule| rule.mode == mode && rule.is_violated_by(distance_miles))
}

/// Mode a leg must use once every applicable substitution has been applied
///
/// Returns `None` when `mode` is already valid for the distance. The table
/// cannot cycle (FLIGHT falls back below 400 miles, DRIVING escalates only
/// above 800), so the chain ends within one pass over the table.
pub fn required_mode(mode: TransportMode, distance_miles: f64) -> Option<TransportMode> {
    let mut current = mode;
    for _ in 0..SUBSTITUTION_RULES.len() {
        match violated_rule(current, distance_miles) {
            Some(rule) => current = rule.forced,
            None => break,
        }
    }
    (current != mode).then_some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_mode_chains_substitutions() {
        assert_eq!(
            required_mode(TransportMode::Walking, 40.0),
            Some(TransportMode::Driving)
        );
        assert_eq!(
            required_mode(TransportMode::Walking, 2.0),
            Some(TransportMode::Bicycling)
        );
        assert_eq!(
            required_mode(TransportMode::Bicycling, 2400.0),
            Some(TransportMode::Flight)
        );
        assert_eq!(required_mode(TransportMode::Driving, 40.0), None);
        assert_eq!(required_mode(TransportMode::Transit, 4000.0), None);
    }

    #[test]
    fn test_from_wire_exact_only() {
        assert_eq!(TransportMode::from_wire("DRIVING"), Some(TransportMode::Driving));
        assert_eq!(TransportMode::from_wire("TRANSIT"), Some(TransportMode::Transit));
        assert_eq!(TransportMode::from_wire("driving"), None);
        assert_eq!(TransportMode::from_wire("car"), None);
        assert_eq!(TransportMode::from_wire(""), None);
    }

    #[test]
    fn test_vocabulary_order() {
        assert_eq!(
            TransportMode::vocabulary(),
            "WALKING, BICYCLING, DRIVING, TRANSIT, FLIGHT"
        );
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert!(violated_rule(TransportMode::Walking, 1.5).is_none());
        assert!(violated_rule(TransportMode::Walking, 1.6).is_some());
        assert!(violated_rule(TransportMode::Bicycling, 3.0).is_none());
        assert!(violated_rule(TransportMode::Driving, 800.0).is_none());
        assert!(violated_rule(TransportMode::Flight, 400.0).is_none());
        assert!(violated_rule(TransportMode::Flight, 399.9).is_some());
    }

    #[test]
    fn test_forced_modes() {
        assert_eq!(
            violated_rule(TransportMode::Walking, 40.0).map(|r| r.forced),
            Some(TransportMode::Bicycling)
        );
        assert_eq!(
            violated_rule(TransportMode::Bicycling, 40.0).map(|r| r.forced),
            Some(TransportMode::Driving)
        );
        assert_eq!(
            violated_rule(TransportMode::Driving, 2400.0).map(|r| r.forced),
            Some(TransportMode::Flight)
        );
        assert_eq!(
            violated_rule(TransportMode::Flight, 40.0).map(|r| r.forced),
            Some(TransportMode::Driving)
        );
    }

    #[test]
    fn test_transit_never_substituted() {
        for miles in [0.1, 2.0, 40.0, 5000.0] {
            assert!(violated_rule(TransportMode::Transit, miles).is_none());
        }
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            SUBSTITUTION_RULES[0].describe(),
            "If the mode of transportation is WALKING and the distance is over 1.5 miles, the mode MUST be BICYCLING."
        );
        assert!(SUBSTITUTION_RULES[3].describe().contains("under 400 miles"));
    }
}
