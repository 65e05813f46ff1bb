//! Preference normalizer
//!
//! Turns a possibly absent or partial preference mapping into a complete
//! set of carbon/time/cost weights. Always succeeds.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::warn;

pub const CARBON_KEY: &str = "carbon_emissions";
pub const TIME_KEY: &str = "time";
pub const COST_KEY: &str = "cost";

pub const DEFAULT_CARBON: f64 = 0.5;
pub const DEFAULT_TIME: f64 = 0.25;
pub const DEFAULT_COST: f64 = 0.25;

/// Tolerance for the sum-to-one convention
const SUM_TOLERANCE: f64 = 1e-6;

/// Normalized preference weights, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub carbon_emissions: f64,
    pub time: f64,
    pub cost: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            carbon_emissions: DEFAULT_CARBON,
            time: DEFAULT_TIME,
            cost: DEFAULT_COST,
        }
    }
}

impl Preferences {
    /// Normalize a raw preference mapping
    ///
    /// Missing, non-numeric or non-finite entries take the documented
    /// default for that key. Numeric strings are accepted. Values are
    /// clamped into [0, 1]. Weights that do not sum to 1 are only warned
    /// about.
    pub fn normalize(raw: Option<&Map<String, JsonValue>>) -> Self {
        let prefs = match raw {
            None => Preferences::default(),
            Some(map) => Preferences {
                carbon_emissions: weight(map, CARBON_KEY, DEFAULT_CARBON),
                time: weight(map, TIME_KEY, DEFAULT_TIME),
                cost: weight(map, COST_KEY, DEFAULT_COST),
            },
        };

        if !prefs.sums_to_one() {
            warn!(
                carbon = prefs.carbon_emissions,
                time = prefs.time,
                cost = prefs.cost,
                "preference weights do not sum to 1"
            );
        }

        prefs
    }

    pub fn sum(&self) -> f64 {
        self.carbon_emissions + self.time + self.cost
    }

    pub fn sums_to_one(&self) -> bool {
        (self.sum() - 1.0).abs() <= SUM_TOLERANCE
    }
}

fn weight(map: &Map<String, JsonValue>, key: &str, default: f64) -> f64 {
    let parsed = match map.get(key) {
        None | Some(JsonValue::Null) => return default,
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match parsed {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => {
            warn!(key, value = %map[key], "ignoring unusable preference weight");
            default
        }
    }
}
