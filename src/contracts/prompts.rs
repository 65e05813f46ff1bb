//! Fixed prompt text
//!
//! The system message and the output schema the generation service must
//! return. Nothing here depends on the trip.

use crate::rules::{TransportMode, SUBSTITUTION_RULES};

/// System message sent with every generation request
pub fn system_prompt() -> String {
    "You are a helpful assistant for planning sustainable travel routes. \
You return machine-readable itineraries only, following the exact output format you are given."
        .to_string()
}

/// Exact output schema (canonical convention: flat ordered stop list)
pub fn output_schema() -> String {
    r#"{
  "stops": [
    { "location": "<Location Name>", "mode": "<Mode of Transport>" },
    ...
  ],
  "activities": {
    "<Middle or End Location>": "<Popular tourist destinations and activities>",
    ...
  }
}"#
    .to_string()
}

/// Rules about the output shape, numbered from `first`
pub fn output_rules(first: usize) -> Vec<String> {
    vec![
        format!(
            "{}. Return the result as JSON in exactly this format, with NO extra information, text or fields:\n\n{}\n",
            first,
            output_schema()
        ),
        format!(
            "{}. Each stop has exactly two fields, \"location\" and \"mode\". Copy every location name exactly as listed above.",
            first + 1
        ),
        format!(
            "{}. The \"mode\" of a stop is how the traveller leaves it for the next stop. The mode of the last stop must be an empty string (\"\").",
            first + 2
        ),
        format!(
            "{}. \"activities\" is optional; its keys must be location names from the list above and its values must be strings.",
            first + 3
        ),
    ]
}

/// Mode vocabulary rule
pub fn vocabulary_rule(index: usize) -> String {
    format!(
        "{}. Only use these modes of transportation, spelled exactly as shown: {}.",
        index,
        TransportMode::vocabulary()
    )
}

/// Substitution threshold rules, numbered from `first`
pub fn substitution_rules(first: usize) -> Vec<String> {
    SUBSTITUTION_RULES
        .iter()
        .enumerate()
        .map(|(i, rule)| format!("{}. {}", first + i, rule.describe()))
        .collect()
}
