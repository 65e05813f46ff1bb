//! Constraint compiler
//!
//! Turns a normalized `TripRequest` into a `GenerationRequest`: the exact
//! text the generation service receives. Pure and deterministic; the same
//! trip and corrections always produce the same request.

mod prompts;

pub use prompts::{output_schema, system_prompt};

use crate::trip::TripRequest;

/// One compiled request for the generation service
///
/// Immutable once built. A retry compiles a new request from the same trip
/// with the accumulated corrective notes appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    system: String,
    prompt: String,
    corrective_notes: Vec<String>,
}

impl GenerationRequest {
    /// System message
    pub fn system(&self) -> &str {
        &self.system
    }

    /// User message (base prompt plus any corrective notes)
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Corrective notes carried by this request, oldest first
    pub fn corrective_notes(&self) -> &[String] {
        &self.corrective_notes
    }
}

/// Compile a trip into a generation request
///
/// `corrective_notes` describe earlier failed attempts; each becomes one
/// appended corrective clause.
pub fn compile(trip: &TripRequest, corrective_notes: &[String]) -> GenerationRequest {
    let mut prompt = base_prompt(trip);

    if !corrective_notes.is_empty() {
        prompt.push_str("\nCorrections (previous attempts were rejected):\n");
        for note in corrective_notes {
            prompt.push_str(&format!("- {}\n", note));
        }
    }

    GenerationRequest {
        system: system_prompt(),
        prompt,
        corrective_notes: corrective_notes.to_vec(),
    }
}

fn base_prompt(trip: &TripRequest) -> String {
    let prefs = trip.preferences();
    let dates = trip.travel_dates();
    let middles = if trip.middle_locations().is_empty() {
        "None".to_string()
    } else {
        trip.middle_locations().join(", ")
    };
    let additional = if trip.additional_requests().is_empty() {
        "None"
    } else {
        trip.additional_requests()
    };

    let mut prompt = String::from("Your task is to create a travel itinerary based on the following details:\n");
    prompt.push_str(&format!("- Starting Location: {}\n", trip.starting_location()));
    prompt.push_str(&format!("- Ending Location: {}\n", trip.ending_location()));
    prompt.push_str(&format!("- Middle Locations: {}\n", middles));
    prompt.push_str(&format!(
        "- Fixed Order for Middle Locations: {}\n",
        if trip.fix_order() { "Yes" } else { "No" }
    ));
    prompt.push_str(&format!(
        "- Travel Preferences: Carbon Emissions = {:.2}, Time = {:.2}, Cost = {:.2}\n",
        prefs.carbon_emissions, prefs.time, prefs.cost
    ));
    prompt.push_str(&format!("- Travel Dates: {} to {}\n", dates.start, dates.end));
    prompt.push_str(&format!("- Additional Requests: {}\n\n", additional));

    prompt.push_str(&render_location_list(trip));
    prompt.push('\n');

    prompt.push_str("Important Requirements:\n");
    let mut rules = vec![
        format!(
            "1. All {} locations listed above must appear in the route: exactly {} stops, one per list entry, none omitted and none added or repeated.",
            trip.stop_count(),
            trip.stop_count()
        ),
        prompts::vocabulary_rule(2),
        "3. Optimize the route for the specified preferences (carbon emissions, time, cost).".to_string(),
        ordering_rule(4, trip),
    ];
    rules.extend(prompts::output_rules(5));
    rules.extend(prompts::substitution_rules(5 + 4));

    for rule in rules {
        prompt.push_str(&rule);
        prompt.push('\n');
    }

    prompt
}

fn render_location_list(trip: &TripRequest) -> String {
    let locations = trip.locations();
    let last = locations.len() - 1;
    let middle_tag = if trip.fix_order() {
        "MIDDLE, keep this position"
    } else {
        "MIDDLE, may be reordered"
    };

    let mut out = format!("Locations ({} stops, in input order):\n", locations.len());
    for (i, location) in locations.iter().enumerate() {
        let tag = if i == 0 {
            "START, must be first"
        } else if i == last {
            "END, must be last"
        } else {
            middle_tag
        };
        out.push_str(&format!("{}. {} [{}]\n", i + 1, location, tag));
    }
    out
}

fn ordering_rule(index: usize, trip: &TripRequest) -> String {
    if trip.fix_order() {
        format!(
            "{}. Fixed order is ON: keep every location in exactly the input order listed above.",
            index
        )
    } else {
        format!(
            "{}. Fixed order is OFF: keep the starting location first and the ending location last; reorder the middle locations for optimal travel.",
            index
        )
    }
}
