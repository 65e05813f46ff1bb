//! Constraint compiler tests over fixture requests

use std::path::PathBuf;

use greenroute::contracts::output_schema;
use greenroute::{compile, TransportMode, TripRequest, WireTripRequest};

fn load_fixture(name: &str) -> String {
    let path = PathBuf::from("tests/fixtures").join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", path.display()))
}

fn load_request(name: &str) -> TripRequest {
    let wire: WireTripRequest = serde_json::from_str(&load_fixture(name)).unwrap();
    TripRequest::from_wire(wire).unwrap()
}

#[test]
fn test_prompt_lists_every_location_in_input_order() {
    let trip = load_request("loop_request.json");
    let prompt = compile(&trip, &[]).prompt().to_string();

    let positions: Vec<usize> = [
        "1. San Francisco, CA [START",
        "2. Oakland, CA [MIDDLE, may be reordered]",
        "3. Berkeley, CA [MIDDLE",
        "4. San Jose, CA [MIDDLE",
        "5. San Francisco, CA [END",
    ]
    .iter()
    .map(|needle| prompt.find(needle).unwrap_or_else(|| panic!("missing {}", needle)))
    .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_prompt_carries_rules_and_preferences() {
    let trip = load_request("loop_request.json");
    let request = compile(&trip, &[]);
    let prompt = request.prompt();

    assert!(prompt.contains(&TransportMode::vocabulary()));
    assert!(prompt.contains("Carbon Emissions = 0.60"));
    assert!(prompt.contains("Travel Dates: 2025-03-14 to 2025-03-20"));
    assert!(prompt.contains("Prefer public transit where possible"));
    assert!(prompt.contains("Fixed order is OFF"));
    assert!(prompt.contains("over 1.5 miles, the mode MUST be BICYCLING"));
    assert!(prompt.contains("under 400 miles, the mode MUST be DRIVING"));
    assert!(prompt.contains(&output_schema()));
}

#[test]
fn test_fixed_order_wording() {
    let trip = load_request("irvine_la_request.json");
    let prompt = compile(&trip, &[]).prompt().to_string();
    assert!(prompt.contains("Fixed order is ON"));
    assert!(prompt.contains("exactly 2 stops"));
}

#[test]
fn test_same_input_same_request() {
    let trip = load_request("irvine_la_request.json");
    let notes = vec!["previous output used mode 'car' at stop 1".to_string()];
    assert_eq!(compile(&trip, &notes), compile(&trip, &notes));
}

#[test]
fn test_notes_only_append() {
    let trip = load_request("irvine_la_request.json");
    let first = compile(&trip, &[]);
    let notes = vec![
        "first correction".to_string(),
        "second correction".to_string(),
    ];
    let retry = compile(&trip, &notes);

    assert!(retry.prompt().starts_with(first.prompt()));
    let tail = &retry.prompt()[first.prompt().len()..];
    assert!(tail.find("first correction").unwrap() < tail.find("second correction").unwrap());
    assert_eq!(retry.corrective_notes(), notes.as_slice());
}
