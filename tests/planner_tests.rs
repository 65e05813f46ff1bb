//! End-to-end planner tests
//!
//! Drive `TripPlanner` through stub adapters and the OpenAI adapter over a
//! fake transport. No live network calls.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use greenroute::llm::openai::OpenAiAdapter;
use greenroute::llm::{FakeTransport, GenerationParams, StubAdapter, Transport};
use greenroute::{
    AdapterError, AttemptFailure, DistanceTable, Gateway, GenerationRequest, GreenRouteConfig,
    LlmAdapter, NoDistanceData, PlanError, RetryPolicy, TransportMode, TripPlanner, TripRequest,
    ValidationError, WireTripRequest,
};

fn load_fixture(name: &str) -> String {
    let path = PathBuf::from("tests/fixtures").join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", path.display()))
}

fn load_request(name: &str) -> TripRequest {
    let wire: WireTripRequest = serde_json::from_str(&load_fixture(name)).unwrap();
    TripRequest::from_wire(wire).unwrap()
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 1,
        backoff: Duration::ZERO,
        call_timeout: Duration::from_secs(5),
    }
}

fn stub_planner(stub: StubAdapter, retry_budget: u32) -> TripPlanner<StubAdapter, DistanceTable> {
    TripPlanner::new(
        Gateway::new(stub, fast_policy()),
        DistanceTable::new().with_leg("Irvine, CA", "Los Angeles, CA", 40.0),
        retry_budget,
    )
}

#[tokio::test]
async fn test_irvine_to_la_single_attempt() {
    let trip = load_request("irvine_la_request.json");
    let planner = stub_planner(StubAdapter::with_response(load_fixture("irvine_la_driving.txt")), 2);

    let itinerary = planner.plan_trip(&trip).await.unwrap();

    assert_eq!(itinerary.locations(), vec!["Irvine, CA", "Los Angeles, CA"]);
    assert_eq!(itinerary.legs()[0].mode, Some(TransportMode::Driving));
    assert_eq!(itinerary.legs()[1].mode, None);
    assert_eq!(planner.gateway().adapter().call_count(), 1);
}

#[tokio::test]
async fn test_not_json_twice_exhausts_budget_of_one() {
    let trip = load_request("irvine_la_request.json");
    let planner = stub_planner(StubAdapter::with_response("not json"), 1);

    let err = planner.plan_trip(&trip).await.unwrap_err();

    assert_eq!(err.attempt_count(), 2);
    assert_eq!(err.raw_responses(), vec!["not json", "not json"]);
    assert!(err
        .attempts()
        .iter()
        .all(|a| matches!(a.failure, AttemptFailure::Parse(_))));
    assert_eq!(planner.gateway().adapter().call_count(), 2);

    let requests = planner.gateway().adapter().requests();
    assert!(requests[0].corrective_notes().is_empty());
    assert_eq!(requests[1].corrective_notes().len(), 1);
    assert!(requests[1].corrective_notes()[0].contains("not valid JSON"));
    assert!(requests[1].prompt().contains("not valid JSON"));
}

#[tokio::test]
async fn test_invalid_mode_retried_with_note() {
    let trip = load_request("irvine_la_request.json");
    let stub = StubAdapter::with_responses([
        load_fixture("irvine_la_car.txt"),
        load_fixture("irvine_la_transit.txt"),
    ]);
    let planner = stub_planner(stub, 2);

    let itinerary = planner.plan_trip(&trip).await.unwrap();
    assert_eq!(itinerary.legs()[0].mode, Some(TransportMode::Transit));

    let requests = planner.gateway().adapter().requests();
    assert_eq!(requests.len(), 2);
    let retry = &requests[1];
    assert!(retry.corrective_notes()[0].contains("'car'"));
    assert!(retry.prompt().contains("'car'"));
    assert!(retry.prompt().starts_with(requests[0].prompt()));
    assert_eq!(retry.system(), requests[0].system());
}

#[tokio::test]
async fn test_threshold_violation_retried() {
    let trip = load_request("irvine_la_request.json");
    let stub = StubAdapter::with_responses([
        load_fixture("irvine_la_bicycling.txt"),
        load_fixture("irvine_la_driving.txt"),
    ]);
    let planner = stub_planner(stub, 1);

    planner.plan_trip(&trip).await.unwrap();
    let requests = planner.gateway().adapter().requests();
    assert!(requests[1].corrective_notes()[0].contains("requires DRIVING"));
}

#[tokio::test]
async fn test_always_invalid_calls_exactly_budget_plus_one() {
    let trip = load_request("irvine_la_request.json");
    let planner = stub_planner(StubAdapter::with_response(load_fixture("irvine_la_car.txt")), 3);

    let err = planner.plan_trip(&trip).await.unwrap_err();

    assert_eq!(planner.gateway().adapter().call_count(), 4);
    assert_eq!(err.attempt_count(), 4);
    let numbers: Vec<u32> = err.attempts().iter().map(|a| a.attempt).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
    assert!(matches!(
        err.last_failure(),
        Some(AttemptFailure::Validation {
            error: ValidationError::UnknownMode { .. },
            ..
        })
    ));
}

#[tokio::test]
async fn test_unfixed_loop_accepts_permutation() {
    let trip = load_request("loop_request.json");
    let planner = TripPlanner::new(
        Gateway::new(
            StubAdapter::with_responses([
                load_fixture("loop_missing_stop.txt"),
                load_fixture("loop_reordered.txt"),
            ]),
            fast_policy(),
        ),
        NoDistanceData,
        2,
    );

    let itinerary = planner.plan_trip(&trip).await.unwrap();
    assert_eq!(itinerary.len(), 5);
    assert_eq!(itinerary.locations()[1], "San Jose, CA");

    let requests = planner.gateway().adapter().requests();
    assert!(requests[1].corrective_notes()[0].contains("San Jose, CA"));
}

#[tokio::test]
async fn test_transport_retries_stay_inside_one_attempt() {
    let trip = load_request("irvine_la_request.json");
    let stub = StubAdapter::scripted(vec![
        Err(AdapterError::Network("connection reset".to_string())),
        Err(AdapterError::RateLimited {
            retry_after: String::new(),
        }),
        Ok(load_fixture("irvine_la_driving.txt")),
    ]);
    let policy = RetryPolicy {
        max_attempts: 3,
        backoff: Duration::ZERO,
        call_timeout: Duration::from_secs(5),
    };
    let planner = TripPlanner::new(Gateway::new(stub, policy), NoDistanceData, 0);

    planner.plan_trip(&trip).await.unwrap();
    assert_eq!(planner.gateway().adapter().call_count(), 3);
}

#[tokio::test]
async fn test_openai_adapter_over_fake_transport() {
    let trip = load_request("irvine_la_request.json");
    let adapter = OpenAiAdapter::with_transport(
        "https://api.openai.com/v1".to_string(),
        "gpt-4o".to_string(),
        "sk-test".to_string(),
        GenerationParams::default(),
        Transport::Fake(FakeTransport::new(&load_fixture("openai_chat_completion.json"))),
    );
    let planner = TripPlanner::new(
        Gateway::new(adapter, fast_policy()),
        DistanceTable::new().with_leg("Irvine, CA", "Los Angeles, CA", 40.0),
        2,
    );

    let itinerary = planner.plan_trip(&trip).await.unwrap();
    assert_eq!(itinerary.legs()[0].mode, Some(TransportMode::Driving));

    let Transport::Fake(fake) = planner.gateway().adapter().transport() else {
        panic!("expected fake transport");
    };
    let bodies = fake.requests();
    assert_eq!(bodies.len(), 1);
    let body: serde_json::Value = serde_json::from_str(&bodies[0]).unwrap();
    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(body["messages"][1]["content"]
        .as_str()
        .unwrap()
        .contains("Irvine, CA"));
}

#[tokio::test]
async fn test_authentication_failure_is_reported() {
    let trip = load_request("irvine_la_request.json");
    let adapter = OpenAiAdapter::with_transport(
        "https://api.openai.com/v1".to_string(),
        "gpt-4o".to_string(),
        "sk-bad".to_string(),
        GenerationParams::default(),
        Transport::Fake(FakeTransport::scripted(vec![Err(
            AdapterError::Authentication("invalid api key".to_string()),
        )])),
    );
    let planner = TripPlanner::new(Gateway::new(adapter, fast_policy()), NoDistanceData, 1);

    let err = planner.plan_trip(&trip).await.unwrap_err();
    assert_eq!(err.attempt_count(), 2);
    assert!(err.raw_responses().is_empty());
    assert!(matches!(err.last_failure(), Some(AttemptFailure::Gateway(_))));
    assert!(err.to_string().contains("gateway"));
}

#[tokio::test]
async fn test_planner_from_config_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("greenroute.toml");
    std::fs::write(&path, load_fixture("greenroute.toml")).unwrap();

    let config = GreenRouteConfig::load(&path).unwrap();
    let planner = TripPlanner::from_config(&config).unwrap();
    assert_eq!(planner.max_attempts(), 2);

    let itinerary = planner
        .plan_trip(&load_request("irvine_la_request.json"))
        .await
        .unwrap();
    assert_eq!(itinerary.len(), 2);
}

#[tokio::test]
async fn test_concurrent_plans_share_one_planner() {
    let planner = Arc::new(stub_planner(
        StubAdapter::with_response(load_fixture("irvine_la_driving.txt")),
        0,
    ));
    let trip = load_request("irvine_la_request.json");

    let mut handles = Vec::new();
    for _ in 0..4 {
        let planner = Arc::clone(&planner);
        let trip = trip.clone();
        handles.push(tokio::spawn(async move { planner.plan_trip(&trip).await }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(planner.gateway().adapter().call_count(), 4);
}

/// Adapter that never answers within the test
struct HangingAdapter;

#[async_trait]
impl LlmAdapter for HangingAdapter {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, AdapterError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(String::new())
    }

    fn provider_name(&self) -> &str {
        "hanging"
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_waiting_for_model() {
    let trip = load_request("irvine_la_request.json");
    let policy = RetryPolicy {
        max_attempts: 1,
        backoff: Duration::ZERO,
        call_timeout: Duration::from_secs(7200),
    };
    let planner = TripPlanner::new(Gateway::new(HangingAdapter, policy), NoDistanceData, 2);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let err = planner.plan_trip_with_cancel(&trip, &cancel).await.unwrap_err();
    assert_eq!(err, PlanError::Cancelled);
}
