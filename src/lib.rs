//! GreenRoute: contract layer for LLM-generated trip itineraries
//!
//! Turns a structured trip request into a constrained generation request,
//! sends it to an external model, and accepts the answer only if it is a
//! well-formed itinerary that honors the request and the transportation
//! rules. Rejected answers are retried with corrective notes, up to a
//! fixed budget.

pub mod config;
pub mod contracts;
pub mod distance;
pub mod extract;
pub mod gateway;
pub mod itinerary;
pub mod llm;
pub mod logging;
pub mod planner;
pub mod rules;
pub mod trip;

pub use config::{ConfigError, GreenRouteConfig};
pub use contracts::{compile, GenerationRequest};
pub use distance::{DistanceOracle, DistanceTable, NoDistanceData};
pub use extract::{extract, ParseError};
pub use gateway::{Gateway, GatewayError, RetryPolicy};
pub use itinerary::{validate_itinerary, Itinerary, Leg, ValidationError};
pub use llm::{AdapterError, LlmAdapter};
pub use planner::{AttemptFailure, AttemptRecord, PlanError, TerminalError, TripPlanner};
pub use rules::TransportMode;
pub use trip::{Preferences, RequestError, TripRequest, WireTripRequest};
