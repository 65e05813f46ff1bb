//! Trip planner
//!
//! Drives one trip request through compile, generate, extract and validate,
//! retrying with corrective notes until an itinerary is accepted or the
//! retry budget is spent. Each call owns its own attempt state; a planner
//! can serve concurrent requests.

mod errors;

use std::fmt;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, trace, warn, Instrument};
use uuid::Uuid;

use crate::config::GreenRouteConfig;
use crate::contracts::{self, GenerationRequest};
use crate::distance::{DistanceOracle, DistanceTable};
use crate::extract::extract;
use crate::gateway::{Gateway, RetryPolicy};
use crate::itinerary::{validate_itinerary, Itinerary};
use crate::llm::{create_adapter, Adapter, AdapterError, LlmAdapter};
use crate::trip::TripRequest;

pub use errors::{AttemptFailure, AttemptRecord, PlanError, TerminalError};

/// Default number of retries after the first attempt
pub const DEFAULT_RETRY_BUDGET: u32 = 2;

/// Attempt lifecycle, logged at debug level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerState {
    Compiling,
    Generating,
    Extracting,
    Validating,
    Accepted,
    Retrying,
    Failed,
}

impl PlannerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlannerState::Compiling => "compiling",
            PlannerState::Generating => "generating",
            PlannerState::Extracting => "extracting",
            PlannerState::Validating => "validating",
            PlannerState::Accepted => "accepted",
            PlannerState::Retrying => "retrying",
            PlannerState::Failed => "failed",
        }
    }
}

impl fmt::Display for PlannerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn transition(attempt: u32, state: PlannerState) {
    debug!(attempt, state = %state, "planner state");
}

/// Orchestrator for trip planning
#[derive(Debug)]
pub struct TripPlanner<A, D = DistanceTable> {
    gateway: Gateway<A>,
    distances: D,
    retry_budget: u32,
}

impl TripPlanner<Adapter, DistanceTable> {
    /// Wire adapter, gateway policy, distance table and budget from config
    pub fn from_config(config: &GreenRouteConfig) -> Result<Self, AdapterError> {
        let adapter = create_adapter(&config.llm, &config.gateway)?;
        let gateway = Gateway::new(adapter, RetryPolicy::from(&config.gateway));
        let distances = DistanceTable::from_config(&config.distances);
        if distances.is_empty() {
            info!("no distance data configured, substitution thresholds will not be checked");
        }
        Ok(Self::new(gateway, distances, config.planner.retry_budget))
    }
}

impl<A: LlmAdapter, D: DistanceOracle> TripPlanner<A, D> {
    pub fn new(gateway: Gateway<A>, distances: D, retry_budget: u32) -> Self {
        Self {
            gateway,
            distances,
            retry_budget,
        }
    }

    pub fn gateway(&self) -> &Gateway<A> {
        &self.gateway
    }

    pub fn distances(&self) -> &D {
        &self.distances
    }

    pub fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    /// Total attempts: the first plus the retry budget
    pub fn max_attempts(&self) -> u32 {
        self.retry_budget.saturating_add(1)
    }

    /// Plan a trip
    ///
    /// Returns the first itinerary that passes validation, or a
    /// `TerminalError` carrying every attempt once the budget is spent.
    /// Dropping the future abandons the plan; nothing is left running.
    pub async fn plan_trip(&self, trip: &TripRequest) -> Result<Itinerary, TerminalError> {
        let span = info_span!(
            "plan_trip",
            trip_id = %Uuid::new_v4(),
            stops = trip.stop_count(),
            fix_order = trip.fix_order()
        );
        self.run(trip).instrument(span).await
    }

    /// Plan a trip, giving up as soon as `cancel` fires
    pub async fn plan_trip_with_cancel(
        &self,
        trip: &TripRequest,
        cancel: &CancellationToken,
    ) -> Result<Itinerary, PlanError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("trip planning cancelled");
                Err(PlanError::Cancelled)
            }
            result = self.plan_trip(trip) => result.map_err(PlanError::from),
        }
    }

    async fn run(&self, trip: &TripRequest) -> Result<Itinerary, TerminalError> {
        let max_attempts = self.max_attempts();
        let mut notes: Vec<String> = Vec::new();
        let mut failures = Vec::new();

        for attempt in 1..=max_attempts {
            transition(attempt, PlannerState::Compiling);
            let request = contracts::compile(trip, &notes);

            match self.attempt(attempt, &request, trip).await {
                Ok(itinerary) => {
                    transition(attempt, PlannerState::Accepted);
                    info!(attempt, stops = itinerary.len(), "itinerary accepted");
                    return Ok(itinerary);
                }
                Err(failure) => {
                    warn!(
                        attempt,
                        max_attempts,
                        kind = failure.kind(),
                        error = %failure,
                        "attempt rejected"
                    );
                    if let Some(note) = failure.corrective_note() {
                        if !notes.contains(&note) {
                            notes.push(note);
                        }
                    }
                    failures.push(AttemptRecord { attempt, failure });
                    if attempt < max_attempts {
                        transition(attempt, PlannerState::Retrying);
                    }
                }
            }
        }

        transition(max_attempts, PlannerState::Failed);
        warn!(attempts = failures.len(), "retry budget exhausted");
        Err(TerminalError::new(failures))
    }

    async fn attempt(
        &self,
        attempt: u32,
        request: &GenerationRequest,
        trip: &TripRequest,
    ) -> Result<Itinerary, AttemptFailure> {
        transition(attempt, PlannerState::Generating);
        let raw = self.gateway.generate(request).await?;
        trace!(attempt, raw = %raw, "raw generation output");

        transition(attempt, PlannerState::Extracting);
        let parsed = extract(&raw)?;

        transition(attempt, PlannerState::Validating);
        validate_itinerary(&parsed, trip, &self.distances)
            .map_err(|error| AttemptFailure::Validation { raw, error })
    }
}
