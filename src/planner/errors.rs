//! Planner errors
//!
//! Per-attempt failures and the terminal error returned once the retry
//! budget is spent.

use std::fmt;

use crate::extract::ParseError;
use crate::gateway::GatewayError;
use crate::itinerary::ValidationError;

/// Why one attempt was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttemptFailure {
    #[error("{0}")]
    Gateway(#[from] GatewayError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{error}")]
    Validation {
        raw: String,
        #[source]
        error: ValidationError,
    },
}

impl AttemptFailure {
    /// Short category label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptFailure::Gateway(_) => "gateway",
            AttemptFailure::Parse(_) => "parse",
            AttemptFailure::Validation { .. } => "validation",
        }
    }

    /// Raw model text, when the service answered at all
    pub fn raw(&self) -> Option<&str> {
        match self {
            AttemptFailure::Gateway(_) => None,
            AttemptFailure::Parse(e) => Some(&e.raw),
            AttemptFailure::Validation { raw, .. } => Some(raw),
        }
    }

    /// Note to append to the next request
    ///
    /// Transport failures say nothing about the content, so they add none.
    pub fn corrective_note(&self) -> Option<String> {
        match self {
            AttemptFailure::Gateway(_) => None,
            AttemptFailure::Parse(e) => Some(format!(
                "previous output was not valid JSON ({}); return exactly one JSON object and nothing else, without code fences",
                e.message
            )),
            AttemptFailure::Validation { error, .. } => Some(error.corrective_note()),
        }
    }
}

/// One failed attempt
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    /// 1-based attempt number
    pub attempt: u32,
    pub failure: AttemptFailure,
}

impl AttemptRecord {
    pub fn raw(&self) -> Option<&str> {
        self.failure.raw()
    }
}

/// Retry budget exhausted
///
/// Carries every attempt, so the caller can see each raw response and the
/// reason it was rejected. `Display` gives a one-line summary without raw
/// model text.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalError {
    attempts: Vec<AttemptRecord>,
}

impl TerminalError {
    pub(crate) fn new(attempts: Vec<AttemptRecord>) -> Self {
        Self { attempts }
    }

    pub fn attempts(&self) -> &[AttemptRecord] {
        &self.attempts
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }

    /// Every raw response received, in attempt order
    pub fn raw_responses(&self) -> Vec<&str> {
        self.attempts.iter().filter_map(AttemptRecord::raw).collect()
    }

    /// Raw text of the most recent attempt that produced any
    pub fn last_raw_response(&self) -> Option<&str> {
        self.attempts.iter().rev().find_map(AttemptRecord::raw)
    }

    pub fn last_failure(&self) -> Option<&AttemptFailure> {
        self.attempts.last().map(|a| &a.failure)
    }
}

impl fmt::Display for TerminalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no valid itinerary after {} attempt(s)", self.attempts.len())?;
        if let Some(last) = self.last_failure() {
            write!(f, "; last {} failure: {}", last.kind(), last)?;
        }
        Ok(())
    }
}

impl std::error::Error for TerminalError {}

/// Outcome of a cancellable plan
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Terminal(#[from] TerminalError),

    #[error("planning cancelled")]
    Cancelled,
}
