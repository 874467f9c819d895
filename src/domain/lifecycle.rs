//! Request state machine for a single form session.
//!
//! `Idle → Submitting → Succeeded | Failed`, with `reset` returning to `Idle`
//! from anywhere. Each accepted submit gets a new [`Generation`]; resolutions
//! carrying any other generation are dropped, so a response that arrives after
//! a reset or a newer submit cannot overwrite the current state.

use std::fmt;

use tracing::debug;

use super::encoding::encode;
use super::entities::{PredictionRequest, PredictionResult};
use super::failure::PredictionFailure;
use super::form::{FormModel, ValidationReport};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestState {
    #[default]
    Idle,
    Submitting,
    Succeeded(PredictionResult),
    Failed(PredictionFailure),
}

impl RequestState {
    pub fn is_idle(&self) -> bool {
        matches!(self, RequestState::Idle)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, RequestState::Submitting)
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            RequestState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&PredictionFailure> {
        match self {
            RequestState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::Submitting => "submitting",
            RequestState::Succeeded(_) => "succeeded",
            RequestState::Failed(_) => "failed",
        }
    }
}

/// Handle for an accepted submit: the request to send and the generation its
/// resolution must carry.
#[derive(Clone, Debug, PartialEq)]
pub struct Ticket {
    pub generation: Generation,
    pub request: PredictionRequest,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    Started(Ticket),
    /// The form did not validate; state is unchanged.
    Rejected(ValidationReport),
    /// A request is already in flight; state is unchanged.
    Ignored,
}

#[derive(Debug, Default)]
pub struct RequestLifecycle {
    state: RequestState,
    generation: Generation,
}

impl RequestLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn submit(&mut self, form: &FormModel) -> SubmitOutcome {
        if self.state.is_submitting() {
            debug!(generation = %self.generation, "submit ignored while a request is in flight");
            return SubmitOutcome::Ignored;
        }

        let valid = match form.validated() {
            Ok(valid) => valid,
            Err(report) => {
                debug!(
                    violations = report.errors().len(),
                    state = self.state.name(),
                    "submit blocked by validation"
                );
                return SubmitOutcome::Rejected(report);
            }
        };

        self.generation = self.generation.next();
        self.state = RequestState::Submitting;
        debug!(generation = %self.generation, "request submitted");

        SubmitOutcome::Started(Ticket {
            generation: self.generation,
            request: encode(&valid),
        })
    }

    /// Applies a finished request. Returns `false` when the resolution was
    /// discarded because it does not belong to the current submit.
    pub fn resolve(
        &mut self,
        generation: Generation,
        outcome: Result<PredictionResult, PredictionFailure>,
    ) -> bool {
        if generation != self.generation || !self.state.is_submitting() {
            debug!(
                stale = %generation,
                current = %self.generation,
                state = self.state.name(),
                "discarding stale resolution"
            );
            return false;
        }

        self.state = match outcome {
            Ok(result) => RequestState::Succeeded(result),
            Err(reason) => RequestState::Failed(reason),
        };
        debug!(generation = %generation, state = self.state.name(), "request resolved");
        true
    }

    pub fn reset(&mut self) {
        self.generation = self.generation.next();
        self.state = RequestState::Idle;
    }
}
