//! One form session: the form, its request state, and the single in-flight request.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::{
    domain::{
        Field, FormModel, FormValues, Generation, PredictionFailure, PredictionResult,
        RequestLifecycle, RequestState, SubmitOutcome, Ticket, ValidationReport,
    },
    infra::{PredictionClient, Predictor},
};

struct Resolution {
    generation: Generation,
    outcome: Result<PredictionResult, PredictionFailure>,
}

/// Drives [`RequestLifecycle`] with a real request on the tokio runtime.
///
/// `submit` spawns the request; `settle` waits for it and applies the
/// outcome; `reset` aborts it and returns to `Idle`.
pub struct PredictionSession<P: Predictor = PredictionClient> {
    form: FormModel,
    lifecycle: RequestLifecycle,
    predictor: Arc<P>,
    in_flight: Option<JoinHandle<Resolution>>,
}

impl<P: Predictor> PredictionSession<P> {
    pub fn new(predictor: P) -> Self {
        Self::with_form(predictor, FormModel::new())
    }

    pub fn with_form(predictor: P, form: FormModel) -> Self {
        Self {
            form,
            lifecycle: RequestLifecycle::new(),
            predictor: Arc::new(predictor),
            in_flight: None,
        }
    }

    pub fn form(&self) -> &FormModel {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormModel {
        &mut self.form
    }

    pub fn set_field(&mut self, field: Field, raw: impl Into<String>) {
        self.form.set_field(field, raw);
    }

    pub fn validate(&self) -> ValidationReport {
        self.form.validate()
    }

    pub fn state(&self) -> &RequestState {
        self.lifecycle.state()
    }

    /// Validates the form and, if accepted, starts the request.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self) -> SubmitOutcome {
        let outcome = self.lifecycle.submit(&self.form);
        if let SubmitOutcome::Started(ticket) = &outcome {
            info!(generation = %ticket.generation, fruit = %ticket.request.fruit, "prediction submitted");
            self.spawn_request(ticket.clone());
        }
        outcome
    }

    /// Waits for the in-flight request, if any, and returns the resulting state.
    pub async fn settle(&mut self) -> &RequestState {
        if let Some(handle) = self.in_flight.take() {
            match handle.await {
                Ok(resolution) => self.apply(resolution),
                Err(err) if err.is_cancelled() => {
                    debug!("in-flight request was cancelled");
                }
                Err(err) => {
                    error!(error = %err, "prediction task failed");
                    let generation = self.lifecycle.generation();
                    self.apply(Resolution {
                        generation,
                        outcome: Err(PredictionFailure::Network(format!(
                            "request task failed: {err}"
                        ))),
                    });
                }
            }
        }
        self.lifecycle.state()
    }

    /// Aborts the in-flight request, clears the result and restores the form defaults.
    pub fn reset(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
            debug!(generation = %self.lifecycle.generation(), "aborted in-flight request");
        }
        self.lifecycle.reset();
        self.form.reset(FormValues::default());
    }

    fn spawn_request(&mut self, ticket: Ticket) {
        let predictor = Arc::clone(&self.predictor);
        let Ticket {
            generation,
            request,
        } = ticket;

        if let Some(previous) = self.in_flight.replace(tokio::spawn(async move {
            let outcome = predictor.predict(&request).await;
            Resolution {
                generation,
                outcome,
            }
        })) {
            // Only a finished request can be left behind here; submit is
            // ignored while one is running.
            previous.abort();
        }
    }

    fn apply(&mut self, resolution: Resolution) {
        let Resolution {
            generation,
            outcome,
        } = resolution;
        if !self.lifecycle.resolve(generation, outcome) {
            debug!(generation = %generation, "dropped resolution for superseded request");
        }
    }
}
