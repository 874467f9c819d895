//! Client core for the fruit price prediction service.
//!
//! - [`domain`] holds the input form, its validation, the feature encoding and
//!   the request state machine. Nothing in it performs I/O.
//! - [`infra`] talks to the remote service.
//! - [`app::PredictionSession`] ties one form to one in-flight request.

pub mod app;
pub mod domain;
pub mod infra;
pub mod ui;
pub mod util;

pub use app::PredictionSession;
pub use domain::{
    encode, Field, FormModel, FormValues, PredictionFailure, PredictionRequest, PredictionResult,
    ProductForm, RequestLifecycle, RequestState, SubmitOutcome, ValidationReport, Violation,
};
pub use infra::{ClientConfig, ConfigError, PredictionClient, Predictor};
