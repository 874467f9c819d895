//! Form handling, feature encoding and the request state machine live here.

pub mod encoding;
pub mod entities;
pub mod failure;
pub mod form;
pub mod lifecycle;

pub use encoding::encode;
pub use entities::{
    ModelEstimate, PredictionRequest, PredictionResult, ProductForm, ServiceInfo,
    UnknownProductForm, DEFAULT_FRUITS,
};
pub use failure::PredictionFailure;
pub use form::{
    Field, FieldStatus, FormModel, FormValues, UnknownField, ValidForm, ValidationError,
    ValidationReport, Violation,
};
pub use lifecycle::{Generation, RequestLifecycle, RequestState, SubmitOutcome, Ticket};
