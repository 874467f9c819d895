use thiserror::Error;

/// Why a prediction request did not produce a result.
///
/// Returned by the client and stored verbatim in the failed request state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PredictionFailure {
    #[error("no response from the prediction service within the timeout")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("service error: {0}")]
    ServiceError(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl PredictionFailure {
    /// Message suitable for showing to the person who submitted the form.
    pub fn user_message(&self) -> &str {
        match self {
            PredictionFailure::Timeout => {
                "The prediction service took too long to respond. Please try again."
            }
            PredictionFailure::Network(_) => {
                "Failed to reach the prediction service. Please try again."
            }
            PredictionFailure::ServiceError(message) => message,
            PredictionFailure::InvalidResponse(_) => {
                "The prediction service returned an unexpected response."
            }
        }
    }
}
