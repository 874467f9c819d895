//! Outbound integrations: the prediction service client and its configuration.

pub mod config;
pub mod prediction;

pub use config::{ClientConfig, ConfigError, API_URL_ENV, DEFAULT_TIMEOUT, TIMEOUT_ENV};
pub use prediction::{ClientBuildError, PredictionClient, Predictor};
