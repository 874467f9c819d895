//! Thin asynchronous client for the fruit price prediction service.
//!
//! - `POST /predict` returns one estimate per model.
//! - `GET /fruits` and `GET /` expose the service's catalog and metadata.
//! - Every failure is classified into a [`PredictionFailure`]; nothing is retried.

use std::{collections::BTreeMap, future::Future, time::Duration};

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{PredictionFailure, PredictionRequest, PredictionResult, ServiceInfo};
use crate::infra::config::ClientConfig;

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Anything that can turn a [`PredictionRequest`] into model estimates.
pub trait Predictor: Send + Sync + 'static {
    fn predict(
        &self,
        request: &PredictionRequest,
    ) -> impl Future<Output = Result<PredictionResult, PredictionFailure>> + Send;
}

#[derive(Clone, Debug)]
pub struct PredictionClient {
    http: Client,
    base_url: Url,
    predict_url: Url,
    fruits_url: Url,
    timeout: Duration,
}

impl PredictionClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientBuildError> {
        let http = Client::builder().user_agent(config.user_agent()).build()?;
        let base_url = config.base_url().clone();
        Ok(Self {
            http,
            predict_url: base_url.join("predict")?,
            fruits_url: base_url.join("fruits")?,
            base_url,
            timeout: config.timeout(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictionFailure> {
        info!(fruit = %request.fruit, url = %self.predict_url, "requesting price predictions");

        let envelope: PredictEnvelope = self
            .fetch_json(self.http.post(self.predict_url.clone()).json(request))
            .await?;

        let Some(predictions) = envelope.predictions else {
            warn!("prediction response is missing `predictions`");
            return Err(PredictionFailure::InvalidResponse(
                "response missing predictions".into(),
            ));
        };

        let result = predictions.into_result(envelope.matched_fruit);
        debug!(
            random_forest = result.random_forest,
            decision_tree = result.decision_tree,
            linear_regression = ?result.linear_regression,
            "received predictions"
        );
        Ok(result)
    }

    /// Fruits the service's encoder knows about.
    pub async fn list_fruits(&self) -> Result<Vec<String>, PredictionFailure> {
        let fruits: FruitsDto = self
            .fetch_json(self.http.get(self.fruits_url.clone()))
            .await?;
        debug!(count = fruits.available_fruits.len(), "loaded fruit catalog");
        Ok(fruits.available_fruits)
    }

    pub async fn service_info(&self) -> Result<ServiceInfo, PredictionFailure> {
        let info: ServiceInfoDto = self.fetch_json(self.http.get(self.base_url.clone())).await?;
        Ok(ServiceInfo::from(info))
    }

    async fn fetch_json<T>(&self, builder: RequestBuilder) -> Result<T, PredictionFailure>
    where
        T: DeserializeOwned,
    {
        let response = builder
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| classify_transport(err, self.timeout))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| classify_transport(err, self.timeout))?;
        debug!(%status, bytes = body.len(), "prediction service responded");

        if !status.is_success() {
            return Err(classify_error_body(status, &body));
        }

        serde_json::from_slice(&body).map_err(|err| {
            warn!(error = %err, "failed to decode prediction service response");
            PredictionFailure::InvalidResponse(format!("failed to decode response: {err}"))
        })
    }
}

impl Predictor for PredictionClient {
    fn predict(
        &self,
        request: &PredictionRequest,
    ) -> impl Future<Output = Result<PredictionResult, PredictionFailure>> + Send {
        PredictionClient::predict(self, request)
    }
}

fn classify_transport(err: reqwest::Error, timeout: Duration) -> PredictionFailure {
    if err.is_timeout() {
        warn!(timeout_ms = timeout.as_millis() as u64, "prediction request timed out");
        PredictionFailure::Timeout
    } else {
        warn!(error = %err, "prediction request failed in transport");
        PredictionFailure::Network(err.to_string())
    }
}

/// Non-2xx responses: a service-provided message wins; otherwise the
/// presence of a body decides between an unexpected shape and a transport
/// problem.
fn classify_error_body(status: StatusCode, body: &[u8]) -> PredictionFailure {
    if let Some(message) = service_message(body) {
        warn!(%status, %message, "prediction service rejected the request");
        return PredictionFailure::ServiceError(message);
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        warn!(%status, "prediction service returned an empty error response");
        PredictionFailure::Network(format!("HTTP {status} with an empty body"))
    } else {
        warn!(%status, "prediction service returned an error without a message");
        PredictionFailure::InvalidResponse(format!("HTTP {status} without an error message"))
    }
}

fn service_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(message_from_value))
}

// FastAPI sends `detail` as a string for HTTPException and as a list of
// `{loc, msg, type}` objects for request validation errors.
fn message_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text.clone()),
                    Value::Object(_) => item
                        .get("msg")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    _ => None,
                })
                .filter(|part| !part.trim().is_empty())
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        Value::Object(_) => value
            .get("msg")
            .or_else(|| value.get("message"))
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct PredictEnvelope {
    #[serde(default)]
    predictions: Option<PredictionsDto>,
    #[serde(default)]
    matched_fruit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PredictionsDto {
    #[serde(rename = "RandomForest")]
    random_forest: f64,
    #[serde(rename = "DecisionTree")]
    decision_tree: f64,
    #[serde(rename = "LinearRegression", default)]
    linear_regression: Option<f64>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl PredictionsDto {
    /// Extra numeric entries are kept as further models; anything else is metadata.
    fn into_result(self, matched_fruit: Option<String>) -> PredictionResult {
        let other_models = self
            .extra
            .into_iter()
            .filter_map(|(model, value)| value.as_f64().map(|value| (model, value)))
            .collect();
        PredictionResult {
            random_forest: self.random_forest,
            decision_tree: self.decision_tree,
            linear_regression: self.linear_regression,
            other_models,
            matched_fruit,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FruitsDto {
    available_fruits: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceInfoDto {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    models: Vec<String>,
    #[serde(default)]
    fruits_endpoint: Option<String>,
}

impl From<ServiceInfoDto> for ServiceInfo {
    fn from(dto: ServiceInfoDto) -> Self {
        Self {
            message: dto.message.unwrap_or_default(),
            models: dto.models,
            fruits_endpoint: dto.fruits_endpoint,
        }
    }
}
