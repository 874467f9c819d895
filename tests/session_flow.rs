//! Form session end to end: fill, submit, settle against a mock service.

use std::time::Duration;

use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use fruit_price_predictor::{
    ClientConfig, Field, PredictionClient, PredictionFailure, PredictionResult,
    PredictionSession, RequestState, SubmitOutcome, Violation,
};

async fn session_with(response: ResponseTemplate) -> (MockServer, PredictionSession) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(response)
        .mount(&server)
        .await;

    let config = ClientConfig::new(&server.uri())
        .unwrap()
        .with_timeout(Duration::from_millis(200));
    let session = PredictionSession::new(PredictionClient::new(&config).unwrap());
    (server, session)
}

fn fill_apples(session: &mut PredictionSession) {
    session.set_field(Field::Fruit, "Apples");
    session.set_field(Field::Form, "Fresh");
    session.set_field(Field::YieldFactor, "0.85");
    session.set_field(Field::CupEqSize, "1.5");
    session.set_field(Field::CupEqPrice, "2.5");
}

#[tokio::test]
async fn apples_prediction_reaches_succeeded() {
    let (_server, mut session) = session_with(ResponseTemplate::new(200).set_body_json(json!({
        "predictions": {
            "RandomForest": 1.23,
            "DecisionTree": 1.05,
            "LinearRegression": 1.10
        }
    })))
    .await;
    fill_apples(&mut session);

    assert!(matches!(session.submit(), SubmitOutcome::Started(_)));
    assert!(session.state().is_submitting());

    let expected = PredictionResult::new(1.23, 1.05).with_linear_regression(1.10);
    assert_eq!(session.settle().await, &RequestState::Succeeded(expected));
}

#[tokio::test]
async fn service_rejection_reaches_failed() {
    let (_server, mut session) = session_with(
        ResponseTemplate::new(422).set_body_json(json!({"detail": "cup_eq_price out of range"})),
    )
    .await;
    fill_apples(&mut session);

    session.submit();
    assert_eq!(
        session.settle().await,
        &RequestState::Failed(PredictionFailure::ServiceError(
            "cup_eq_price out of range".into()
        ))
    );
}

#[tokio::test]
async fn slow_service_reaches_failed_timeout() {
    let (_server, mut session) = session_with(
        ResponseTemplate::new(200)
            .set_body_json(json!({"predictions": {"RandomForest": 1.0, "DecisionTree": 1.0}}))
            .set_delay(Duration::from_secs(2)),
    )
    .await;
    fill_apples(&mut session);

    session.submit();
    assert_eq!(
        session.settle().await,
        &RequestState::Failed(PredictionFailure::Timeout)
    );
}

#[tokio::test]
async fn invalid_input_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let config = ClientConfig::new(&server.uri()).unwrap();
    let mut session = PredictionSession::new(PredictionClient::new(&config).unwrap());
    fill_apples(&mut session);
    session.set_field(Field::CupEqSize, "abc");

    let SubmitOutcome::Rejected(report) = session.submit() else {
        panic!("expected the form to be rejected");
    };
    assert_eq!(report.violation(Field::CupEqSize), Some(Violation::NotANumber));
    assert!(session.settle().await.is_idle());
}

#[tokio::test]
async fn reset_after_failure_returns_to_idle_with_defaults() {
    let (_server, mut session) = session_with(ResponseTemplate::new(500)).await;
    fill_apples(&mut session);
    session.set_field(Field::Fruit, "Bananas");

    session.submit();
    assert!(session.settle().await.failure().is_some());

    session.reset();
    assert!(session.state().is_idle());
    assert_eq!(session.form().values().get(Field::Fruit), "Apples");
    assert_eq!(session.form().values().get(Field::YieldFactor), "");
}
