mod common;

use common::*;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{method, path},
};

fn selected_session() -> SubmissionSession {
    let mut session = SubmissionSession::new();
    session.select(photo_candidate()).expect("photo is valid");
    assert_eq!(session.kind(), StateKind::Selected);
    session
}

#[tokio::test]
async fn test_two_products_land_in_success() -> anyhow::Result<()> {
    let (server, client) = start_backend().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/vision/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(TWO_PRODUCTS, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = selected_session();
    let state = session.submit_with(&client).await;

    assert_eq!(state, Some(StateKind::Success));
    let result = session.result().expect("success carries a result");
    assert_eq!(result.item_count, 2);
    let labels: Vec<_> = result.items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, vec!["Cola 330ml", "Crisps"]);
    let confidences: Vec<_> = result.items.iter().map(|item| item.confidence).collect();
    assert_eq!(confidences, vec![0.9, 0.4]);
    assert_eq!(session.pending_image().map(|image| image.name()), Some("photo.png"));
    Ok(())
}

#[tokio::test]
async fn test_no_products_land_in_empty() -> anyhow::Result<()> {
    let service = ScriptedService::succeeding(NO_PRODUCTS);
    let mut session = selected_session();

    let state = session.submit_with(&service).await;

    assert_eq!(state, Some(StateKind::Empty));
    assert!(session.error_message().is_none());
    let result = session.result().expect("empty carries a result");
    assert!(result.succeeded);
    assert_eq!(result.item_count, 0);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_lands_in_error() -> anyhow::Result<()> {
    let client = unreachable_client();
    let mut session = selected_session();

    let state = session.submit_with(&client).await;

    assert_eq!(state, Some(StateKind::Error));
    assert!(session.result().is_none());
    let message = session.error_message().expect("error carries a message");
    assert!(message.contains("Unable to connect"));
    Ok(())
}

#[tokio::test]
async fn test_reported_failure_lands_in_error() -> anyhow::Result<()> {
    let service = ScriptedService::succeeding(r#"{"success": false, "error": "Model not loaded"}"#);
    let mut session = selected_session();

    session.submit_with(&service).await;

    assert_eq!(session.kind(), StateKind::Error);
    assert_eq!(session.error_message(), Some("Model not loaded"));
    Ok(())
}

#[test]
fn test_pdf_is_rejected_and_state_stays_idle() {
    let mut session = SubmissionSession::new();

    let err = session.select(pdf_candidate()).unwrap_err();

    assert!(matches!(err, SelectError::Invalid(ValidationError::NotAnImage { .. })));
    assert_eq!(session.kind(), StateKind::Idle);
    assert!(session.pending_image().is_none());
    assert_eq!(session.notice(), Some("Please select a valid image file."));

    // The user can still pick another file.
    session.select(photo_candidate()).expect("photo is valid");
    assert_eq!(session.kind(), StateKind::Selected);
    assert!(session.notice().is_none());
}

#[tokio::test]
async fn test_second_submit_while_submitting_is_ignored() -> anyhow::Result<()> {
    let service = ScriptedService::succeeding(TWO_PRODUCTS);
    let mut session = selected_session();

    let submission = session.begin_submit().expect("first submit starts");
    assert_eq!(session.kind(), StateKind::Submitting);
    assert!(session.begin_submit().is_none());
    assert_eq!(session.submit_with(&service).await, None);

    let outcome = submission.run(&service).await;
    assert_eq!(service.calls(), 1);
    assert_eq!(session.resolve(submission, outcome), StateKind::Success);
    Ok(())
}

#[tokio::test]
async fn test_stale_submission_is_discarded() -> anyhow::Result<()> {
    let service = ScriptedService::failing(TransportFailure::http_status(503));
    let mut session = selected_session();

    let first = session.begin_submit().expect("submit starts");
    let outcome = first.run(&service).await;
    session.resolve(first.clone(), outcome.clone());
    assert_eq!(session.kind(), StateKind::Error);

    // Landing the same ticket twice changes nothing.
    session.reset();
    assert_eq!(session.resolve(first, outcome), StateKind::Idle);
    Ok(())
}

#[test]
fn test_select_then_reset_returns_to_idle() {
    let mut session = selected_session();
    session.reset();
    assert_eq!(session.kind(), StateKind::Idle);
    assert!(session.pending_image().is_none());
}

#[tokio::test]
async fn test_reset_is_idempotent() -> anyhow::Result<()> {
    let service = ScriptedService::succeeding(TWO_PRODUCTS);
    let mut session = selected_session();
    session.submit_with(&service).await;
    assert_eq!(session.kind(), StateKind::Success);

    session.reset();
    let once = session.state().clone();
    session.reset();
    assert_eq!(session.state(), &once);
    assert_eq!(once, SubmissionState::Idle);
    Ok(())
}

#[test]
fn test_reset_is_ignored_while_submitting() {
    let mut session = selected_session();
    let _submission = session.begin_submit().expect("submit starts");

    session.reset();
    assert_eq!(session.kind(), StateKind::Submitting);
}

#[tokio::test]
async fn test_select_after_result_requires_reset() -> anyhow::Result<()> {
    let service = ScriptedService::succeeding(NO_PRODUCTS);
    let mut session = selected_session();
    session.submit_with(&service).await;

    let err = session.select(photo_candidate()).unwrap_err();
    assert_eq!(err, SelectError::Busy(StateKind::Empty));

    session.reset();
    session.select(photo_candidate()).expect("photo is valid");
    assert_eq!(session.kind(), StateKind::Selected);
    Ok(())
}

#[tokio::test]
async fn test_submit_from_idle_does_nothing() -> anyhow::Result<()> {
    let service = ScriptedService::succeeding(TWO_PRODUCTS);
    let mut session = SubmissionSession::new();

    assert_eq!(session.submit_with(&service).await, None);
    assert_eq!(service.calls(), 0);
    assert_eq!(session.kind(), StateKind::Idle);
    Ok(())
}

#[tokio::test]
async fn test_off_type_fields_still_land_in_success() -> anyhow::Result<()> {
    let (server, client) = start_backend().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/vision/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"success": true,
                "detected_products": [
                    {"product_id": "A1", "detected_count": -1, "confidence_score": 0.8,
                     "message": "Water 1L", "bbox": [1, 2, 3]},
                    {"product_id": 2, "detected_count": 2.0, "message": "Juice"}
                ],
                "total_products_detected": 3.0}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let mut session = selected_session();
    let state = session.submit_with(&client).await;

    assert_eq!(state, Some(StateKind::Success), "{:?}", session.error_message());
    let result = session.result().expect("success carries a result");
    assert_eq!(result.item_count, 2);
    assert_eq!(result.reported_total, Some(3));
    assert_eq!(result.items[0].id, 1);
    assert_eq!(result.items[0].count, 1);
    assert_eq!(result.items[1].count, 2);
    Ok(())
}
