//! Error Unit Tests

use std::time::Duration;

use axum::body::to_bytes;
use edge_guard::{EdgeGuardError, ErrorCode};
use http::StatusCode;
use uuid::Uuid;

#[tokio::test]
async fn test_error_response_body() {
    let correlation_id = Uuid::new_v4();
    let err = EdgeGuardError::Timeout {
        duration: Duration::from_secs(30),
    };
    let response = err.to_response(correlation_id);
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

    let body = to_bytes(response.into_body(), 4096).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "UPSTREAM_TIMEOUT");
    assert_eq!(json["correlation_id"], correlation_id.to_string());
}

#[test]
fn test_body_rejection_maps_to_payload_too_large() {
    let err = EdgeGuardError::BodyRejected {
        reason: "length limit exceeded".to_string(),
    };
    assert_eq!(err.code(), ErrorCode::BodyRejected);
    assert_eq!(err.code().http_status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[test]
fn test_config_error_maps_to_internal() {
    let err = EdgeGuardError::from(edge_guard::ConfigError::InvalidPort);
    assert_eq!(err.code(), ErrorCode::Internal);
    assert_eq!(err.code().as_str(), "INTERNAL_ERROR");
}
