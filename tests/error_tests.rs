// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http;
use thunderdome_client::error::ApiError;

fn response(status: u16, body: &'static str) -> reqwest::Response {
    reqwest::Response::from(
        http::Response::builder()
            .status(status)
            .body(body)
            .unwrap(),
    )
}

#[test]
fn test_status_error_uses_reason_phrase() {
    let err = ApiError::from_response(response(503, ""));
    assert_eq!(err.to_string(), "Service Unavailable");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(503));
    assert!(!err.is_unauthorized());
}

#[test]
fn test_unauthorized_detection() {
    let err = ApiError::from_response(response(401, r#"{"error":"REQUIRES_AUTH"}"#));
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Unauthorized");
    assert!(err.into_response().is_some());
}

#[test]
fn test_unknown_status_text() {
    let err = ApiError::from_response(response(599, ""));
    assert_eq!(err.to_string(), "Unknown Status");
}

#[test]
fn test_non_status_errors() {
    let err = ApiError::InvalidEndpoint {
        endpoint: "::".to_string(),
        reason: "relative URL without a base".to_string(),
    };
    assert_eq!(err.status(), None);
    assert!(!err.is_unauthorized());
    assert!(err.into_response().is_none());
}
