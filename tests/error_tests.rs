// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use geodesign_bridge::config::Config;
use geodesign_bridge::error::AppError;
use tower::ServiceExt;

mod common;

use common::{json_body, MockState, MockUpstream};

#[tokio::test]
async fn test_error_status_codes() {
    let cases = [
        (AppError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST, "bad_request"),
        (AppError::Geodesignhub("x".to_string()), StatusCode::BAD_GATEWAY, "geodesignhub_error"),
        (
            AppError::FeatureService("x".to_string()),
            StatusCode::BAD_GATEWAY,
            "feature_service_error",
        ),
        (AppError::ProjectNotReady("x".to_string()), StatusCode::CONFLICT, "project_not_ready"),
        (
            AppError::Internal(anyhow::anyhow!("secret detail")),
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
        ),
    ];

    for (err, status, code) in cases {
        let response = err.into_response();
        assert_eq!(response.status(), status);
        let body = json_body(response).await;
        assert_eq!(body["error"], code);
    }
}

#[tokio::test]
async fn test_internal_error_hides_details() {
    let response = AppError::Internal(anyhow::anyhow!("secret detail")).into_response();
    let body = json_body(response).await;
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_rejected_gdh_token_is_reported() {
    let upstream = MockUpstream::start(MockState::default()).await;
    let mut config = Config::test_default(&upstream.gdh_url());
    config.gdh_api_token = "wrong".to_string();
    let (app, _state) = common::create_test_app_with(config);

    let response = app
        .oneshot(Request::builder().uri("/api/teams").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains(AppError::GDH_TOKEN_ERROR));
}

#[tokio::test]
async fn test_unknown_gdh_project_is_reported() {
    let upstream = MockUpstream::start(MockState::default()).await;
    let mut config = Config::test_default(&upstream.gdh_url());
    config.gdh_project_id = "someone-elses".to_string();
    let (app, _state) = common::create_test_app_with(config);

    let response = app
        .oneshot(Request::builder().uri("/api/project").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains(AppError::GDH_PROJECT_ERROR));
}
