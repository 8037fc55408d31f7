// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geodesignhub design → GeoPlanner scenario export, end to end through the router.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

use common::{json_body, MockState, MockUpstream};

fn export_request(upstream: &MockUpstream) -> Request<Body> {
    let body = json!({
        "team_id": 7,
        "design_id": "syn-1",
        "feature_service_url": upstream.feature_service_url(),
        "scenario_id": "new-scn"
    });
    Request::builder()
        .method("POST")
        .uri("/api/export")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn rings() -> Value {
    json!({
        "rings": [[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]],
        "spatialReference": {"wkid": 4326}
    })
}

fn design() -> Value {
    json!({"features": [
        {
            "geometry": rings(),
            "attributes": {
                "description": "Forest A",
                "tag_codes": "3.1.12",
                "additional_metadata": {
                    "globalid": "{G-A}",
                    "name": "Forest A",
                    "ACTION_ID": "3.1.11",
                    "ACTION_IDS": "3.1.11",
                    "CO2": 4.2
                }
            }
        },
        {
            "geometry": rings(),
            "attributes": {
                "description": "Wetland",
                "tag_codes": "8.2.1",
                "start_date": "2030-01-01",
                "additional_metadata": "{\"globalid\": \"{G-W}\", \"name\": \"Wetland\", \"ACTION_ID\": \"8.2.1\", \"CO2\": 1.5}"
            }
        },
        {
            "geometry": {"paths": [[[0.0, 0.0], [1.0, 1.0]]]},
            "attributes": {"description": "Rail line", "tag_codes": "7.1.1"}
        },
        {
            "geometry": rings(),
            "attributes": {"description": "No tags at all"}
        },
        {
            "geometry": rings(),
            "attributes": {"description": "REJECT", "tag_codes": ["5.1.1"]}
        }
    ]})
}

#[tokio::test]
async fn test_export_maps_and_adds_features() {
    let upstream = MockUpstream::start(MockState {
        esri_design: design(),
        ..MockState::default()
    })
    .await;

    let mut config = geodesign_bridge::config::Config::test_default(&upstream.gdh_url());
    config.gpl.coefficient_fields = vec!["CO2".to_string()];
    let (app, state) = common::create_test_app_with(config);

    let response = app.oneshot(export_request(&upstream)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = json_body(response).await;

    assert_eq!(report["scenario_id"], "new-scn");
    assert_eq!(report["diagram_count"], 5);
    assert_eq!(report["diagrams_excluded"], 2);
    assert_eq!(report["added"]["object_ids"], json!([500, 501]));
    assert_eq!(report["added"]["failures"][0]["index"], 2);

    assert_eq!(
        upstream.state.requests(),
        vec!["GET esri team=7 design=syn-1", "POST applyEdits adds=3"]
    );

    let applied = upstream.state.applied.lock().unwrap().clone();
    let forest = &applied[0]["attributes"];
    assert_eq!(forest["name"], "[climate action changed]");
    assert_eq!(forest["SOURCE_ID"], "{G-A}");
    assert_eq!(forest["ACTION_ID"], "3.1.12");
    assert!(forest["CO2"].is_null());
    assert_eq!(forest["Geodesign_ProjectID"], "test-gpl-project");
    assert_eq!(forest["Geodesign_ScenarioID"], "new-scn");
    assert_eq!(forest["START_DATE"], 1_672_531_200_000_i64);
    assert_eq!(applied[0]["geometry"]["spatialReference"]["wkid"], 4326);

    let wetland = &applied[1]["attributes"];
    assert_eq!(wetland["name"], "Wetland");
    assert_eq!(wetland["SOURCE_ID"], "{G-W}");
    assert_eq!(wetland["CO2"], 1.5);
    assert_eq!(wetland["START_DATE"], 1_893_456_000_000_i64);

    let reported = report["messages"].as_array().unwrap();
    assert!(reported
        .iter()
        .any(|m| m["message"].as_str().unwrap().contains("No tags at all")));

    let messages = state.messages.entries();
    assert!(messages.iter().any(|m| m.message.contains("No tags at all")));
    assert!(!messages.iter().any(|m| m.message.contains("Rail line")));
    assert!(messages.iter().any(|m| m.message.contains("Rejected by test")));
}

#[tokio::test]
async fn test_export_of_empty_design_skips_apply_edits() {
    let upstream = MockUpstream::start(MockState::default()).await;
    let (app, _state) = common::create_test_app(&upstream);

    let response = app.oneshot(export_request(&upstream)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report = json_body(response).await;
    assert_eq!(report["diagram_count"], 0);
    assert!(upstream.state.requests_matching("POST").is_empty());
}
