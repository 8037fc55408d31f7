// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process stand-ins for the ArcGIS feature service and the Geodesignhub
//! API, served by axum on an ephemeral local port.

use axum::extract::{Form, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use geodesign_bridge::config::Config;
use geodesign_bridge::routes::create_router;
use geodesign_bridge::AppState;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub const GDH_TOKEN: &str = "test_gdh_token";
pub const GDH_PROJECT: &str = "test-gdh-project";

/// What the mock upstream serves, and what it was asked.
pub struct MockState {
    /// GeoJSON features served by the actions layer, in order.
    pub features: Vec<Value>,
    /// Server-side page cap for feature queries.
    pub page_size: usize,
    /// Reported instead of `features.len()` when set.
    pub count_override: Option<u64>,
    /// ArcGIS error object returned (with HTTP 200) by every query.
    pub arcgis_error: Option<Value>,
    pub external_connection: String,
    pub systems: Vec<Value>,
    pub teams: Value,
    pub designs: Value,
    pub esri_design: Value,
    /// Diagram whose property update answers HTTP 500.
    pub fail_update_for: Option<u64>,
    pub next_diagram_id: AtomicU64,
    /// `METHOD path [detail]` for every request, in arrival order.
    pub requests: Mutex<Vec<String>>,
    /// Bodies of diagram create calls, in arrival order.
    pub creates: Mutex<Vec<Value>>,
    /// Bodies of property updates keyed by diagram ID.
    pub updates: Mutex<Vec<(u64, Value)>>,
    /// Features received by `applyEdits`.
    pub applied: Mutex<Vec<Value>>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            features: Vec::new(),
            page_size: 10,
            count_override: None,
            arcgis_error: None,
            external_connection: "esri".to_string(),
            systems: expected_systems(),
            teams: json!([{"id": 7, "title": "Climate team"}]),
            designs: json!({"synthesis": [{"id": "syn-1", "description": "Negotiated 1"}]}),
            esri_design: json!([]),
            fail_update_for: None,
            next_diagram_id: AtomicU64::new(1000),
            requests: Mutex::new(Vec::new()),
            creates: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
            applied: Mutex::new(Vec::new()),
        }
    }
}

impl MockState {
    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn requests_matching(&self, prefix: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.starts_with(prefix))
            .collect()
    }

    fn record(&self, entry: String) {
        self.requests.lock().unwrap().push(entry);
    }
}

/// The eight systems a correctly configured project has, IDs 11..=18.
pub fn expected_systems() -> Vec<Value> {
    [
        ("ENE", "#AB507E"),
        ("AG", "#D9CD91"),
        ("FOR", "#80BD75"),
        ("OCN", "#8CCDD1"),
        ("STL", "#E6564E"),
        ("IND", "#916DA3"),
        ("TRAN", "#706666"),
        ("WAT", "#6B9CB0"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (name, color))| json!({"id": 11 + i, "sysname": name, "syscolor": color}))
    .collect()
}

/// A unit-square polygon feature with the given properties.
#[allow(dead_code)]
pub fn polygon_feature(properties: Value) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
        },
        "properties": properties
    })
}

/// Running mock upstream.
pub struct MockUpstream {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockUpstream {
    pub async fn start(state: MockState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/arcgis/FeatureServer/0/query", get(layer_query))
            .route("/arcgis/FeatureServer/0/applyEdits", post(apply_edits))
            .route("/gdh/projects/{project}/", get(gdh_project))
            .route("/gdh/projects/{project}/systems/", get(gdh_systems))
            .route("/gdh/projects/{project}/cteams/", get(gdh_teams))
            .route("/gdh/projects/{project}/cteams/{team}/", get(gdh_designs))
            .route(
                "/gdh/projects/{project}/cteams/{team}/{design}/esri/",
                get(gdh_esri_design),
            )
            .route(
                "/gdh/projects/{project}/systems/{system}/add/{target}/",
                post(gdh_create_diagram),
            )
            .route(
                "/gdh/projects/{project}/diagrams/{diagram}/",
                post(gdh_update_diagram),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn gdh_url(&self) -> String {
        format!("http://{}/gdh", self.addr)
    }

    #[allow(dead_code)]
    pub fn feature_service_url(&self) -> String {
        format!("http://{}/arcgis/FeatureServer", self.addr)
    }
}

/// Build the bridge app against a running mock upstream.
#[allow(dead_code)]
pub fn create_test_app(upstream: &MockUpstream) -> (Router, Arc<AppState>) {
    create_test_app_with(Config::test_default(&upstream.gdh_url()))
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config).expect("test state should build"));
    (create_router(state.clone()), state)
}

/// Read a JSON response body.
#[allow(dead_code)]
pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ─── Feature service ─────────────────────────────────────────

async fn layer_query(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    assert_eq!(params.get("token").map(String::as_str), Some("test_arcgis_token"));

    if let Some(error) = &state.arcgis_error {
        state.record("GET query error".to_string());
        return Json(json!({"error": error}));
    }

    if params.get("returnCountOnly").map(String::as_str) == Some("true") {
        state.record(format!("GET count where={}", params["where"]));
        let count = state
            .count_override
            .unwrap_or(state.features.len() as u64);
        return Json(json!({"count": count}));
    }

    let offset: usize = params
        .get("resultOffset")
        .and_then(|o| o.parse().ok())
        .unwrap_or(0);
    state.record(format!("GET page offset={}", offset));

    let page: Vec<Value> = state
        .features
        .iter()
        .skip(offset)
        .take(state.page_size)
        .cloned()
        .collect();
    Json(json!({"type": "FeatureCollection", "features": page}))
}

async fn apply_edits(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    assert_eq!(form.get("f").map(String::as_str), Some("json"));
    let adds: Vec<Value> = serde_json::from_str(&form["adds"]).unwrap();
    state.record(format!("POST applyEdits adds={}", adds.len()));

    let results: Vec<Value> = adds
        .iter()
        .enumerate()
        .map(|(i, feature)| {
            if feature["attributes"]["name"] == "REJECT" {
                json!({"objectId": -1, "success": false,
                       "error": {"code": 1000, "description": "Rejected by test"}})
            } else {
                json!({"objectId": 500 + i, "success": true})
            }
        })
        .collect();

    state.applied.lock().unwrap().extend(adds);
    Json(json!({"addResults": results, "updateResults": [], "deleteResults": []}))
}

// ─── Geodesignhub ────────────────────────────────────────────

fn check_gdh_auth(headers: &HeaderMap, project: &str) -> Result<(), Response> {
    let expected = format!("Token {}", GDH_TOKEN);
    if headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        != Some(expected.as_str())
    {
        return Err((StatusCode::UNAUTHORIZED, "bad token").into_response());
    }
    if project != GDH_PROJECT {
        return Err((StatusCode::BAD_REQUEST, "bad project").into_response());
    }
    Ok(())
}

async fn gdh_project(
    State(state): State<Arc<MockState>>,
    Path(project): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(r) = check_gdh_auth(&headers, &project) {
        return r;
    }
    Json(json!({"id": project, "external_connection": state.external_connection})).into_response()
}

async fn gdh_systems(
    State(state): State<Arc<MockState>>,
    Path(project): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(r) = check_gdh_auth(&headers, &project) {
        return r;
    }
    Json(Value::Array(state.systems.clone())).into_response()
}

async fn gdh_teams(
    State(state): State<Arc<MockState>>,
    Path(project): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(r) = check_gdh_auth(&headers, &project) {
        return r;
    }
    Json(state.teams.clone()).into_response()
}

async fn gdh_designs(
    State(state): State<Arc<MockState>>,
    Path((project, _team)): Path<(String, u64)>,
    headers: HeaderMap,
) -> Response {
    if let Err(r) = check_gdh_auth(&headers, &project) {
        return r;
    }
    Json(state.designs.clone()).into_response()
}

async fn gdh_esri_design(
    State(state): State<Arc<MockState>>,
    Path((project, team, design)): Path<(String, u64, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err(r) = check_gdh_auth(&headers, &project) {
        return r;
    }
    state.record(format!("GET esri team={} design={}", team, design));
    Json(state.esri_design.clone()).into_response()
}

async fn gdh_create_diagram(
    State(state): State<Arc<MockState>>,
    Path((project, system, target)): Path<(String, u64, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = check_gdh_auth(&headers, &project) {
        return r;
    }
    let description = body["description"].as_str().unwrap_or_default().to_string();
    state.record(format!("POST create system={} target={} {}", system, target, description));
    state.creates.lock().unwrap().push(body);

    let id = state.next_diagram_id.fetch_add(1, Ordering::SeqCst);
    // Geodesignhub answers with the object JSON-encoded in a string.
    Json(Value::String(json!({"status": 1, "diagram_id": id}).to_string())).into_response()
}

async fn gdh_update_diagram(
    State(state): State<Arc<MockState>>,
    Path((project, diagram)): Path<(String, u64)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = check_gdh_auth(&headers, &project) {
        return r;
    }
    state.record(format!("POST update diagram={}", diagram));
    state.updates.lock().unwrap().push((diagram, body));

    if state.fail_update_for == Some(diagram) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "update exploded").into_response();
    }
    Json(json!({"status": 1})).into_response()
}
