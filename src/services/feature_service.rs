// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! ArcGIS feature service client for GeoPlanner scenario layers.
//!
//! Handles:
//! - Count-only queries
//! - Paged GeoJSON feature queries
//! - `applyEdits` adds with per-feature results

use crate::error::AppError;
use crate::models::{AddFeaturesOutcome, GplFeature};
use crate::models::feature::AddFailure;
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// A layer that can be counted and read page by page.
pub trait FeatureSource {
    /// Number of features matching `filter`.
    fn query_count(&self, filter: &str) -> impl Future<Output = Result<u64, AppError>> + Send;

    /// One page of features matching `filter`, starting at `offset`.
    fn query_page(
        &self,
        filter: &str,
        offset: u64,
    ) -> impl Future<Output = Result<Vec<geojson::Feature>, AppError>> + Send;
}

/// Fetch every feature matching `filter`, one page at a time.
///
/// `expected_total` comes from a prior count query. Pages are requested at
/// the running result length until it reaches `expected_total`; short pages
/// (server-side page caps) just move the offset along. Any failure aborts
/// the whole fetch.
pub async fn fetch_all_features<S: FeatureSource>(
    source: &S,
    filter: &str,
    expected_total: u64,
) -> Result<Vec<geojson::Feature>, AppError> {
    let capacity = usize::try_from(expected_total).unwrap_or_default();
    let mut features: Vec<geojson::Feature> = Vec::with_capacity(capacity);

    while (features.len() as u64) < expected_total {
        let offset = features.len() as u64;
        let page = source.query_page(filter, offset).await?;

        if page.is_empty() {
            return Err(AppError::FeatureService(format!(
                "Query returned no features at offset {} of {} expected",
                offset, expected_total
            )));
        }

        tracing::debug!(
            offset,
            page_len = page.len(),
            expected_total,
            "Fetched feature page"
        );
        features.extend(page);
    }

    tracing::info!(count = features.len(), "Fetched all features");
    Ok(features)
}

/// Client for one layer of a feature service.
#[derive(Clone)]
pub struct FeatureServiceClient {
    http: reqwest::Client,
    /// `<service url>/<layer id>`
    layer_url: String,
    token: String,
}

impl FeatureServiceClient {
    /// Create a client for `layer_id` of the feature service at `service_url`.
    pub fn new(
        service_url: &str,
        layer_id: u32,
        token: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            layer_url: format!("{}/{}", service_url.trim_end_matches('/'), layer_id),
            token,
        })
    }

    /// Add features to the layer.
    ///
    /// Features the service rejects are reported in
    /// [`AddFeaturesOutcome::failures`]; they do not fail the call.
    pub async fn apply_edits(&self, adds: &[GplFeature]) -> Result<AddFeaturesOutcome, AppError> {
        let url = format!("{}/applyEdits", self.layer_url);
        let adds_json = serde_json::to_string(adds)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode features: {}", e)))?;

        let response = self
            .http
            .post(&url)
            .form(&[
                ("adds", adds_json.as_str()),
                ("f", "json"),
                ("token", self.token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::FeatureService(format!("applyEdits request failed: {}", e)))?;

        let body: ApplyEditsResponse = self.check_response_json(response).await?;
        let outcome = collect_add_results(body.add_results);

        for failure in &outcome.failures {
            tracing::warn!(
                index = failure.index,
                code = ?failure.code,
                description = %failure.description,
                "Feature rejected by applyEdits"
            );
        }
        tracing::info!(
            added = outcome.object_ids.len(),
            failed = outcome.failures.len(),
            "applyEdits complete"
        );

        Ok(outcome)
    }

    /// GET `<layer>/query` and parse the JSON body.
    async fn query<T: for<'de> Deserialize<'de>>(
        &self,
        params: &[(&str, String)],
    ) -> Result<T, AppError> {
        let url = format!("{}/query", self.layer_url);

        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("token", self.token.as_str())])
            .send()
            .await
            .map_err(|e| AppError::FeatureService(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response status, ArcGIS error bodies, and parse JSON.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::FeatureService(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(AppError::FeatureService(format!("HTTP {}: {}", status, body)));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| AppError::FeatureService(format!("JSON parse error: {}", e)))?;

        // ArcGIS reports many failures as HTTP 200 with an error object.
        if let Some(error) = value.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(AppError::FeatureService(format!(
                "ArcGIS error {}: {}",
                code, message
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| AppError::FeatureService(format!("Unexpected response: {}", e)))
    }
}

impl FeatureSource for FeatureServiceClient {
    async fn query_count(&self, filter: &str) -> Result<u64, AppError> {
        let body: CountResponse = self
            .query(&[
                ("where", filter.to_string()),
                ("returnCountOnly", "true".to_string()),
                ("f", "json".to_string()),
            ])
            .await?;
        Ok(body.count)
    }

    async fn query_page(
        &self,
        filter: &str,
        offset: u64,
    ) -> Result<Vec<geojson::Feature>, AppError> {
        let body: geojson::FeatureCollection = self
            .query(&[
                ("where", filter.to_string()),
                ("outFields", "*".to_string()),
                ("outSR", "4326".to_string()),
                ("resultOffset", offset.to_string()),
                ("f", "geojson".to_string()),
            ])
            .await?;
        Ok(body.features)
    }
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct ApplyEditsResponse {
    #[serde(rename = "addResults", default)]
    add_results: Vec<AddResult>,
}

#[derive(Debug, Deserialize)]
struct AddResult {
    #[serde(rename = "objectId")]
    object_id: Option<i64>,
    #[serde(default)]
    error: Option<AddResultError>,
}

#[derive(Debug, Deserialize)]
struct AddResultError {
    code: Option<i64>,
    #[serde(default)]
    description: String,
}

/// Split `addResults` into added object IDs and per-feature failures.
fn collect_add_results(results: Vec<AddResult>) -> AddFeaturesOutcome {
    let mut outcome = AddFeaturesOutcome::default();
    for (index, result) in results.into_iter().enumerate() {
        match (result.error, result.object_id) {
            (None, Some(object_id)) => outcome.object_ids.push(object_id),
            (Some(error), _) => outcome.failures.push(AddFailure {
                index,
                code: error.code,
                description: error.description,
            }),
            (None, None) => outcome.failures.push(AddFailure {
                index,
                code: None,
                description: "No object ID returned".to_string(),
            }),
        }
    }
    outcome
}
