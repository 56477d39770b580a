// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use techhaus_adapter_powerbi::*;
use techhaus_core::*;
use time_source::SystemTimeSourceStub;
use url::Url;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

const TENANT_ID: &str = "tenant-1";
const DATASET_ID: &str = "dataset-1";

struct MockState {
    token_requests: Vec<HashMap<String, String>>,
    refresh_requests: Vec<String>,
    refresh_status: StatusCode,
    expires_in: Option<i64>,
}

type SharedState = Arc<Mutex<MockState>>;

struct RefresherHarness {
    state: SharedState,
    time_source: SystemTimeSourceStub,
    refresher: PowerBiDatasetRefresher,
}

impl RefresherHarness {
    async fn new(password: &str, expires_in: Option<i64>) -> Self {
        let state = SharedState::new(Mutex::new(MockState {
            token_requests: Vec::new(),
            refresh_requests: Vec::new(),
            refresh_status: StatusCode::ACCEPTED,
            expires_in,
        }));

        let router = axum::Router::new()
            .route(
                "/{tenant_id}/oauth2/v2.0/token",
                axum::routing::post(Self::token),
            )
            .route(
                "/v1.0/myorg/datasets/{dataset_id}/refreshes",
                axum::routing::post(Self::refresh),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();

        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

        let time_source =
            SystemTimeSourceStub::new_set(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());

        let config = PowerBiConfig {
            tenant_id: TENANT_ID.to_string(),
            app_id: "app-1".to_string(),
            dataset_id: DATASET_ID.to_string(),
            username: "bi@activetix.vn".to_string(),
            password: password.to_string().into(),
            authority_url: url.clone(),
            api_url: url,
        };

        let refresher = PowerBiDatasetRefresher::new(Arc::new(config), Arc::new(time_source.clone()));

        Self {
            state,
            time_source,
            refresher,
        }
    }

    async fn token(
        State(state): State<SharedState>,
        Path(tenant_id): Path<String>,
        Form(form): Form<HashMap<String, String>>,
    ) -> Response {
        let mut state = state.lock().unwrap();
        assert_eq!(tenant_id, TENANT_ID);

        let wrong_password = form.get("password").map(String::as_str) == Some("wrong");
        state.token_requests.push(form);

        if wrong_password {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_grant",
                    "error_description": "AADSTS50126: Error validating credentials",
                })),
            )
                .into_response();
        }

        Json(json!({
            "token_type": "Bearer",
            "access_token": format!("aad_{}", state.token_requests.len()),
            "expires_in": state.expires_in,
        }))
        .into_response()
    }

    async fn refresh(
        State(state): State<SharedState>,
        Path(dataset_id): Path<String>,
        headers: HeaderMap,
    ) -> Response {
        let mut state = state.lock().unwrap();
        assert_eq!(dataset_id, DATASET_ID);

        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        state.refresh_requests.push(authorization);

        match state.refresh_status {
            StatusCode::ACCEPTED => StatusCode::ACCEPTED.into_response(),
            status => (
                status,
                Json(json!({"error": {"code": "ItemNotFound", "message": "Dataset is not available"}})),
            )
                .into_response(),
        }
    }

    fn set_refresh_status(&self, status: StatusCode) {
        self.state.lock().unwrap().refresh_status = status;
    }

    fn num_token_requests(&self) -> usize {
        self.state.lock().unwrap().token_requests.len()
    }

    fn refresh_requests(&self) -> Vec<String> {
        self.state.lock().unwrap().refresh_requests.clone()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_refresh_requests_token_with_password_grant() {
    let harness = RefresherHarness::new("secret", Some(3599)).await;

    harness.refresher.refresh_dataset().await.unwrap();

    let state = harness.state.lock().unwrap();
    assert_eq!(
        state.token_requests,
        [HashMap::from(
            [
                ("grant_type", "password"),
                ("client_id", "app-1"),
                ("username", "bi@activetix.vn"),
                ("password", "secret"),
                ("scope", "https://analysis.windows.net/powerbi/api/.default"),
            ]
            .map(|(k, v)| (k.to_string(), v.to_string()))
        )]
    );
    assert_eq!(state.refresh_requests, ["Bearer aad_1"]);
}

#[test_log::test(tokio::test)]
async fn test_cached_token_is_reused_and_refresh_is_always_called() {
    let harness = RefresherHarness::new("secret", Some(3600)).await;

    harness.refresher.refresh_dataset().await.unwrap();
    harness.refresher.refresh_dataset().await.unwrap();

    assert_eq!(harness.num_token_requests(), 1);
    assert_eq!(harness.refresh_requests(), ["Bearer aad_1", "Bearer aad_1"]);
}

#[test_log::test(tokio::test)]
async fn test_expired_token_is_renewed() {
    let harness = RefresherHarness::new("secret", Some(3600)).await;

    harness.refresher.refresh_dataset().await.unwrap();

    harness.time_source.advance(Duration::seconds(3540));
    harness.refresher.refresh_dataset().await.unwrap();

    assert_eq!(harness.num_token_requests(), 2);
    assert_eq!(harness.refresh_requests(), ["Bearer aad_1", "Bearer aad_2"]);
}

#[test_log::test(tokio::test)]
async fn test_token_without_expiry_is_not_reused() {
    let harness = RefresherHarness::new("secret", None).await;

    harness.refresher.refresh_dataset().await.unwrap();
    harness.refresher.refresh_dataset().await.unwrap();

    assert_eq!(harness.refresh_requests(), ["Bearer aad_1", "Bearer aad_2"]);
}

#[test_log::test(tokio::test)]
async fn test_token_with_out_of_range_expiry_is_not_reused() {
    // Far beyond the largest representable timestamp
    let harness = RefresherHarness::new("secret", Some(10_000_000_000_000)).await;

    harness.refresher.refresh_dataset().await.unwrap();
    harness.refresher.refresh_dataset().await.unwrap();

    assert_eq!(harness.num_token_requests(), 2);
    assert_eq!(harness.refresh_requests(), ["Bearer aad_1", "Bearer aad_2"]);
}

#[test_log::test(tokio::test)]
async fn test_rejected_credentials() {
    let harness = RefresherHarness::new("wrong", Some(3600)).await;

    let res = harness.refresher.refresh_dataset().await;

    match res {
        Err(RefreshDatasetError::Auth(e)) => assert_eq!(
            e,
            AuthError {
                error: Some("invalid_grant".to_string()),
                description: "AADSTS50126: Error validating credentials".to_string(),
            }
        ),
        _ => panic!("Unexpected result: {res:?}"),
    }
    assert!(harness.refresh_requests().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_refresh_not_accepted_on_cached_token_path() {
    let harness = RefresherHarness::new("secret", Some(3600)).await;

    harness.refresher.refresh_dataset().await.unwrap();

    harness.set_refresh_status(StatusCode::NOT_FOUND);
    let res = harness.refresher.refresh_dataset().await;

    match res {
        Err(RefreshDatasetError::Refresh(e)) => {
            assert_eq!(e.dataset_id, DATASET_ID);
            assert_eq!(e.status, 404);
            assert_eq!(
                serde_json::from_str::<serde_json::Value>(&e.body).unwrap(),
                json!({"error": {"code": "ItemNotFound", "message": "Dataset is not available"}})
            );
        }
        _ => panic!("Unexpected result: {res:?}"),
    }
    assert_eq!(harness.num_token_requests(), 1);
    assert_eq!(harness.refresh_requests().len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_unauthorized_refresh_drops_cached_token() {
    let harness = RefresherHarness::new("secret", Some(3600)).await;

    harness.set_refresh_status(StatusCode::UNAUTHORIZED);
    let res = harness.refresher.refresh_dataset().await;
    assert!(
        matches!(res, Err(RefreshDatasetError::Refresh(ref e)) if e.status == 401),
        "{res:?}"
    );

    harness.set_refresh_status(StatusCode::ACCEPTED);
    harness.refresher.refresh_dataset().await.unwrap();

    assert_eq!(harness.refresh_requests(), ["Bearer aad_1", "Bearer aad_2"]);
}
