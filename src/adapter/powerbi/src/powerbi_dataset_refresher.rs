// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use http::StatusCode;
use http_common::endpoint_url;
use internal_error::*;
use secrecy::ExposeSecret;
use techhaus_core::*;
use time_source::SystemTimeSource;

use crate::{POWERBI_SCOPE, PowerBiConfig};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Tokens are considered expired this long before the identity provider says
const EXPIRY_MARGIN: Duration = Duration::seconds(60);

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct PowerBiDatasetRefresher {
    config: Arc<PowerBiConfig>,
    time_source: Arc<dyn SystemTimeSource>,
    http_client: reqwest::Client,
    cached_token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
    error: Option<String>,
    error_description: Option<String>,
}

#[dill::component(pub)]
#[dill::interface(dyn BiDatasetRefresher)]
#[dill::scope(dill::Singleton)]
impl PowerBiDatasetRefresher {
    pub fn new(config: Arc<PowerBiConfig>, time_source: Arc<dyn SystemTimeSource>) -> Self {
        Self {
            config,
            time_source,
            http_client: reqwest::Client::new(),
            cached_token: Mutex::new(None),
        }
    }

    async fn access_token(&self) -> Result<String, RefreshDatasetError> {
        let requested_at = self.time_source.now();

        {
            let cached_token = self.cached_token.lock().unwrap();
            if let Some(token) = cached_token.as_ref().filter(|t| requested_at < t.expires_at) {
                tracing::debug!(expires_at = %token.expires_at, "Reusing cached access token");
                return Ok(token.access_token.clone());
            }
        }

        let (access_token, expires_in) = self.request_token().await?;

        // Expiry that does not fit into a timestamp is treated as absent
        let expires_at = expires_in.and_then(|expires_in| {
            requested_at
                .checked_add_signed(expires_in)
                .and_then(|t| t.checked_sub_signed(EXPIRY_MARGIN))
        });

        if expires_at.is_none() {
            tracing::debug!(?expires_in, "Access token expiry is unknown, it will not be reused");
        }

        *self.cached_token.lock().unwrap() = expires_at.map(|expires_at| CachedToken {
            access_token: access_token.clone(),
            expires_at,
        });

        Ok(access_token)
    }

    #[tracing::instrument(level = "debug", name = "PowerBiDatasetRefresher::request_token", skip_all)]
    async fn request_token(&self) -> Result<(String, Option<Duration>), RefreshDatasetError> {
        let url = endpoint_url(
            &self.config.authority_url,
            &[&self.config.tenant_id, "oauth2", "v2.0", "token"],
        )?;

        let params = [
            ("grant_type", "password"),
            ("client_id", self.config.app_id.as_str()),
            ("username", self.config.username.as_str()),
            ("password", self.config.password.expose_secret()),
            ("scope", POWERBI_SCOPE),
        ];

        let response = self
            .http_client
            .post(url)
            .header(http::header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .int_err()?;

        let status = response.status();
        let body = response.text().await.int_err()?;

        let token: TokenResponse = serde_json::from_str(&body)
            .context_int_err(format!("decoding token response, status: {status}"))?;

        match token.access_token {
            Some(access_token) => {
                tracing::debug!(expires_in = ?token.expires_in, "Obtained access token");
                Ok((access_token, token.expires_in.and_then(Duration::try_seconds)))
            }
            None => {
                let err = AuthError {
                    error: token.error,
                    description: token
                        .error_description
                        .unwrap_or_else(|| format!("No access token issued, status: {status}")),
                };
                tracing::error!(error = ?err, error_msg = %err, "Authentication failed");
                Err(err.into())
            }
        }
    }
}

#[async_trait::async_trait]
impl BiDatasetRefresher for PowerBiDatasetRefresher {
    #[tracing::instrument(
        level = "info",
        name = "PowerBiDatasetRefresher::refresh_dataset",
        skip_all,
        fields(dataset_id = %self.config.dataset_id),
    )]
    async fn refresh_dataset(&self) -> Result<(), RefreshDatasetError> {
        let access_token = self.access_token().await?;

        let url = endpoint_url(
            &self.config.api_url,
            &["v1.0", "myorg", "datasets", &self.config.dataset_id, "refreshes"],
        )?;

        let response = self
            .http_client
            .post(url)
            .bearer_auth(access_token)
            .send()
            .await
            .int_err()?;

        let status = response.status();

        if status == StatusCode::ACCEPTED {
            tracing::info!("Dataset refresh accepted");
            return Ok(());
        }

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            // Token was revoked or lacks permissions, next attempt re-authenticates
            self.cached_token.lock().unwrap().take();
        }

        let err = RefreshError {
            dataset_id: self.config.dataset_id.clone(),
            status: status.as_u16(),
            body: response.text().await.int_err()?,
        };

        tracing::error!(error = ?err, error_msg = %err, "Dataset refresh was not accepted");

        Err(err.into())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

