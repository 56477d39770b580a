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
use http_common::endpoint_url;
use internal_error::*;
use time_source::SystemTimeSource;

use crate::BigQueryConfig;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub const ACCESS_TOKEN_ENV_VAR: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Tokens are considered expired this long before the server says so
const EXPIRY_MARGIN: Duration = Duration::seconds(60);

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Source of OAuth bearer tokens for Google APIs
#[async_trait::async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, InternalError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Reads a pre-issued token from the environment on every call, e.g. one
/// produced by `gcloud auth print-access-token`
pub struct AccessTokenProviderEnv {
    var_name: String,
}

#[dill::component(pub)]
#[dill::interface(dyn AccessTokenProvider)]
impl AccessTokenProviderEnv {
    pub fn new() -> Self {
        Self::with_var(ACCESS_TOKEN_ENV_VAR)
    }

    pub fn with_var(var_name: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
        }
    }
}

#[async_trait::async_trait]
impl AccessTokenProvider for AccessTokenProviderEnv {
    async fn access_token(&self) -> Result<String, InternalError> {
        match std::env::var(&self.var_name) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => InternalError::bail(format!("Environment variable {} is not set", self.var_name)),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Fetches tokens of the default service account from the GCE metadata server
/// and reuses them until shortly before they expire
pub struct AccessTokenProviderMetadata {
    config: Arc<BigQueryConfig>,
    time_source: Arc<dyn SystemTimeSource>,
    http_client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(serde::Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[dill::component(pub)]
#[dill::interface(dyn AccessTokenProvider)]
#[dill::scope(dill::Singleton)]
impl AccessTokenProviderMetadata {
    pub fn new(config: Arc<BigQueryConfig>, time_source: Arc<dyn SystemTimeSource>) -> Self {
        Self {
            config,
            time_source,
            http_client: reqwest::Client::new(),
            cached: Mutex::new(None),
        }
    }

    fn cached_token(&self, now: DateTime<Utc>) -> Option<String> {
        let cached = self.cached.lock().unwrap();
        cached
            .as_ref()
            .filter(|t| now < t.expires_at)
            .map(|t| t.access_token.clone())
    }

    #[tracing::instrument(level = "debug", name = "AccessTokenProviderMetadata::fetch_token", skip_all)]
    async fn fetch_token(&self) -> Result<MetadataTokenResponse, InternalError> {
        let url = endpoint_url(
            &self.config.metadata_url,
            &[
                "computeMetadata",
                "v1",
                "instance",
                "service-accounts",
                "default",
                "token",
            ],
        )?;

        self.http_client
            .get(url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .int_err()?
            .error_for_status()
            .int_err()?
            .json::<MetadataTokenResponse>()
            .await
            .context_int_err("decoding metadata server token response")
    }
}

#[async_trait::async_trait]
impl AccessTokenProvider for AccessTokenProviderMetadata {
    async fn access_token(&self) -> Result<String, InternalError> {
        let requested_at = self.time_source.now();

        if let Some(token) = self.cached_token(requested_at) {
            return Ok(token);
        }

        let response = self.fetch_token().await?;

        let expires_at = response
            .expires_in
            .and_then(Duration::try_seconds)
            .and_then(|expires_in| requested_at.checked_add_signed(expires_in))
            .and_then(|t| t.checked_sub_signed(EXPIRY_MARGIN));

        match expires_at {
            Some(expires_at) => {
                tracing::debug!(%expires_at, "Obtained access token from metadata server");

                *self.cached.lock().unwrap() = Some(CachedToken {
                    access_token: response.access_token.clone(),
                    expires_at,
                });
            }
            None => {
                tracing::debug!(
                    expires_in = ?response.expires_in,
                    "Obtained access token without usable expiry, it will not be reused"
                );
                *self.cached.lock().unwrap() = None;
            }
        }

        Ok(response.access_token)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
