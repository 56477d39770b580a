// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::InternalError;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Triggers a refresh of a BI dataset so it picks up freshly loaded data
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait::async_trait]
pub trait BiDatasetRefresher: Send + Sync {
    /// Queues a refresh of the configured dataset. Returns as soon as the
    /// service accepted the request, the refresh itself runs asynchronously.
    async fn refresh_dataset(&self) -> Result<(), RefreshDatasetError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug)]
pub enum RefreshDatasetError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Refresh(#[from] RefreshError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// Identity provider did not issue an access token
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Authentication failed: {description}")]
pub struct AuthError {
    pub error: Option<String>,
    pub description: String,
}

/// Refresh endpoint answered with anything but `202 Accepted`
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Refresh of dataset {dataset_id} was not accepted, status: {status}")]
pub struct RefreshError {
    pub dataset_id: String,
    pub status: u16,
    pub body: String,
}
