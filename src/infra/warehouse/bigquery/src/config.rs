// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::time::Duration;

use internal_error::InternalError;
use url::Url;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub const DEFAULT_API_URL: &str = "https://bigquery.googleapis.com";
pub const DEFAULT_METADATA_URL: &str = "http://metadata.google.internal";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigQueryConfig {
    /// Base URL of the REST API serving `tables.get` and `jobs.get`
    pub api_url: Url,

    /// Base URL of the media upload API serving `jobs.insert`
    pub upload_url: Url,

    /// Location jobs are created and polled in, e.g. `asia-southeast1`
    pub location: Option<String>,

    /// Delay between two `jobs.get` calls while a load job is running
    pub poll_interval: Duration,

    /// Base URL of the GCE metadata server used for workload credentials
    pub metadata_url: Url,
}

impl BigQueryConfig {
    pub fn new(api_url: Url, upload_url: Url, metadata_url: Url) -> Self {
        Self {
            api_url,
            upload_url,
            location: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            metadata_url,
        }
    }

    /// Config pointing at the public Google endpoints
    pub fn public() -> Result<Self, InternalError> {
        let api_url = parse_url(DEFAULT_API_URL)?;
        Ok(Self::new(api_url.clone(), api_url, parse_url(DEFAULT_METADATA_URL)?))
    }

    pub fn with_location(self, location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..self
        }
    }

    pub fn with_poll_interval(self, poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            ..self
        }
    }
}

fn parse_url(url: &str) -> Result<Url, InternalError> {
    Url::parse(url).map_err(|e| InternalError::new(e).with_context(format!("parsing '{url}'")))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

