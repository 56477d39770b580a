// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use internal_error::*;
use object_store::ObjectStore;
use object_store::aws::AmazonS3Builder;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Connection settings shared by all buckets the pipeline reads from.
///
/// Credentials are never part of the config: they are picked up from the
/// standard `AWS_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct S3StoreConfig {
    /// AWS region, falls back to `AWS_REGION` / `AWS_DEFAULT_REGION`
    pub region: Option<String>,

    /// Custom endpoint, e.g. `http://localhost:9000` for Minio
    pub endpoint: Option<String>,

    /// Whether plain HTTP endpoints are allowed
    #[serde(default)]
    pub allow_http: bool,

    /// Use S3 Transfer Acceleration endpoints. Ignored when a custom endpoint
    /// is set.
    #[serde(default)]
    pub accelerate: bool,
}

impl S3StoreConfig {
    /// Endpoint URL the client for `bucket` will talk to, if it differs from
    /// the default regional one
    pub fn endpoint_for_bucket(&self, bucket: &str) -> Option<String> {
        match (&self.endpoint, self.accelerate) {
            (Some(endpoint), _) => Some(endpoint.clone()),
            (None, true) => Some(format!("https://{bucket}.s3-accelerate.amazonaws.com")),
            (None, false) => None,
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn build_store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, InternalError> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_allow_http(self.allow_http);

        if let Some(region) = &self.region {
            builder = builder.with_region(region);
        }

        let endpoint = self.endpoint_for_bucket(bucket);

        if let Some(endpoint) = &endpoint {
            // Custom endpoints (Minio, localstack) only support path-style requests,
            // the accelerate endpoint already names the bucket in its host
            builder = builder
                .with_endpoint(endpoint)
                .with_virtual_hosted_style_request(self.endpoint.is_none());
        }

        let store = builder
            .build()
            .context_int_err(format!("building S3 client for bucket '{bucket}'"))?;

        tracing::debug!(bucket, ?endpoint, "Created S3 object store");

        Ok(Arc::new(store))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
