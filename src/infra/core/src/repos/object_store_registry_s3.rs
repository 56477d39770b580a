// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use dashmap::DashMap;
use internal_error::InternalError;
use object_store::ObjectStore;
use s3_utils::S3StoreConfig;
use techhaus_core::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Creates one S3 client per bucket on first use and keeps it for the
/// lifetime of the registry
pub struct ObjectStoreRegistryS3 {
    config: Arc<S3StoreConfig>,
    object_stores: DashMap<String, Arc<dyn ObjectStore>>,
}

#[dill::component(pub)]
#[dill::interface(dyn ObjectStoreRegistry)]
#[dill::scope(dill::Singleton)]
impl ObjectStoreRegistryS3 {
    pub fn new(config: Arc<S3StoreConfig>) -> Self {
        Self {
            config,
            object_stores: DashMap::new(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl ObjectStoreRegistry for ObjectStoreRegistryS3 {
    fn get_store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, InternalError> {
        // Try get existing store
        let store = self.object_stores.get(bucket).map(|o| o.value().clone());

        if let Some(store) = store {
            return Ok(store);
        }

        let store = self.config.build_store(bucket)?;

        // Another caller may have built a client in the meantime
        let store = self
            .object_stores
            .entry(bucket.to_string())
            .or_insert(store)
            .value()
            .clone();

        Ok(store)
    }
}

impl std::fmt::Debug for ObjectStoreRegistryS3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreRegistryS3")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
