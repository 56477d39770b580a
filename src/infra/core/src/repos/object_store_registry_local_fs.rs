// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use internal_error::*;
use object_store::ObjectStore;
use object_store::local::LocalFileSystem;
use techhaus_core::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStoreConfig {
    /// Directory containing one subdirectory per bucket
    pub root: PathBuf,
}

impl LocalStoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Serves buckets from directories of the local file system, so an object
/// `s3://bucket/a/b.json` is read from `<root>/bucket/a/b.json`
pub struct ObjectStoreRegistryLocalFs {
    config: Arc<LocalStoreConfig>,
    object_stores: DashMap<String, Arc<dyn ObjectStore>>,
}

#[dill::component(pub)]
#[dill::interface(dyn ObjectStoreRegistry)]
#[dill::scope(dill::Singleton)]
impl ObjectStoreRegistryLocalFs {
    pub fn new(config: Arc<LocalStoreConfig>) -> Self {
        Self {
            config,
            object_stores: DashMap::new(),
        }
    }
}

impl ObjectStoreRegistryLocalFs {
    fn build_store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, InternalError> {
        if bucket.is_empty() || bucket == "." || bucket == ".." || bucket.contains(['/', '\\']) {
            return InternalError::bail(format!("Invalid bucket name '{bucket}'"));
        }

        let path = self.config.root.join(bucket);

        let store = LocalFileSystem::new_with_prefix(&path)
            .context_int_err(format!("opening bucket directory {}", path.display()))?;

        tracing::debug!(bucket, path = %path.display(), "Created local object store");

        Ok(Arc::new(store))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl ObjectStoreRegistry for ObjectStoreRegistryLocalFs {
    fn get_store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, InternalError> {
        if let Some(store) = self.object_stores.get(bucket) {
            return Ok(store.value().clone());
        }

        let store = self.build_store(bucket)?;

        Ok(self
            .object_stores
            .entry(bucket.to_string())
            .or_insert(store)
            .value()
            .clone())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
