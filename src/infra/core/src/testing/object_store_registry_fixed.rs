// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;
use std::sync::Arc;

use internal_error::InternalError;
use object_store::ObjectStore;
use techhaus_core::ObjectStoreRegistry;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Registry over a fixed set of pre-built stores
#[derive(Default)]
pub struct ObjectStoreRegistryFixed {
    stores: HashMap<String, Arc<dyn ObjectStore>>,
}

impl ObjectStoreRegistryFixed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(mut self, bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        self.stores.insert(bucket.into(), store);
        self
    }
}

impl ObjectStoreRegistry for ObjectStoreRegistryFixed {
    fn get_store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, InternalError> {
        match self.stores.get(bucket) {
            Some(store) => Ok(store.clone()),
            None => InternalError::bail(format!("No object store registered for bucket '{bucket}'")),
        }
    }
}
