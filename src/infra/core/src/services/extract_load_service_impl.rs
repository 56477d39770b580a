// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use techhaus_core::*;

use crate::ExtractLoadTask;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct ExtractLoadServiceImpl {
    reader: Arc<dyn ObjectStoreReader>,
    warehouse: Arc<dyn WarehouseClient>,
    listeners: Vec<Arc<dyn ExtractLoadListener>>,
}

#[dill::component(pub)]
#[dill::interface(dyn ExtractLoadService)]
impl ExtractLoadServiceImpl {
    pub fn new(
        reader: Arc<dyn ObjectStoreReader>,
        warehouse: Arc<dyn WarehouseClient>,
        listeners: Vec<Arc<dyn ExtractLoadListener>>,
    ) -> Self {
        Self {
            reader,
            warehouse,
            listeners,
        }
    }
}

#[async_trait::async_trait]
impl ExtractLoadService for ExtractLoadServiceImpl {
    async fn extract_load(&self, entity: &EntitySpec) -> Result<ExtractLoadResult, ExtractLoadError> {
        ExtractLoadTask::new(
            entity.clone(),
            self.reader.clone(),
            self.warehouse.clone(),
            self.listeners.clone(),
        )
        .run()
        .await
    }
}
