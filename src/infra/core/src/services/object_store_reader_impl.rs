// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use internal_error::ErrorIntoInternal;
use object_store::path::Path;
use techhaus_core::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct ObjectStoreReaderImpl {
    object_store_registry: Arc<dyn ObjectStoreRegistry>,
}

#[dill::component(pub)]
#[dill::interface(dyn ObjectStoreReader)]
impl ObjectStoreReaderImpl {
    pub fn new(object_store_registry: Arc<dyn ObjectStoreRegistry>) -> Self {
        Self {
            object_store_registry,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl ObjectStoreReader for ObjectStoreReaderImpl {
    #[tracing::instrument(
        level = "info",
        name = "ObjectStoreReader::read_table",
        skip_all,
        fields(%location, projected = projection.is_some()),
    )]
    async fn read_table(
        &self,
        location: &ObjectLocation,
        projection: Option<&[String]>,
    ) -> Result<Table, ReadError> {
        let store = self.object_store_registry.get_store(&location.bucket)?;
        let path = Path::from(location.key.as_str());

        let data = match store.get(&path).await {
            Ok(res) => res
                .bytes()
                .await
                .map_err(|e| e.int_err().with_context(format!("reading {location}")))?,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(ObjectNotFoundError {
                    location: location.clone(),
                }
                .into());
            }
            Err(e) => {
                return Err(e.int_err().with_context(format!("fetching {location}")).into());
            }
        };

        let table = Table::from_json_slice(&data, projection)?;

        tracing::info!(
            num_bytes = data.len(),
            num_rows = table.num_rows(),
            num_columns = table.num_columns(),
            "Read table from object store"
        );

        Ok(table)
    }
}
