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

use crate::{RowCountReporter, WarehouseTable};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// One run of the extract/load pattern for a single entity
pub struct ExtractLoadTask {
    entity: EntitySpec,
    reader: Arc<dyn ObjectStoreReader>,
    warehouse: Arc<dyn WarehouseClient>,
    listeners: Vec<Arc<dyn ExtractLoadListener>>,
}

impl ExtractLoadTask {
    pub fn new(
        entity: EntitySpec,
        reader: Arc<dyn ObjectStoreReader>,
        warehouse: Arc<dyn WarehouseClient>,
        listeners: Vec<Arc<dyn ExtractLoadListener>>,
    ) -> Self {
        Self {
            entity,
            reader,
            warehouse,
            listeners,
        }
    }

    #[tracing::instrument(
        level = "info",
        name = "ExtractLoadTask::run",
        skip_all,
        fields(entity = %self.entity.name, table = %self.entity.table),
    )]
    pub async fn run(self) -> Result<ExtractLoadResult, ExtractLoadError> {
        let entity = &self.entity;

        let table = WarehouseTable::open(self.warehouse.clone(), &entity.table).await?;

        let projection = entity.project_to_table_columns.then(|| table.columns());
        let mut data = self.reader.read_table(&entity.source, projection).await?;

        let number_of_rows_read = data.num_rows();
        let mut reporter = RowCountReporter::new(
            &entity.name,
            table.table_ref().clone(),
            number_of_rows_read,
            self.listeners.clone(),
        );

        apply_rules(&entity.rules, &mut data)
            .map_err(|e| ExtractLoadError::cleaning(number_of_rows_read, e))?;

        let number_of_rows = data.num_rows();
        reporter.set_number_of_rows(number_of_rows);

        let outcome = match table.load(data).await {
            Ok(summary) => {
                reporter.set_status(ExtractLoadStatus::Loaded);
                LoadOutcome::Loaded(summary)
            }
            Err(err) => {
                tracing::error!(error = ?err, error_msg = %err, "Failed to load table");
                reporter.set_status(ExtractLoadStatus::LoadFailed);
                LoadOutcome::Failed(err)
            }
        };

        Ok(ExtractLoadResult {
            entity: entity.name.clone(),
            table_ref: table.table_ref().clone(),
            number_of_rows,
            outcome,
        })
    }
}
