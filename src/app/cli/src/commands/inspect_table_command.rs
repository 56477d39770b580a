// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use techhaus::WarehouseTable;
use techhaus::domain::{GetTableError, TableRef, WarehouseClient};

use super::{CLIError, Command};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct InspectTableCommand {
    warehouse: Arc<dyn WarehouseClient>,
    table_ref: TableRef,
}

impl InspectTableCommand {
    pub fn new(warehouse: Arc<dyn WarehouseClient>, table_ref: TableRef) -> Self {
        Self {
            warehouse,
            table_ref,
        }
    }

    pub async fn render(&self) -> Result<String, CLIError> {
        let table = match WarehouseTable::open(self.warehouse.clone(), &self.table_ref).await {
            Ok(table) => table,
            Err(GetTableError::NotFound(e)) => return Err(CLIError::usage_error_from(e)),
            Err(GetTableError::Internal(e)) => return Err(e.into()),
        };

        let name_width = table
            .schema()
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or_default();

        let mut out = format!("{}\n", table.qualified_name());
        for column in table.schema() {
            out.push_str(&format!(
                "  {:<name_width$}  {:<10}  {:?}\n",
                column.name, column.data_type, column.mode
            ));
        }
        Ok(out)
    }
}

#[async_trait::async_trait(?Send)]
impl Command for InspectTableCommand {
    async fn run(&mut self) -> Result<(), CLIError> {
        print!("{}", self.render().await?);
        Ok(())
    }
}
