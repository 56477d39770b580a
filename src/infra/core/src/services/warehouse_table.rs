// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Timelike};
use serde_json::Value;
use techhaus_core::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// A single destination table in the warehouse.
///
/// Existence and schema are resolved once when the table is opened and treated
/// as read-only afterwards. Derived values are computed on first access.
pub struct WarehouseTable {
    client: Arc<dyn WarehouseClient>,
    metadata: TableMetadata,
    columns: OnceLock<Vec<String>>,
    qualified_name: OnceLock<String>,
}

impl WarehouseTable {
    #[tracing::instrument(level = "debug", name = "WarehouseTable::open", skip_all, fields(%table_ref))]
    pub async fn open(
        client: Arc<dyn WarehouseClient>,
        table_ref: &TableRef,
    ) -> Result<Self, GetTableError> {
        let metadata = client.get_table(table_ref).await?;

        tracing::debug!(
            num_columns = metadata.schema.len(),
            num_rows = ?metadata.num_rows,
            "Resolved destination table"
        );

        Ok(Self {
            client,
            metadata,
            columns: OnceLock::new(),
            qualified_name: OnceLock::new(),
        })
    }

    pub fn table_ref(&self) -> &TableRef {
        &self.metadata.table_ref
    }

    /// `project.dataset.table`
    pub fn qualified_name(&self) -> &str {
        self.qualified_name
            .get_or_init(|| self.metadata.table_ref.to_string())
    }

    pub fn schema(&self) -> &[ColumnSchema] {
        &self.metadata.schema
    }

    pub fn columns(&self) -> &[String] {
        self.columns.get_or_init(|| {
            self.metadata
                .schema
                .iter()
                .map(|c| c.name.clone())
                .collect()
        })
    }

    pub fn columns_string(&self) -> String {
        self.columns().join(", ")
    }

    /// Column name to declared type
    pub fn schema_map(&self) -> BTreeMap<String, String> {
        self.metadata
            .schema
            .iter()
            .map(|c| (c.name.clone(), c.data_type.clone()))
            .collect()
    }

    /// Converts the table into rows the warehouse accepts for this schema
    pub fn align(&self, table: Table) -> Result<Vec<Record>, SchemaMismatchError> {
        let kinds: HashMap<&str, ColumnKind> = self
            .metadata
            .schema
            .iter()
            .map(|c| (c.name.as_str(), c.kind()))
            .collect();

        let unknown_columns: Vec<String> = table
            .columns()
            .iter()
            .filter(|c| !kinds.contains_key(c.as_str()))
            .cloned()
            .collect();

        if !unknown_columns.is_empty() {
            return Err(SchemaMismatchError { unknown_columns });
        }

        let mut records = table.into_records();
        for record in &mut records {
            for (name, value) in record.iter_mut() {
                if let Some(kind) = kinds.get(name.as_str()) {
                    render_for_kind(value, *kind);
                }
            }
        }

        Ok(records)
    }

    /// Replaces the whole content of the destination table with `table`
    #[tracing::instrument(
        level = "info",
        name = "WarehouseTable::load",
        skip_all,
        fields(table = %self.qualified_name(), num_rows = table.num_rows()),
    )]
    pub async fn load(&self, table: Table) -> Result<LoadJobSummary, LoadError> {
        let rows_attempted = table.num_rows();
        let load_error = |cause: LoadFailure| LoadError {
            table_ref: self.table_ref().clone(),
            rows_attempted,
            cause,
        };

        let records = self.align(table).map_err(|e| load_error(e.into()))?;

        let summary = self
            .client
            .load_truncate(self.table_ref(), self.schema(), records)
            .await
            .map_err(|e| load_error(e.into()))?;

        tracing::info!(job_id = %summary.job_id, output_rows = ?summary.output_rows, "Table loaded");

        Ok(summary)
    }
}

impl std::fmt::Debug for WarehouseTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarehouseTable")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Canonical date-times produced by cleaning are RFC 3339 in UTC, narrower
/// column types need them in their own layout
fn render_for_kind(value: &mut Value, kind: ColumnKind) {
    let Value::String(s) = value else {
        return;
    };

    let Ok(dt) = DateTime::parse_from_rfc3339(s) else {
        return;
    };

    let dt = dt.naive_utc();

    match kind {
        ColumnKind::Date => *s = dt.format("%Y-%m-%d").to_string(),
        ColumnKind::DateTime if dt.nanosecond() == 0 => {
            *s = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
        }
        ColumnKind::DateTime => *s = dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        _ => {}
    }
}
