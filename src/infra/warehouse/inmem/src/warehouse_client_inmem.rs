// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use dill::{Singleton, component, interface, scope};
use serde_json::Value;
use techhaus_core::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Warehouse that keeps tables in memory. Load jobs complete immediately but
/// validate rows against the declared schema the same way a real warehouse
/// would reject them.
pub struct WarehouseClientInMemory {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    tables: HashMap<TableRef, TableState>,
    last_job_id: u64,
    fail_next_load: Option<String>,
}

struct TableState {
    schema: Vec<ColumnSchema>,
    rows: Vec<Record>,
}

impl State {
    fn next_job_id(&mut self) -> String {
        self.last_job_id += 1;
        format!("job_{}", self.last_job_id)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[component(pub)]
#[interface(dyn WarehouseClient)]
#[scope(Singleton)]
impl WarehouseClientInMemory {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
        }
    }
}

impl WarehouseClientInMemory {
    /// Creates an empty table, replacing any existing one
    pub fn create_table(&self, table_ref: TableRef, schema: Vec<ColumnSchema>) {
        let mut state = self.state.lock().unwrap();
        state.tables.insert(
            table_ref,
            TableState {
                schema,
                rows: Vec::new(),
            },
        );
    }

    /// Appends rows without any validation
    pub fn append_rows(&self, table_ref: &TableRef, rows: Vec<Record>) -> Result<(), TableNotFoundError> {
        let mut state = self.state.lock().unwrap();
        let table = state.tables.get_mut(table_ref).ok_or_else(|| TableNotFoundError {
            table_ref: table_ref.clone(),
        })?;
        table.rows.extend(rows);
        Ok(())
    }

    pub fn rows(&self, table_ref: &TableRef) -> Option<Vec<Record>> {
        let state = self.state.lock().unwrap();
        state.tables.get(table_ref).map(|t| t.rows.clone())
    }

    /// Makes the next load job fail with the given message
    pub fn fail_next_load(&self, message: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.fail_next_load = Some(message.into());
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl WarehouseClient for WarehouseClientInMemory {
    async fn get_table(&self, table_ref: &TableRef) -> Result<TableMetadata, GetTableError> {
        let state = self.state.lock().unwrap();

        let table = state.tables.get(table_ref).ok_or_else(|| TableNotFoundError {
            table_ref: table_ref.clone(),
        })?;

        Ok(TableMetadata {
            table_ref: table_ref.clone(),
            schema: table.schema.clone(),
            num_rows: Some(table.rows.len() as u64),
        })
    }

    async fn load_truncate(
        &self,
        table_ref: &TableRef,
        schema: &[ColumnSchema],
        rows: Vec<Record>,
    ) -> Result<LoadJobSummary, LoadJobError> {
        let mut state = self.state.lock().unwrap();
        let job_id = state.next_job_id();

        let rejected = |reason: &str, message: String| LoadJobRejectedError {
            job_id: Some(job_id.clone()),
            reason: Some(reason.to_string()),
            message,
        };

        if let Some(message) = state.fail_next_load.take() {
            return Err(rejected("backendError", message).into());
        }

        let Some(table) = state.tables.get_mut(table_ref) else {
            return Err(rejected("notFound", format!("Not found: Table {table_ref}")).into());
        };

        if table.schema != schema {
            return Err(rejected(
                "invalid",
                format!("Provided schema does not match Table {table_ref}"),
            )
            .into());
        }

        for (i, row) in rows.iter().enumerate() {
            if let Err(message) = validate_row(&table.schema, row) {
                return Err(rejected("invalid", format!("Error while reading data, row {i}: {message}")).into());
            }
        }

        tracing::debug!(%table_ref, %job_id, num_rows = rows.len(), "Replacing table content");

        let num_rows = rows.len() as u64;
        table.rows = rows;

        Ok(LoadJobSummary {
            job_id,
            output_rows: Some(num_rows),
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn validate_row(schema: &[ColumnSchema], row: &Record) -> Result<(), String> {
    if let Some(name) = row.keys().find(|k| !schema.iter().any(|c| &c.name == *k)) {
        return Err(format!("no such field: {name}"));
    }

    for column in schema {
        let value = row.get(&column.name).unwrap_or(&Value::Null);

        if value.is_null() {
            if column.mode == ColumnMode::Required {
                return Err(format!("missing required field: {}", column.name));
            }
            continue;
        }

        if !value_matches_kind(value, column.kind()) {
            return Err(format!(
                "cannot convert value {value} to {} for field {}",
                column.data_type, column.name
            ));
        }
    }

    Ok(())
}

fn value_matches_kind(value: &Value, kind: ColumnKind) -> bool {
    match (kind, value) {
        (ColumnKind::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
        (ColumnKind::Integer, Value::String(s)) => s.parse::<i64>().is_ok(),
        (ColumnKind::Float, Value::Number(_)) | (ColumnKind::Boolean, Value::Bool(_)) => true,
        (ColumnKind::Float, Value::String(s)) => s.parse::<f64>().is_ok(),
        (ColumnKind::Date, Value::String(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
        (ColumnKind::DateTime, Value::String(s)) => {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        }
        (ColumnKind::Timestamp, Value::String(s)) => DateTime::parse_from_rfc3339(s).is_ok(),
        (ColumnKind::String, Value::String(_) | Value::Number(_) | Value::Bool(_))
        | (ColumnKind::Other, _) => true,
        _ => false,
    }
}
