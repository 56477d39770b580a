// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::InternalError;

use crate::{Record, TableRef};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Minimal surface of a cloud data warehouse the pipeline relies on
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait::async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Looks up table existence and its declared schema
    async fn get_table(&self, table_ref: &TableRef) -> Result<TableMetadata, GetTableError>;

    /// Replaces the entire content of the table with `rows` and waits until
    /// the warehouse reports the job as finished
    async fn load_truncate(
        &self,
        table_ref: &TableRef,
        schema: &[ColumnSchema],
        rows: Vec<Record>,
    ) -> Result<LoadJobSummary, LoadJobError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    pub table_ref: TableRef,
    pub schema: Vec<ColumnSchema>,
    pub num_rows: Option<u64>,
}

/// Single column of a warehouse table schema
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    /// Declared type as reported by the warehouse, e.g. `STRING`, `DATE`
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub mode: ColumnMode,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            mode: ColumnMode::Nullable,
        }
    }

    pub fn required(self) -> Self {
        Self {
            mode: ColumnMode::Required,
            ..self
        }
    }

    pub fn kind(&self) -> ColumnKind {
        ColumnKind::from_type_name(&self.data_type)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnMode {
    #[default]
    Nullable,
    Required,
    Repeated,
}

/// Coarse classification of declared column types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Timestamp,
    Other,
}

impl ColumnKind {
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name.to_ascii_uppercase().as_str() {
            "STRING" => Self::String,
            "INTEGER" | "INT64" => Self::Integer,
            "FLOAT" | "FLOAT64" | "NUMERIC" | "BIGNUMERIC" => Self::Float,
            "BOOLEAN" | "BOOL" => Self::Boolean,
            "DATE" => Self::Date,
            "DATETIME" => Self::DateTime,
            "TIMESTAMP" => Self::Timestamp,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadJobSummary {
    pub job_id: String,
    pub output_rows: Option<u64>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug)]
pub enum GetTableError {
    #[error(transparent)]
    NotFound(#[from] TableNotFoundError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Table {table_ref} not found")]
pub struct TableNotFoundError {
    pub table_ref: TableRef,
}

#[derive(thiserror::Error, Debug)]
pub enum LoadJobError {
    #[error(transparent)]
    Rejected(#[from] LoadJobRejectedError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// Warehouse accepted the request but the job itself failed
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Load job {} failed: {message}", .job_id.as_deref().unwrap_or("<unknown>"))]
pub struct LoadJobRejectedError {
    pub job_id: Option<String>,
    pub reason: Option<String>,
    pub message: String,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Failure of a full-overwrite load into a warehouse table
#[derive(thiserror::Error, Debug)]
#[error("Failed to load {rows_attempted} rows into {table_ref}")]
pub struct LoadError {
    pub table_ref: TableRef,
    pub rows_attempted: usize,
    #[source]
    pub cause: LoadFailure,
}

#[derive(thiserror::Error, Debug)]
pub enum LoadFailure {
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatchError),
    #[error(transparent)]
    Rejected(#[from] LoadJobRejectedError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl From<LoadJobError> for LoadFailure {
    fn from(value: LoadJobError) -> Self {
        match value {
            LoadJobError::Rejected(e) => Self::Rejected(e),
            LoadJobError::Internal(e) => Self::Internal(e),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Columns {unknown_columns:?} are not part of the destination schema")]
pub struct SchemaMismatchError {
    pub unknown_columns: Vec<String>,
}
