// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::error::Error;

use internal_error::InternalError;

use crate::{
    CleaningError, EntitySpec, GetTableError, LoadError, LoadJobSummary, ReadError,
    TableNotFoundError, TableRef,
};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Runs the extract/load pattern for an entity: resolve the destination
/// table, read raw records, clean them and overwrite the table.
///
/// Errors are returned only when the task is aborted before the load step.
/// Load failures are part of a successful [`ExtractLoadResult`].
#[async_trait::async_trait]
pub trait ExtractLoadService: Send + Sync {
    async fn extract_load(&self, entity: &EntitySpec) -> Result<ExtractLoadResult, ExtractLoadError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Outcome of one extract/load task that made it to the load step
#[derive(Debug)]
pub struct ExtractLoadResult {
    pub entity: String,
    pub table_ref: TableRef,
    /// Rows handed to the warehouse after cleaning
    pub number_of_rows: usize,
    pub outcome: LoadOutcome,
}

#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(LoadJobSummary),
    Failed(LoadError),
}

impl ExtractLoadResult {
    pub fn is_loaded(&self) -> bool {
        matches!(self.outcome, LoadOutcome::Loaded(_))
    }

    pub fn number_of_rows_loaded(&self) -> usize {
        match self.outcome {
            LoadOutcome::Loaded(_) => self.number_of_rows,
            LoadOutcome::Failed(_) => 0,
        }
    }

    pub fn to_report(&self) -> ExtractLoadReport {
        let (status, job_id, error) = match &self.outcome {
            LoadOutcome::Loaded(summary) => (
                ExtractLoadStatus::Loaded,
                Some(summary.job_id.clone()),
                None,
            ),
            LoadOutcome::Failed(e) => (ExtractLoadStatus::LoadFailed, None, Some(error_chain_message(e))),
        };

        ExtractLoadReport {
            entity: self.entity.clone(),
            table: self.table_ref.to_string(),
            number_of_rows: Some(self.number_of_rows),
            number_of_rows_loaded: self.number_of_rows_loaded(),
            status,
            job_id,
            error,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Machine-readable summary of a task handed back to whoever runs it
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractLoadReport {
    pub entity: String,
    pub table: String,
    /// Rows attempted, unknown when the task aborted before reading them
    pub number_of_rows: Option<usize>,
    pub number_of_rows_loaded: usize,
    pub status: ExtractLoadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractLoadReport {
    pub fn aborted(entity: impl Into<String>, table_ref: &TableRef, error: &ExtractLoadError) -> Self {
        Self {
            entity: entity.into(),
            table: table_ref.to_string(),
            number_of_rows: error.number_of_rows(),
            number_of_rows_loaded: 0,
            status: ExtractLoadStatus::Aborted,
            job_id: None,
            error: Some(error_chain_message(error)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtractLoadStatus {
    Loaded,
    LoadFailed,
    Aborted,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Row count of a task as reported on every exit path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCountReport {
    pub entity: String,
    pub table_ref: TableRef,
    pub number_of_rows: usize,
    pub status: ExtractLoadStatus,
}

/// Observes task row counts, including those of failed tasks
pub trait ExtractLoadListener: Send + Sync {
    fn on_row_count(&self, report: &RowCountReport);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug)]
pub enum ExtractLoadError {
    #[error(transparent)]
    TableNotFound(#[from] TableNotFoundError),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error("{source}")]
    Cleaning {
        /// Rows read from the source before cleaning failed
        number_of_rows: usize,
        source: CleaningError,
    },
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl ExtractLoadError {
    pub fn cleaning(number_of_rows: usize, source: CleaningError) -> Self {
        Self::Cleaning {
            number_of_rows,
            source,
        }
    }

    /// Rows attempted before the task was aborted, if it got as far as reading
    pub fn number_of_rows(&self) -> Option<usize> {
        match self {
            Self::Cleaning { number_of_rows, .. } => Some(*number_of_rows),
            Self::TableNotFound(_) | Self::Read(_) | Self::Internal(_) => None,
        }
    }
}

impl From<GetTableError> for ExtractLoadError {
    fn from(value: GetTableError) -> Self {
        match value {
            GetTableError::NotFound(e) => Self::TableNotFound(e),
            GetTableError::Internal(e) => Self::Internal(e),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Joins the messages of an error and all of its sources
pub fn error_chain_message(err: &(dyn Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(e) = source {
        let next = e.to_string();
        if !message.ends_with(&next) {
            message.push_str(": ");
            message.push_str(&next);
        }
        source = e.source();
    }

    message
}
