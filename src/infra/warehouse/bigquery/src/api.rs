// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Subset of the BigQuery v2 REST resources used by the client

use techhaus_core::ColumnSchema;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableResource {
    pub schema: Option<TableSchema>,
    /// Int64 values are transferred as strings
    pub num_rows: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub(crate) struct TableSchema {
    #[serde(default)]
    pub fields: Vec<ColumnSchema>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobInsertRequest<'a> {
    pub configuration: JobConfiguration<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_reference: Option<JobReferenceRequest<'a>>,
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct JobConfiguration<'a> {
    pub load: JobConfigurationLoad<'a>,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobConfigurationLoad<'a> {
    pub destination_table: TableReference<'a>,
    pub source_format: &'static str,
    pub write_disposition: &'static str,
    pub create_disposition: &'static str,
    pub schema: LoadSchema<'a>,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableReference<'a> {
    pub project_id: &'a str,
    pub dataset_id: &'a str,
    pub table_id: &'a str,
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct LoadSchema<'a> {
    pub fields: &'a [ColumnSchema],
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobReferenceRequest<'a> {
    pub project_id: &'a str,
    pub location: &'a str,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Job {
    pub job_reference: JobReference,
    pub status: JobStatus,
    pub statistics: Option<JobStatistics>,
}

impl Job {
    pub fn is_done(&self) -> bool {
        self.status.state == "DONE"
    }

    pub fn output_rows(&self) -> Option<u64> {
        self.statistics
            .as_ref()?
            .load
            .as_ref()?
            .output_rows
            .as_ref()?
            .parse()
            .ok()
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobReference {
    pub project_id: String,
    pub job_id: String,
    pub location: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobStatus {
    pub state: String,
    pub error_result: Option<ErrorProto>,
    #[serde(default)]
    pub errors: Vec<ErrorProto>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct JobStatistics {
    pub load: Option<JobStatisticsLoad>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobStatisticsLoad {
    pub output_rows: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorProto {
    pub reason: Option<String>,
    pub message: Option<String>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorResponseBody,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponseBody {
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ErrorProto>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
