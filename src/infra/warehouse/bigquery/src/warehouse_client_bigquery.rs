// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use http::StatusCode;
use http_common::endpoint_url;
use internal_error::*;
use techhaus_core::*;

use crate::api::*;
use crate::{AccessTokenProvider, BigQueryConfig};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

const MULTIPART_BOUNDARY: &str = "techhaus_load_job_6f1d2c";

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Talks to the BigQuery v2 REST API: `tables.get` for metadata and
/// multipart `jobs.insert` + `jobs.get` polling for loads
pub struct WarehouseClientBigQuery {
    config: Arc<BigQueryConfig>,
    token_provider: Arc<dyn AccessTokenProvider>,
    http_client: reqwest::Client,
}

#[dill::component(pub)]
#[dill::interface(dyn WarehouseClient)]
#[dill::scope(dill::Singleton)]
impl WarehouseClientBigQuery {
    pub fn new(config: Arc<BigQueryConfig>, token_provider: Arc<dyn AccessTokenProvider>) -> Self {
        Self {
            config,
            token_provider,
            http_client: reqwest::Client::new(),
        }
    }

    async fn insert_load_job(
        &self,
        token: &str,
        table_ref: &TableRef,
        schema: &[ColumnSchema],
        data: Vec<u8>,
    ) -> Result<Job, LoadJobError> {
        let url = endpoint_url(
            &self.config.upload_url,
            &["upload", "bigquery", "v2", "projects", &table_ref.project, "jobs"],
        )?;

        let request = JobInsertRequest {
            configuration: JobConfiguration {
                load: JobConfigurationLoad {
                    destination_table: TableReference {
                        project_id: &table_ref.project,
                        dataset_id: &table_ref.dataset,
                        table_id: &table_ref.table,
                    },
                    source_format: "NEWLINE_DELIMITED_JSON",
                    write_disposition: "WRITE_TRUNCATE",
                    create_disposition: "CREATE_NEVER",
                    schema: LoadSchema { fields: schema },
                },
            },
            job_reference: self
                .config
                .location
                .as_deref()
                .map(|location| JobReferenceRequest {
                    project_id: &table_ref.project,
                    location,
                }),
        };

        let body = multipart_related_body(&serde_json::to_vec(&request).int_err()?, &data)?;

        let response = self
            .http_client
            .post(url)
            .query(&[("uploadType", "multipart")])
            .bearer_auth(token)
            .header(
                http::header::CONTENT_TYPE,
                format!("multipart/related; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(body)
            .send()
            .await
            .int_err()?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.int_err()?;
            return Err(rejected_by_api(status, &body).into());
        }

        let job = response
            .error_for_status()
            .int_err()?
            .json::<Job>()
            .await
            .context_int_err("decoding jobs.insert response")?;

        Ok(job)
    }

    async fn get_job(&self, token: &str, job_reference: &JobReference) -> Result<Job, InternalError> {
        let url = endpoint_url(
            &self.config.api_url,
            &[
                "bigquery",
                "v2",
                "projects",
                &job_reference.project_id,
                "jobs",
                &job_reference.job_id,
            ],
        )?;

        let mut request = self.http_client.get(url).bearer_auth(token);
        if let Some(location) = job_reference.location.as_ref().or(self.config.location.as_ref()) {
            request = request.query(&[("location", location)]);
        }

        request
            .send()
            .await
            .int_err()?
            .error_for_status()
            .int_err()?
            .json::<Job>()
            .await
            .context_int_err("decoding jobs.get response")
    }
}

#[async_trait::async_trait]
impl WarehouseClient for WarehouseClientBigQuery {
    #[tracing::instrument(
        level = "debug",
        name = "WarehouseClientBigQuery::get_table",
        skip_all,
        fields(%table_ref),
    )]
    async fn get_table(&self, table_ref: &TableRef) -> Result<TableMetadata, GetTableError> {
        let url = endpoint_url(
            &self.config.api_url,
            &[
                "bigquery",
                "v2",
                "projects",
                &table_ref.project,
                "datasets",
                &table_ref.dataset,
                "tables",
                &table_ref.table,
            ],
        )?;

        let token = self.token_provider.access_token().await?;

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .int_err()?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(TableNotFoundError {
                table_ref: table_ref.clone(),
            }
            .into());
        }

        let resource = response
            .error_for_status()
            .int_err()?
            .json::<TableResource>()
            .await
            .context_int_err("decoding tables.get response")?;

        let schema = resource.schema.map(|s| s.fields).unwrap_or_default();
        let num_rows = resource.num_rows.and_then(|n| n.parse().ok());

        tracing::debug!(num_columns = schema.len(), ?num_rows, "Resolved table");

        Ok(TableMetadata {
            table_ref: table_ref.clone(),
            schema,
            num_rows,
        })
    }

    #[tracing::instrument(
        level = "info",
        name = "WarehouseClientBigQuery::load_truncate",
        skip_all,
        fields(%table_ref, num_rows = rows.len()),
    )]
    async fn load_truncate(
        &self,
        table_ref: &TableRef,
        schema: &[ColumnSchema],
        rows: Vec<Record>,
    ) -> Result<LoadJobSummary, LoadJobError> {
        let data = encode_ndjson(&rows)?;
        drop(rows);

        let token = self.token_provider.access_token().await?;

        let mut job = self.insert_load_job(&token, table_ref, schema, data).await?;

        tracing::info!(job_id = %job.job_reference.job_id, "Submitted load job");

        while !job.is_done() {
            tracing::debug!(job_id = %job.job_reference.job_id, state = %job.status.state, "Waiting for load job");
            tokio::time::sleep(self.config.poll_interval).await;
            job = self.get_job(&token, &job.job_reference).await?;
        }

        if let Some(error_result) = job.status.error_result {
            for e in &job.status.errors {
                tracing::warn!(reason = ?e.reason, message = ?e.message, "Load job error detail");
            }

            return Err(LoadJobRejectedError {
                job_id: Some(job.job_reference.job_id),
                reason: error_result.reason,
                message: error_result.message.unwrap_or_default(),
            }
            .into());
        }

        let summary = LoadJobSummary {
            output_rows: job.output_rows(),
            job_id: job.job_reference.job_id,
        };

        tracing::info!(job_id = %summary.job_id, output_rows = ?summary.output_rows, "Load job finished");

        Ok(summary)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn encode_ndjson(rows: &[Record]) -> Result<Vec<u8>, InternalError> {
    let mut buf = Vec::new();
    for row in rows {
        serde_json::to_writer(&mut buf, row).int_err()?;
        buf.push(b'\n');
    }
    Ok(buf)
}

fn multipart_related_body(metadata: &[u8], data: &[u8]) -> Result<Vec<u8>, InternalError> {
    let delimiter = format!("--{MULTIPART_BOUNDARY}");

    if data
        .windows(delimiter.len())
        .any(|w| w == delimiter.as_bytes())
    {
        return InternalError::bail("Load data contains the multipart boundary");
    }

    let mut body = Vec::with_capacity(metadata.len() + data.len() + 256);
    body.extend_from_slice(delimiter.as_bytes());
    body.extend_from_slice(b"\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata);
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(delimiter.as_bytes());
    body.extend_from_slice(b"\r\nContent-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(delimiter.as_bytes());
    body.extend_from_slice(b"--\r\n");
    Ok(body)
}

fn rejected_by_api(status: StatusCode, body: &str) -> LoadJobRejectedError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(response) => LoadJobRejectedError {
            job_id: None,
            reason: response.error.errors.into_iter().find_map(|e| e.reason),
            message: response.error.message,
        },
        Err(_) => LoadJobRejectedError {
            job_id: None,
            reason: None,
            message: format!("HTTP {status}: {body}"),
        },
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
