// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use techhaus::EntityCatalog;
use techhaus::domain::{ExtractLoadReport, ExtractLoadService, ExtractLoadStatus};

use super::{CLIError, Command};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct ExtractCommand {
    entity_catalog: Arc<EntityCatalog>,
    extract_load_svc: Arc<dyn ExtractLoadService>,
    entity_names: Vec<String>,
}

impl ExtractCommand {
    pub fn new(
        entity_catalog: Arc<EntityCatalog>,
        extract_load_svc: Arc<dyn ExtractLoadService>,
        entity_names: Vec<String>,
    ) -> Self {
        Self {
            entity_catalog,
            extract_load_svc,
            entity_names,
        }
    }

    /// Runs the selected entities one after another, `on_report` is called as
    /// soon as each of them finishes
    pub async fn extract_all(
        &self,
        mut on_report: impl FnMut(&ExtractLoadReport),
    ) -> Result<Vec<ExtractLoadReport>, CLIError> {
        let entities = self
            .entity_catalog
            .select(self.entity_names.as_slice())
            .map_err(CLIError::usage_error_from)?;

        let mut reports = Vec::with_capacity(entities.len());

        for entity in entities {
            let report = match self.extract_load_svc.extract_load(entity).await {
                Ok(result) => result.to_report(),
                Err(err) => {
                    tracing::error!(
                        entity = %entity.name,
                        error = ?err,
                        error_msg = %err,
                        "Extract-load task aborted",
                    );
                    ExtractLoadReport::aborted(&entity.name, &entity.table, &err)
                }
            };

            on_report(&report);
            reports.push(report);
        }

        Ok(reports)
    }
}

#[async_trait::async_trait(?Send)]
impl Command for ExtractCommand {
    async fn run(&mut self) -> Result<(), CLIError> {
        let reports = self
            .extract_all(|report| match serde_json::to_string(report) {
                Ok(line) => println!("{line}"),
                Err(err) => tracing::error!(error = ?err, "Failed to serialize report"),
            })
            .await?;

        let num_failed = reports
            .iter()
            .filter(|r| r.status != ExtractLoadStatus::Loaded)
            .count();

        if num_failed != 0 {
            return Err(CLIError::failure(ExtractFailedError {
                num_failed,
                num_total: reports.len(),
            }));
        }

        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, thiserror::Error)]
#[error("{num_failed} of {num_total} entities failed to load")]
pub struct ExtractFailedError {
    pub num_failed: usize,
    pub num_total: usize,
}
