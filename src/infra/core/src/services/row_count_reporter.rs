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

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Reports the row count of a task when dropped, so the report is emitted on
/// every exit path including early returns and load failures
#[must_use]
pub struct RowCountReporter {
    report: RowCountReport,
    listeners: Vec<Arc<dyn ExtractLoadListener>>,
}

impl RowCountReporter {
    pub fn new(
        entity: impl Into<String>,
        table_ref: TableRef,
        number_of_rows: usize,
        listeners: Vec<Arc<dyn ExtractLoadListener>>,
    ) -> Self {
        Self {
            report: RowCountReport {
                entity: entity.into(),
                table_ref,
                number_of_rows,
                status: ExtractLoadStatus::Aborted,
            },
            listeners,
        }
    }

    pub fn set_number_of_rows(&mut self, number_of_rows: usize) {
        self.report.number_of_rows = number_of_rows;
    }

    pub fn set_status(&mut self, status: ExtractLoadStatus) {
        self.report.status = status;
    }
}

impl Drop for RowCountReporter {
    fn drop(&mut self) {
        let report = &self.report;

        tracing::info!(
            entity = %report.entity,
            table = %report.table_ref,
            number_of_rows = report.number_of_rows,
            status = ?report.status,
            "Total rows {}",
            report.number_of_rows,
        );

        for listener in &self.listeners {
            listener.on_row_count(report);
        }
    }
}
