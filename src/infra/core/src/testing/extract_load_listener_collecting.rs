// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Mutex;

use techhaus_core::{ExtractLoadListener, RowCountReport};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Default)]
pub struct ExtractLoadListenerCollecting {
    reports: Mutex<Vec<RowCountReport>>,
}

impl ExtractLoadListenerCollecting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<RowCountReport> {
        self.reports.lock().unwrap().clone()
    }
}

impl ExtractLoadListener for ExtractLoadListenerCollecting {
    fn on_row_count(&self, report: &RowCountReport) {
        self.reports.lock().unwrap().push(report.clone());
    }
}
