// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use techhaus::domain::BiDatasetRefresher;

use super::{CLIError, Command};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct RefreshBiCommand {
    refresher: Arc<dyn BiDatasetRefresher>,
}

impl RefreshBiCommand {
    pub fn new(refresher: Arc<dyn BiDatasetRefresher>) -> Self {
        Self { refresher }
    }
}

#[async_trait::async_trait(?Send)]
impl Command for RefreshBiCommand {
    async fn run(&mut self) -> Result<(), CLIError> {
        self.refresher
            .refresh_dataset()
            .await
            .map_err(CLIError::failure)?;

        eprintln!("{}", console::style("Dataset refresh queued").green().bold());
        Ok(())
    }
}
