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

use super::{CLIError, Command};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct ListCommand {
    entity_catalog: Arc<EntityCatalog>,
}

impl ListCommand {
    pub fn new(entity_catalog: Arc<EntityCatalog>) -> Self {
        Self { entity_catalog }
    }

    pub fn render(&self) -> String {
        let entities = self.entity_catalog.entities();
        let name_width = entities.iter().map(|e| e.name.len()).max().unwrap_or_default();

        let mut out = String::new();
        for entity in entities {
            out.push_str(&format!(
                "{:<name_width$}  {}  <- {}\n",
                entity.name, entity.table, entity.source
            ));
            for rule in &entity.rules {
                out.push_str(&format!("{:<name_width$}    {rule}\n", ""));
            }
        }
        out
    }
}

#[async_trait::async_trait(?Send)]
impl Command for ListCommand {
    async fn run(&mut self) -> Result<(), CLIError> {
        print!("{}", self.render());
        Ok(())
    }
}
