// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt;

use crate::{CleaningRule, TableRef};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Static description of one extract/load task: where the raw records live,
/// which warehouse table receives them and what cleaning happens in between
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct EntitySpec {
    pub name: String,
    pub table: TableRef,
    pub source: ObjectLocation,

    /// Restrict records to the destination table columns before cleaning
    #[serde(default = "EntitySpec::default_project_to_table_columns")]
    pub project_to_table_columns: bool,

    #[serde(default)]
    pub rules: Vec<CleaningRule>,
}

impl EntitySpec {
    fn default_project_to_table_columns() -> bool {
        true
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}
