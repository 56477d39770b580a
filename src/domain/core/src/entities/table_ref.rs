// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt;
use std::str::FromStr;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Fully-qualified warehouse table identifier: `project.dataset.table`
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde_with::SerializeDisplay,
    serde_with::DeserializeFromStr,
)]
pub struct TableRef {
    pub project: String,
    pub dataset: String,
    pub table: String,
}

impl TableRef {
    pub fn new(
        project: impl Into<String>,
        dataset: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
            table: table.into(),
        }
    }
}

impl FromStr for TableRef {
    type Err = InvalidTableRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');

        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(project), Some(dataset), Some(table), None)
                if [project, dataset, table].iter().all(|p| is_valid_part(p)) =>
            {
                Ok(Self::new(project, dataset, table))
            }
            _ => Err(InvalidTableRefError {
                value: s.to_string(),
            }),
        }
    }
}

fn is_valid_part(part: &str) -> bool {
    !part.is_empty() && !part.chars().any(char::is_whitespace)
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid table reference '{value}', expected 'project.dataset.table'")]
pub struct InvalidTableRefError {
    pub value: String,
}
