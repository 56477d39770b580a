// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashSet;

use serde_json::Value;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// A single JSON object as it appears in the source files
pub type Record = serde_json::Map<String, Value>;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// In-memory tabular data: an ordered list of named columns and rows holding
/// exactly one JSON value per column. Absent values are stored as `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, InvalidTableShapeError> {
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return Err(InvalidTableShapeError::DuplicateColumn {
                    column: column.clone(),
                });
            }
        }

        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != columns.len())
        {
            return Err(InvalidTableShapeError::RowWidth {
                row,
                expected: columns.len(),
                actual: values.len(),
            });
        }

        Ok(Self { columns, rows })
    }

    /// Table with no columns and no rows
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a table whose columns are the union of all record keys in the
    /// order they were first seen
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for record in &records {
            for key in record.keys() {
                if seen.insert(key.as_str()) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|c| record.remove(c).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Builds a table with exactly the `projection` columns in the given
    /// order. Every record must contain every projected key, keys outside of
    /// the projection are dropped.
    pub fn from_records_projected<S: AsRef<str>>(
        records: Vec<Record>,
        projection: &[S],
    ) -> Result<Self, MissingFieldError> {
        let mut columns: Vec<String> = Vec::with_capacity(projection.len());
        for name in projection {
            let name = name.as_ref();
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }

        let mut rows = Vec::with_capacity(records.len());
        for (record_index, mut record) in records.into_iter().enumerate() {
            let mut row = Vec::with_capacity(columns.len());
            for column in &columns {
                let value = record.remove(column).ok_or_else(|| MissingFieldError {
                    record_index,
                    field: column.clone(),
                })?;
                row.push(value);
            }
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    /// Decodes a JSON document holding an array of objects.
    ///
    /// An empty (or whitespace only) document is an empty table.
    pub fn from_json_slice(
        data: &[u8],
        projection: Option<&[String]>,
    ) -> Result<Self, DecodeTableError> {
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::empty());
        }

        let records = decode_json_records(data)?;

        match projection {
            Some(projection) => Ok(Self::from_records_projected(records, projection)?),
            None => Ok(Self::from_records(records)),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|values| &values[index])
    }

    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |values| &values[index]))
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<Value>> {
        &mut self.rows
    }

    pub fn to_records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|values| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(values.iter().cloned())
                    .collect()
            })
            .collect()
    }

    pub fn into_records(self) -> Vec<Record> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|values| columns.iter().cloned().zip(values).collect())
            .collect()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Parses a JSON array of objects.
///
/// An empty (or whitespace only) document yields no records.
pub fn decode_json_records(data: &[u8]) -> Result<Vec<Record>, MalformedRecordsError> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_slice(data)
        .map_err(|e| MalformedRecordsError::new(format!("Invalid JSON: {e}")))?;

    let Value::Array(elements) = value else {
        return Err(MalformedRecordsError::new(format!(
            "Expected an array of objects but got {}",
            json_type_name(&value)
        )));
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(i, element)| match element {
            Value::Object(record) => Ok(record),
            other => Err(MalformedRecordsError::new(format!(
                "Element {i} is {} but an object was expected",
                json_type_name(&other)
            ))),
        })
        .collect()
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug)]
pub enum DecodeTableError {
    #[error(transparent)]
    Malformed(#[from] MalformedRecordsError),
    #[error(transparent)]
    MissingField(#[from] MissingFieldError),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed records: {message}")]
pub struct MalformedRecordsError {
    pub message: String,
}

impl MalformedRecordsError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Record {record_index} is missing field '{field}'")]
pub struct MissingFieldError {
    pub record_index: usize,
    pub field: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidTableShapeError {
    #[error("Column '{column}' appears more than once")]
    DuplicateColumn { column: String },
    #[error("Row {row} has {actual} values but the table has {expected} columns")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
}
