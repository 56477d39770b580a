// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

use crate::{DateTimeFormat, Table, format_datetime_canonical, parse_datetime, title_case};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// A deterministic transform applied to a table between fetch and load
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", deny_unknown_fields)]
pub enum CleaningRule {
    /// Replaces textual values with their canonical UTC date-time form
    #[serde(rename_all = "camelCase")]
    ParseDateTime {
        column: String,
        #[serde(default)]
        format: DateTimeFormat,
        #[serde(default)]
        on_error: OnParseError,
    },
    NormalizeText {
        column: String,
        op: TextOp,
    },
    /// Removes rows with duplicate values across `subset` (all columns when
    /// empty). Surviving rows keep their relative order.
    Dedupe {
        subset: Vec<String>,
        #[serde(default)]
        keep: Keep,
    },
    /// Stable sort, nulls always go last
    Sort {
        by: Vec<String>,
        #[serde(default = "CleaningRule::default_ascending")]
        ascending: bool,
    },
    FilterNotNull {
        column: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OnParseError {
    /// Unparsable values become `null`
    Coerce,
    /// Unparsable values fail the whole batch
    #[default]
    Raise,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", deny_unknown_fields)]
pub enum TextOp {
    Title,
    /// Literal substitution of all occurrences
    Replace { from: String, to: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Keep {
    #[default]
    First,
    Last,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl CleaningRule {
    fn default_ascending() -> bool {
        true
    }

    pub fn parse_datetime(column: impl Into<String>, on_error: OnParseError) -> Self {
        Self::ParseDateTime {
            column: column.into(),
            format: DateTimeFormat::Mixed,
            on_error,
        }
    }

    pub fn title(column: impl Into<String>) -> Self {
        Self::NormalizeText {
            column: column.into(),
            op: TextOp::Title,
        }
    }

    pub fn replace(column: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::NormalizeText {
            column: column.into(),
            op: TextOp::Replace {
                from: from.into(),
                to: to.into(),
            },
        }
    }

    pub fn dedupe<S: Into<String>>(subset: impl IntoIterator<Item = S>, keep: Keep) -> Self {
        Self::Dedupe {
            subset: subset.into_iter().map(Into::into).collect(),
            keep,
        }
    }

    pub fn sort<S: Into<String>>(by: impl IntoIterator<Item = S>) -> Self {
        Self::Sort {
            by: by.into_iter().map(Into::into).collect(),
            ascending: true,
        }
    }

    pub fn filter_not_null(column: impl Into<String>) -> Self {
        Self::FilterNotNull {
            column: column.into(),
        }
    }

    pub fn apply(&self, table: &mut Table) -> Result<(), CleaningError> {
        match self {
            Self::ParseDateTime {
                column,
                format,
                on_error,
            } => {
                let index = self.resolve_column(table, column)?;
                apply_parse_datetime(table, index, column, format, *on_error)
            }
            Self::NormalizeText { column, op } => {
                let index = self.resolve_column(table, column)?;
                for row in table.rows_mut() {
                    if let Value::String(s) = &mut row[index] {
                        *s = match op {
                            TextOp::Title => title_case(s),
                            TextOp::Replace { from, to } if !from.is_empty() => s.replace(from, to),
                            TextOp::Replace { .. } => continue,
                        };
                    }
                }
                Ok(())
            }
            Self::Dedupe { subset, keep } => {
                let indices = if subset.is_empty() {
                    (0..table.num_columns()).collect()
                } else {
                    self.resolve_columns(table, subset)?
                };
                apply_dedupe(table, &indices, *keep);
                Ok(())
            }
            Self::Sort { by, ascending } => {
                let indices = self.resolve_columns(table, by)?;
                table.rows_mut().sort_by(|a, b| {
                    indices
                        .iter()
                        .map(|&i| compare_nulls_last(&a[i], &b[i], *ascending))
                        .find(|o| *o != Ordering::Equal)
                        .unwrap_or(Ordering::Equal)
                });
                Ok(())
            }
            Self::FilterNotNull { column } => {
                let index = self.resolve_column(table, column)?;
                table.rows_mut().retain(|row| !row[index].is_null());
                Ok(())
            }
        }
    }

    fn resolve_column(&self, table: &Table, column: &str) -> Result<usize, CleaningError> {
        table
            .column_index(column)
            .ok_or_else(|| CleaningError::UnknownColumn {
                rule: self.to_string(),
                column: column.to_string(),
            })
    }

    fn resolve_columns(&self, table: &Table, columns: &[String]) -> Result<Vec<usize>, CleaningError> {
        columns
            .iter()
            .map(|c| self.resolve_column(table, c))
            .collect()
    }
}

/// Applies rules in order, stopping at the first failure
pub fn apply_rules(rules: &[CleaningRule], table: &mut Table) -> Result<(), CleaningError> {
    for rule in rules {
        let num_rows_before = table.num_rows();
        rule.apply(table)?;

        tracing::debug!(
            %rule,
            num_rows_before,
            num_rows_after = table.num_rows(),
            "Applied cleaning rule"
        );
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn apply_parse_datetime(
    table: &mut Table,
    index: usize,
    column: &str,
    format: &DateTimeFormat,
    on_error: OnParseError,
) -> Result<(), CleaningError> {
    let mut parsed = Vec::with_capacity(table.num_rows());

    for (row, values) in table.rows().iter().enumerate() {
        let value = match &values[index] {
            Value::Null => Value::Null,
            Value::String(s) if s.trim().is_empty() => Value::Null,
            Value::String(s) => match parse_datetime(s, format) {
                Some(dt) => Value::String(format_datetime_canonical(&dt)),
                None => unparsable(column, row, &values[index], on_error)?,
            },
            other => unparsable(column, row, other, on_error)?,
        };
        parsed.push(value);
    }

    for (values, value) in table.rows_mut().iter_mut().zip(parsed) {
        values[index] = value;
    }
    Ok(())
}

fn unparsable(
    column: &str,
    row: usize,
    value: &Value,
    on_error: OnParseError,
) -> Result<Value, CleaningError> {
    match on_error {
        OnParseError::Coerce => Ok(Value::Null),
        OnParseError::Raise => Err(UnparsableDateTimeError {
            column: column.to_string(),
            row,
            value: value.to_string(),
        }
        .into()),
    }
}

fn apply_dedupe(table: &mut Table, indices: &[usize], keep: Keep) {
    let num_rows = table.num_rows();
    let rows = table.rows();

    let mut seen = HashSet::new();
    let mut survivors = vec![false; num_rows];

    for n in 0..num_rows {
        let i = match keep {
            Keep::First => n,
            Keep::Last => num_rows - 1 - n,
        };
        let key: Vec<String> = indices.iter().map(|&c| dedupe_key(&rows[i][c])).collect();
        if seen.insert(key) {
            survivors[i] = true;
        }
    }

    let mut survivors = survivors.into_iter();
    table
        .rows_mut()
        .retain(|_| survivors.next().unwrap_or(false));
}

/// Numbers compare by value, so `1` and `1.0` produce the same key
fn dedupe_key(value: &Value) -> String {
    match value {
        // Adding zero folds -0.0 into 0.0
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map_or_else(|| n.to_string(), |f| (f + 0.0).to_string()),
        other => other.to_string(),
    }
}

fn compare_nulls_last(a: &Value, b: &Value, ascending: bool) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) if ascending => compare_values(a, b),
        (false, false) => compare_values(b, a),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => match (a.as_u64(), b.as_u64()) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => a
                    .as_f64()
                    .partial_cmp(&b.as_f64())
                    .unwrap_or(Ordering::Equal),
            },
        },
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (a, b) if rank(a) == rank(b) => a.to_string().cmp(&b.to_string()),
        (a, b) => rank(a).cmp(&rank(b)),
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl fmt::Display for CleaningRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseDateTime {
                column,
                format,
                on_error,
            } => {
                let on_error = match on_error {
                    OnParseError::Coerce => "coerce",
                    OnParseError::Raise => "raise",
                };
                write!(f, "parse-datetime({column}, {format}, {on_error})")
            }
            Self::NormalizeText {
                column,
                op: TextOp::Title,
            } => write!(f, "title({column})"),
            Self::NormalizeText {
                column,
                op: TextOp::Replace { from, to },
            } => write!(f, "replace({column}, {from:?} -> {to:?})"),
            Self::Dedupe { subset, keep } => {
                let keep = match keep {
                    Keep::First => "first",
                    Keep::Last => "last",
                };
                write!(f, "dedupe([{}], keep={keep})", subset.join(", "))
            }
            Self::Sort { by, ascending } => write!(
                f,
                "sort([{}], {})",
                by.join(", "),
                if *ascending { "asc" } else { "desc" }
            ),
            Self::FilterNotNull { column } => write!(f, "filter-not-null({column})"),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CleaningError {
    #[error("Rule {rule} references unknown column '{column}'")]
    UnknownColumn { rule: String, column: String },
    #[error(transparent)]
    UnparsableDateTime(#[from] UnparsableDateTimeError),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot parse {value} in column '{column}' at row {row} as a date-time")]
pub struct UnparsableDateTimeError {
    pub column: String,
    pub row: usize,
    pub value: String,
}
