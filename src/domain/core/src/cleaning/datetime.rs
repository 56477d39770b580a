// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// How textual date-time values are interpreted.
///
/// Serialized as the plain string `mixed` or as a `chrono` format pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DateTimeFormat {
    /// Infer the layout of every value separately
    #[default]
    Mixed,
    /// Every value must match this `chrono` pattern
    Exact(String),
}

impl From<String> for DateTimeFormat {
    fn from(value: String) -> Self {
        if value == "mixed" {
            Self::Mixed
        } else {
            Self::Exact(value)
        }
    }
}

impl From<DateTimeFormat> for String {
    fn from(value: DateTimeFormat) -> Self {
        match value {
            DateTimeFormat::Mixed => "mixed".to_string(),
            DateTimeFormat::Exact(pattern) => pattern,
        }
    }
}

impl std::fmt::Display for DateTimeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mixed => write!(f, "mixed"),
            Self::Exact(pattern) => write!(f, "{pattern:?}"),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

const ZONED_PATTERNS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const NAIVE_DATETIME_PATTERNS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

const DATE_PATTERNS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Parses a textual date-time. Values without an offset are taken as UTC,
/// values with one are converted to UTC.
pub fn parse_datetime(value: &str, format: &DateTimeFormat) -> Option<DateTime<Utc>> {
    let value = value.trim();

    match format {
        DateTimeFormat::Mixed => parse_mixed(value),
        DateTimeFormat::Exact(pattern) => parse_exact(value, pattern),
    }
}

fn parse_mixed(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    ZONED_PATTERNS
        .iter()
        .find_map(|p| DateTime::parse_from_str(value, p).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NAIVE_DATETIME_PATTERNS
                .iter()
                .find_map(|p| NaiveDateTime::parse_from_str(value, p).ok())
                .map(|dt| dt.and_utc())
        })
        .or_else(|| {
            DATE_PATTERNS
                .iter()
                .find_map(|p| NaiveDate::parse_from_str(value, p).ok())
                .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
        })
}

fn parse_exact(value: &str, pattern: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_str(value, pattern) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, pattern) {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(value, pattern)
        .ok()
        .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
}

/// Canonical text form of a parsed date-time: RFC 3339 in UTC with a `Z`
/// suffix and only as many fractional digits as needed
pub fn format_datetime_canonical(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
