// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod access_token;
mod api;
mod config;
mod warehouse_client_bigquery;

pub use access_token::*;
pub use config::{BigQueryConfig, DEFAULT_API_URL, DEFAULT_METADATA_URL, DEFAULT_POLL_INTERVAL};
pub use warehouse_client_bigquery::*;
