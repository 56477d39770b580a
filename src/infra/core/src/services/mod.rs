// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod extract_load_service_impl;
mod extract_load_task;
mod object_store_reader_impl;
mod row_count_reporter;
mod warehouse_table;

pub use extract_load_service_impl::*;
pub use extract_load_task::*;
pub use object_store_reader_impl::*;
pub use row_count_reporter::*;
pub use warehouse_table::*;
