// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod bi_dataset_refresher;
mod extract_load;
mod object_store_reader;
mod object_store_registry;
mod warehouse_client;

pub use bi_dataset_refresher::*;
pub use extract_load::*;
pub use object_store_reader::*;
pub use object_store_registry::*;
pub use warehouse_client::*;
