// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod extract_load_listener_collecting;
mod object_store_registry_fixed;

pub use extract_load_listener_collecting::*;
pub use object_store_registry_fixed::*;
