// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use internal_error::InternalError;
use object_store::ObjectStore;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Resolves buckets into [`ObjectStore`] instances that serve their content
pub trait ObjectStoreRegistry: Send + Sync {
    fn get_store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, InternalError>;
}
