// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::InternalError;

use crate::{DecodeTableError, MalformedRecordsError, MissingFieldError, ObjectLocation, Table};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
pub trait ObjectStoreReader: Send + Sync {
    /// Fetches a JSON array of objects and materializes it as a [`Table`].
    ///
    /// With a projection every record is reduced to exactly the projected
    /// keys, in the projection order.
    async fn read_table(
        &self,
        location: &ObjectLocation,
        projection: Option<&[String]>,
    ) -> Result<Table, ReadError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    ObjectNotFound(#[from] ObjectNotFoundError),
    #[error(transparent)]
    Malformed(#[from] MalformedRecordsError),
    #[error(transparent)]
    MissingField(#[from] MissingFieldError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl From<DecodeTableError> for ReadError {
    fn from(value: DecodeTableError) -> Self {
        match value {
            DecodeTableError::Malformed(e) => Self::Malformed(e),
            DecodeTableError::MissingField(e) => Self::MissingField(e),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Object {location} not found")]
pub struct ObjectNotFoundError {
    pub location: ObjectLocation,
}
