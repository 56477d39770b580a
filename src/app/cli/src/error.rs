// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::{BoxedError, InternalError};
use techhaus::domain::error_chain_message;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, thiserror::Error)]
pub enum CLIError {
    /// Invalid invocation or configuration, nothing was attempted
    #[error(transparent)]
    UsageError(UsageError),
    /// Command ran but did not succeed
    #[error(transparent)]
    Failure(BoxedError),
}

impl CLIError {
    pub fn usage_error(msg: impl Into<String>) -> Self {
        Self::UsageError(UsageError { msg: msg.into() })
    }

    pub fn usage_error_from(e: impl std::error::Error) -> Self {
        Self::usage_error(e.to_string())
    }

    pub fn failure(e: impl Into<BoxedError>) -> Self {
        Self::Failure(e.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::UsageError(_) => 2,
            Self::Failure(_) => 1,
        }
    }

    /// Message with the whole chain of causes, suitable for the terminal
    pub fn pretty(&self) -> String {
        match self {
            Self::UsageError(e) => e.msg.clone(),
            Self::Failure(e) => error_chain_message(e.as_ref()),
        }
    }
}

impl From<InternalError> for CLIError {
    fn from(e: InternalError) -> Self {
        Self::failure(e)
    }
}

impl From<dill::InjectionError> for CLIError {
    fn from(e: dill::InjectionError) -> Self {
        Self::failure(e)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, thiserror::Error)]
#[error("{msg}")]
pub struct UsageError {
    pub msg: String,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
