// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod extract_command;
mod inspect_table_command;
mod list_command;
mod refresh_bi_command;

pub use extract_command::*;
pub use inspect_table_command::*;
pub use list_command::*;
pub use refresh_bi_command::*;

pub use crate::error::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait(?Send)]
pub trait Command {
    async fn run(&mut self) -> Result<(), CLIError>;
}
