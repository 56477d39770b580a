// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::PathBuf;

use techhaus::domain::TableRef;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, clap::Parser)]
#[command(name = crate::BINARY_NAME, version, about)]
pub struct Cli {
    /// Sets the level of verbosity (repeat for more)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the config file, defaults to `$TECHHAUS_CONFIG` or
    /// `./techhaus.yaml`
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    List(List),
    Extract(Extract),
    RefreshBi(RefreshBi),
    InspectTable(InspectTable),
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Lists entities with their source objects, destination tables and cleaning
/// rules
#[derive(Debug, clap::Args)]
pub struct List {}

/// Extracts entities from object storage and loads them into the warehouse
#[derive(Debug, clap::Args)]
#[command(after_help = r#"
Entities are processed one after another. A failure of one entity does not stop the remaining ones, but makes the command exit with a non-zero code.

**Examples:**

Load all entities:

    techhaus extract

Load only customers and logins:

    techhaus extract customers login
"#)]
pub struct Extract {
    /// Entity names, all entities when omitted
    #[arg(value_name = "ENTITY")]
    pub entity: Vec<String>,
}

/// Queues a refresh of the Power BI dataset
#[derive(Debug, clap::Args)]
pub struct RefreshBi {}

/// Shows the schema of a warehouse table
#[derive(Debug, clap::Args)]
pub struct InspectTable {
    /// Fully qualified table name, e.g. `activeTix.raw.raw_customers`
    #[arg(value_name = "TABLE")]
    pub table: TableRef,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
