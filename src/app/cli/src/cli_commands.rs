// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use dill::Catalog;
use techhaus::domain::BiDatasetRefresher;

use crate::cli;
use crate::commands::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub fn get_command(catalog: &Catalog, args: cli::Cli) -> Result<Box<dyn Command>, CLIError> {
    let command: Box<dyn Command> = match args.command {
        cli::Command::List(_) => Box::new(ListCommand::new(catalog.get_one()?)),

        cli::Command::Extract(c) => Box::new(ExtractCommand::new(
            catalog.get_one()?,
            catalog.get_one()?,
            c.entity,
        )),

        cli::Command::RefreshBi(_) => {
            let refresher = match catalog.get_one::<dyn BiDatasetRefresher>() {
                Ok(refresher) => refresher,
                Err(dill::InjectionError::Unregistered(_)) => {
                    return Err(CLIError::usage_error(
                        "Power BI is not configured, add the 'powerBi' section to the config",
                    ));
                }
                Err(e) => return Err(e.into()),
            };
            Box::new(RefreshBiCommand::new(refresher))
        }

        cli::Command::InspectTable(c) => {
            Box::new(InspectTableCommand::new(catalog.get_one()?, c.table))
        }
    };

    Ok(command)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
