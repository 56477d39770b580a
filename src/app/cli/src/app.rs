// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use dill::CatalogBuilder;
use techhaus::domain::WarehouseClient;
use techhaus::*;
use techhaus_adapter_powerbi::PowerBiDatasetRefresher;
use techhaus_warehouse_bigquery::{
    AccessTokenProviderEnv,
    AccessTokenProviderMetadata,
    WarehouseClientBigQuery,
};
use techhaus_warehouse_inmem::WarehouseClientInMemory;
use time_source::SystemTimeSourceDefault;

use crate::config::{self, CLIConfig, ObjectStoreConfig, TokenSource, WarehouseConfig};
use crate::error::CLIError;
use crate::{cli, cli_commands};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub const BINARY_NAME: &str = "techhaus";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub async fn run(args: cli::Cli) -> Result<(), CLIError> {
    let config = match config::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", console::style(err.pretty()).red());
            return Err(err);
        }
    };

    let guard = observability::init::init(BINARY_NAME, config.logging.format, args.verbose);
    observability::panic_handler::set_hook_trace_panics(true);

    tracing::info!(
        version = VERSION,
        args = ?std::env::args().collect::<Vec<_>>(),
        "Initializing {BINARY_NAME}"
    );
    tracing::debug!(?config, "Loaded configuration");

    let result = match configure_catalog(&config) {
        Ok(mut catalog_builder) => {
            let catalog = catalog_builder.build();
            match cli_commands::get_command(&catalog, args) {
                Ok(mut command) => command.run().await,
                Err(e) => Err(e),
            }
        }
        Err(e) => Err(e),
    };

    match &result {
        Ok(()) => {
            tracing::info!("Command successful");
        }
        Err(err) => {
            tracing::error!(
                error_dbg = ?err,
                error = %err.pretty(),
                "Command failed",
            );
            eprintln!("{}", console::style(err.pretty()).red());
        }
    }

    // Flush all logging sinks
    drop(guard);

    result
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Catalog
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub fn configure_catalog(config: &CLIConfig) -> Result<CatalogBuilder, CLIError> {
    let mut b = CatalogBuilder::new();

    b.add::<SystemTimeSourceDefault>();

    match &config.object_store {
        ObjectStoreConfig::S3(s3) => {
            b.add_value(s3.clone());
            b.add::<ObjectStoreRegistryS3>();
        }
        ObjectStoreConfig::Local(local) => {
            b.add_value(local.to_local_store_config());
            b.add::<ObjectStoreRegistryLocalFs>();
        }
    }
    b.add::<ObjectStoreReaderImpl>();

    match &config.warehouse {
        WarehouseConfig::BigQuery(bigquery) => {
            b.add_value(bigquery.to_bigquery_config()?);
            match bigquery.token_source {
                TokenSource::Env => b.add::<AccessTokenProviderEnv>(),
                TokenSource::Metadata => b.add::<AccessTokenProviderMetadata>(),
            };
            b.add::<WarehouseClientBigQuery>();
        }
        WarehouseConfig::InMemory(in_memory) => {
            b.add_value(in_memory.to_warehouse_client()?);
            b.bind::<dyn WarehouseClient, WarehouseClientInMemory>();
        }
    }

    b.add_value(config.entity_catalog()?);
    b.add::<ExtractLoadServiceImpl>();

    if let Some(power_bi) = &config.power_bi {
        let password_from_env = std::env::var(config::POWERBI_PASSWORD_ENV_VAR).ok();
        b.add_value(power_bi.to_powerbi_config(password_from_env)?);
        b.add::<PowerBiDatasetRefresher>();
    }

    Ok(b)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
