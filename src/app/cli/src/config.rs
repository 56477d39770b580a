// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::{Path, PathBuf};
use std::time::Duration;

use duration_string::DurationString;
use internal_error::*;
use observability::init::LogFormat;
use s3_utils::S3StoreConfig;
use secrecy::SecretString;
use techhaus::domain::{ColumnSchema, EntitySpec, TableRef};
use techhaus::{EntityCatalog, LocalStoreConfig};
use techhaus_adapter_powerbi::PowerBiConfig;
use techhaus_warehouse_bigquery::BigQueryConfig;
use techhaus_warehouse_inmem::WarehouseClientInMemory;
use url::Url;

use crate::error::CLIError;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub const CONFIG_FILENAME: &str = "techhaus.yaml";
pub const CONFIG_PATH_ENV_VAR: &str = "TECHHAUS_CONFIG";
pub const POWERBI_PASSWORD_ENV_VAR: &str = "TECHHAUS_POWERBI_PASSWORD";

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CLIConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub object_store: ObjectStoreConfig,

    #[serde(default)]
    pub warehouse: WarehouseConfig,

    /// Dataset refresh is unavailable when not set
    pub power_bi: Option<PowerBiSection>,

    /// Replaces the built-in entity catalog when set
    pub entities: Option<Vec<EntitySpec>>,
}

impl CLIConfig {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn entity_catalog(&self) -> Result<EntityCatalog, CLIError> {
        match &self.entities {
            None => Ok(EntityCatalog::builtin()),
            Some(entities) => EntityCatalog::new(entities.clone()).map_err(CLIError::usage_error_from),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ObjectStoreConfig {
    S3(S3StoreConfig),
    /// Buckets are directories under `root`, useful for dry runs
    Local(LocalStoreSection),
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self::S3(S3StoreConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct LocalStoreSection {
    pub root: PathBuf,
}

impl LocalStoreSection {
    pub fn to_local_store_config(&self) -> LocalStoreConfig {
        LocalStoreConfig::new(&self.root)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum WarehouseConfig {
    BigQuery(BigQuerySection),
    /// Tables live in process memory, useful for dry runs
    InMemory(InMemorySection),
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self::BigQuery(BigQuerySection::default())
    }
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct BigQuerySection {
    pub api_url: Option<Url>,
    pub upload_url: Option<Url>,
    pub metadata_url: Option<Url>,
    pub location: Option<String>,
    pub poll_interval: Option<DurationString>,
    #[serde(default)]
    pub token_source: TokenSource,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenSource {
    /// Pre-issued token in `GOOGLE_OAUTH_ACCESS_TOKEN`
    #[default]
    Env,
    /// Service account of the GCE / GKE workload
    Metadata,
}

impl BigQuerySection {
    pub fn to_bigquery_config(&self) -> Result<BigQueryConfig, InternalError> {
        let defaults = BigQueryConfig::public()?;

        let api_url = self.api_url.clone().unwrap_or(defaults.api_url);
        let upload_url = self.upload_url.clone().unwrap_or_else(|| api_url.clone());
        let metadata_url = self.metadata_url.clone().unwrap_or(defaults.metadata_url);

        Ok(BigQueryConfig {
            api_url,
            upload_url,
            location: self.location.clone(),
            poll_interval: self
                .poll_interval
                .map_or(defaults.poll_interval, Duration::from),
            metadata_url,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct InMemorySection {
    /// Tables that exist when the run starts, all other tables are missing
    #[serde(default)]
    pub tables: Vec<InMemoryTableSection>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct InMemoryTableSection {
    pub table: TableRef,
    pub schema: Vec<ColumnSchema>,
}

impl InMemorySection {
    pub fn to_warehouse_client(&self) -> Result<WarehouseClientInMemory, CLIError> {
        let warehouse = WarehouseClientInMemory::new();

        for (i, t) in self.tables.iter().enumerate() {
            if self.tables[..i].iter().any(|prev| prev.table == t.table) {
                return Err(CLIError::usage_error(format!(
                    "Table {} is declared more than once",
                    t.table
                )));
            }
            warehouse.create_table(t.table.clone(), t.schema.clone());
        }

        Ok(warehouse)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct PowerBiSection {
    pub tenant_id: String,
    pub app_id: String,
    pub dataset_id: String,
    pub username: String,
    /// Prefer supplying it via `TECHHAUS_POWERBI_PASSWORD`
    pub password: Option<String>,
    pub authority_url: Option<Url>,
    pub api_url: Option<Url>,
}

impl std::fmt::Debug for PowerBiSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PowerBiSection")
            .field("tenant_id", &self.tenant_id)
            .field("app_id", &self.app_id)
            .field("dataset_id", &self.dataset_id)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("authority_url", &self.authority_url)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl PowerBiSection {
    /// Password from the environment takes precedence over the config file
    pub fn to_powerbi_config(
        &self,
        password_from_env: Option<String>,
    ) -> Result<PowerBiConfig, CLIError> {
        let Some(password) = password_from_env.or_else(|| self.password.clone()) else {
            return Err(CLIError::usage_error(format!(
                "Power BI password is not configured, set {POWERBI_PASSWORD_ENV_VAR}"
            )));
        };

        let authority_url = match &self.authority_url {
            Some(url) => url.clone(),
            None => Url::parse(techhaus_adapter_powerbi::DEFAULT_AUTHORITY_URL).int_err()?,
        };
        let api_url = match &self.api_url {
            Some(url) => url.clone(),
            None => Url::parse(techhaus_adapter_powerbi::DEFAULT_API_URL).int_err()?,
        };

        Ok(PowerBiConfig {
            tenant_id: self.tenant_id.clone(),
            app_id: self.app_id.clone(),
            dataset_id: self.dataset_id.clone(),
            username: self.username.clone(),
            password: SecretString::from(password),
            authority_url,
            api_url,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Resolves the config file from `--config`, then `TECHHAUS_CONFIG`, then
/// `techhaus.yaml` in the working directory. Only the latter is optional.
pub fn config_path(explicit_path: Option<&Path>) -> (PathBuf, bool) {
    if let Some(path) = explicit_path {
        return (path.to_path_buf(), true);
    }

    match std::env::var_os(CONFIG_PATH_ENV_VAR) {
        Some(path) => (PathBuf::from(path), true),
        None => (PathBuf::from(CONFIG_FILENAME), false),
    }
}

pub fn load_config(explicit_path: Option<&Path>) -> Result<CLIConfig, CLIError> {
    let (path, required) = config_path(explicit_path);

    if !path.exists() {
        if required {
            return Err(CLIError::usage_error(format!(
                "Config file {} does not exist",
                path.display()
            )));
        }
        return Ok(CLIConfig::default());
    }

    let text = std::fs::read_to_string(&path).context_int_err(format!("reading {}", path.display()))?;

    CLIConfig::from_yaml(&text)
        .map_err(|e| CLIError::usage_error(format!("Invalid config {}: {e}", path.display())))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
