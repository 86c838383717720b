// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Engine Configuration
//!
//! The engine configuration includes:
//! - Connection settings passed to `sqlcmd` (server, user, password, database)
//! - Schema query version and optional fetch timeout
//! - An optional captured schema file used instead of `sqlcmd`
//! - Candidate shaping (case variants, sorting, column seeding)
//!
//! Settings come from an optional YAML file and from the host's variable
//! store. Host variables use the `mssql#` prefix:
//!
//! ```json
//! {
//!   "mssql#server": "localhost",
//!   "mssql#user": "sa",
//!   "mssql#password": "secret",
//!   "mssql#db": "shop",
//!   "mssql#query_version": 5,
//!   "mssql#case_variants": 1
//! }
//! ```
//!
//! Connection settings are not validated here. A missing value surfaces as a
//! fetch error on the first completion request.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use mssql_complete_catalog::{
    ConnectionSettings, FileFetcher, QueryVersion, SchemaFetcher, SqlcmdFetcher,
    sqlcmd::DEFAULT_PROGRAM,
};
use mssql_complete_context::VariableScope;

/// Prefix of host variable names
pub const VAR_PREFIX: &str = "mssql#";

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Connection settings for the schema client
    pub connection: ConnectionSettings,

    /// Client program (default `sqlcmd`)
    pub sqlcmd_path: String,

    /// Schema query layout
    pub query_version: QueryVersion,

    /// Upper bound for one fetch; unbounded when unset
    pub fetch_timeout_secs: Option<u64>,

    /// Captured schema output to read instead of running the client
    pub schema_file: Option<PathBuf>,

    /// Emit each candidate in upper and lower case
    pub case_variants: bool,

    /// Sort candidates by word before returning them
    pub sort_candidates: bool,

    /// Also offer every column of every table outside column context
    pub seed_columns: bool,

    /// Where variable declarations are searched
    pub variable_scope: VariableScope,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionSettings::default(),
            sqlcmd_path: DEFAULT_PROGRAM.to_string(),
            query_version: QueryVersion::default(),
            fetch_timeout_secs: None,
            schema_file: None,
            case_variants: true,
            sort_candidates: true,
            seed_columns: false,
            variable_scope: VariableScope::default(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration for the given connection
    pub fn new(connection: ConnectionSettings) -> Self {
        Self {
            connection,
            ..Default::default()
        }
    }

    /// Parse engine config from the host variable store
    pub fn from_host_vars(vars: &Value) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.merge_host_vars(vars)?;
        Ok(config)
    }

    /// Load a YAML config file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Yaml(e.to_string()))
    }

    /// Overlay host variables on this configuration.
    ///
    /// Keys absent from `vars` keep their current value. `null` is treated as
    /// an empty store.
    pub fn merge_host_vars(&mut self, vars: &Value) -> Result<(), ConfigError> {
        let vars = match vars {
            Value::Null => return Ok(()),
            Value::Object(map) => map,
            _ => return Err(ConfigError::NotAnObject),
        };

        if let Some(v) = string_var(vars, "server")? {
            self.connection.server = Some(v);
        }
        if let Some(v) = string_var(vars, "user")? {
            self.connection.user = Some(v);
        }
        if let Some(v) = string_var(vars, "password")? {
            self.connection.password = Some(v);
        }
        if let Some(v) = string_var(vars, "db")? {
            self.connection.database = Some(v);
        }
        if let Some(v) = string_var(vars, "sqlcmd")? {
            self.sqlcmd_path = v;
        }
        if let Some(v) = string_var(vars, "schema_file")? {
            self.schema_file = Some(PathBuf::from(v));
        }
        if let Some(value) = var(vars, "query_version") {
            let raw = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return Err(invalid("query_version", "expected a version number")),
            };
            self.query_version = raw
                .parse::<QueryVersion>()
                .map_err(|reason: String| invalid("query_version", &reason))?;
        }
        if let Some(value) = var(vars, "timeout") {
            let secs = value
                .as_u64()
                .ok_or_else(|| invalid("timeout", "expected a non-negative integer"))?;
            self.fetch_timeout_secs = (secs > 0).then_some(secs);
        }
        if let Some(v) = flag_var(vars, "case_variants")? {
            self.case_variants = v;
        }
        if let Some(v) = flag_var(vars, "sort")? {
            self.sort_candidates = v;
        }
        if let Some(v) = flag_var(vars, "seed_columns")? {
            self.seed_columns = v;
        }
        if let Some(v) = string_var(vars, "variable_scope")? {
            self.variable_scope = match v.as_str() {
                "first_line" => VariableScope::FirstLine,
                "buffer" => VariableScope::Buffer,
                _ => return Err(invalid("variable_scope", "expected 'first_line' or 'buffer'")),
            };
        }

        Ok(())
    }

    /// Connection settings that are still unset
    pub fn missing_connection_settings(&self) -> Vec<&'static str> {
        if self.schema_file.is_some() {
            return Vec::new();
        }
        self.connection.missing()
    }

    /// Build the schema fetcher this configuration describes
    pub fn build_fetcher(&self) -> Arc<dyn SchemaFetcher> {
        if let Some(path) = &self.schema_file {
            return Arc::new(FileFetcher::new(path.clone(), self.query_version));
        }

        let mut fetcher = SqlcmdFetcher::new(self.connection.clone())
            .with_program(self.sqlcmd_path.clone())
            .with_version(self.query_version);
        if let Some(secs) = self.fetch_timeout_secs {
            fetcher = fetcher.with_timeout(Duration::from_secs(secs));
        }
        Arc::new(fetcher)
    }
}

fn var<'a>(vars: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    vars.get(&format!("{}{}", VAR_PREFIX, key))
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: format!("{}{}", VAR_PREFIX, key),
        reason: reason.to_string(),
    }
}

fn string_var(vars: &Map<String, Value>, key: &str) -> Result<Option<String>, ConfigError> {
    match var(vars, key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(key, "expected a string")),
    }
}

/// Booleans may arrive as `true`/`false` or as editor-style `0`/`1`
fn flag_var(vars: &Map<String, Value>, key: &str) -> Result<Option<bool>, ConfigError> {
    match var(vars, key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => Ok(Some(i != 0)),
            None => Err(invalid(key, "expected 0 or 1")),
        },
        Some(_) => Err(invalid(key, "expected a boolean")),
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The host variable store is not a JSON object
    #[error("Host variables must be a JSON object")]
    NotAnObject,

    /// A setting has the wrong type or an unknown value
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    /// The config file could not be read
    #[error("Failed to read config file {path:?}: {reason}")]
    Io { path: PathBuf, reason: String },

    /// The config file is not valid YAML for this structure
    #[error("Invalid config file: {0}")]
    Yaml(String),
}
