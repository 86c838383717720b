// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # sqlcmd schema fetcher
//!
//! Runs the SQL Server command-line client once per fetch and parses its
//! output.
//!
//! The client is invoked with `-h-1` (no column headers), `-W` (trim
//! trailing spaces), `-s ,` (comma separator) and `-Q` (run the query and
//! exit). Row-count footers are suppressed by `set nocount on` at the top of
//! the query batch.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mssql_complete_catalog::{ConnectionSettings, SchemaFetcher, SqlcmdFetcher};
//!
//! let fetcher = SqlcmdFetcher::new(ConnectionSettings {
//!     server: Some("localhost".into()),
//!     user: Some("sa".into()),
//!     password: Some("secret".into()),
//!     database: Some("shop".into()),
//! });
//! let rows = fetcher.fetch().await?;
//! ```

use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::metadata::SchemaRow;
use crate::query::QueryVersion;
use crate::r#trait::SchemaFetcher;
use crate::rows::parse_output;

/// Default client program name
pub const DEFAULT_PROGRAM: &str = "sqlcmd";

/// Connection parameters passed to the client
///
/// Values are not validated up front; a missing value makes the fetch fail.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    pub server: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

impl ConnectionSettings {
    /// Names of settings that are unset or empty
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("server", &self.server),
            ("user", &self.user),
            ("password", &self.password),
            ("database", &self.database),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
        .map(|(name, _)| name)
        .collect()
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("server", &self.server)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .finish()
    }
}

/// Schema fetcher backed by the `sqlcmd` client
#[derive(Debug, Clone)]
pub struct SqlcmdFetcher {
    connection: ConnectionSettings,
    program: String,
    version: QueryVersion,
    timeout: Option<Duration>,
}

impl SqlcmdFetcher {
    /// Create a fetcher for the default program and query version
    pub fn new(connection: ConnectionSettings) -> Self {
        Self {
            connection,
            program: DEFAULT_PROGRAM.to_string(),
            version: QueryVersion::default(),
            timeout: None,
        }
    }

    /// Builder method: set the client program path
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Builder method: set the query version
    pub fn with_version(mut self, version: QueryVersion) -> Self {
        self.version = version;
        self
    }

    /// Builder method: bound the client run time
    ///
    /// Without a timeout a hung client blocks the fetch indefinitely.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn version(&self) -> QueryVersion {
        self.version
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Command-line arguments for the client
    pub fn args(&self) -> Vec<String> {
        let value = |v: &Option<String>| v.clone().unwrap_or_default();
        vec![
            "-S".to_string(),
            value(&self.connection.server),
            "-U".to_string(),
            value(&self.connection.user),
            "-P".to_string(),
            value(&self.connection.password),
            "-d".to_string(),
            value(&self.connection.database),
            "-h-1".to_string(),
            "-W".to_string(),
            "-s".to_string(),
            ",".to_string(),
            "-Q".to_string(),
            self.version.sql(),
        ]
    }

    async fn run(&self) -> CatalogResult<String> {
        let missing = self.connection.missing();
        if !missing.is_empty() {
            return Err(CatalogError::Configuration(format!(
                "missing connection settings: {}",
                missing.join(", ")
            )));
        }

        let mut command = Command::new(&self.program);
        command
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, command.output())
                .await
                .map_err(|_| CatalogError::Timeout(timeout.as_secs()))?,
            None => command.output().await,
        }
        .map_err(|e| CatalogError::Spawn {
            program: self.program.clone(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            // sqlcmd reports login errors on stdout
            let stderr = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            warn!(status = %output.status, "Schema client exited with failure");
            return Err(CatalogError::FetchFailed {
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait::async_trait]
impl SchemaFetcher for SqlcmdFetcher {
    #[instrument(skip(self), fields(program = %self.program, version = %self.version))]
    async fn fetch(&self) -> CatalogResult<Vec<SchemaRow>> {
        let stdout = self.run().await?;
        debug!(bytes = stdout.len(), "Schema client finished");
        parse_output(&stdout, self.version)
    }

    fn describe(&self) -> String {
        format!(
            "{} {}/{}",
            self.program,
            self.connection.server.as_deref().unwrap_or("<unset>"),
            self.connection.database.as_deref().unwrap_or("<unset>")
        )
    }
}
