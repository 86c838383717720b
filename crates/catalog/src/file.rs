// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # File-backed schema fetcher
//!
//! Reads previously captured client output (for example
//! `sqlcmd ... -Q "<query>" > schema.csv`) so completion works without a
//! database connection.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CatalogError, CatalogResult};
use crate::metadata::SchemaRow;
use crate::query::QueryVersion;
use crate::r#trait::SchemaFetcher;
use crate::rows::parse_output;

/// Schema fetcher reading captured query output from disk
#[derive(Debug, Clone)]
pub struct FileFetcher {
    path: PathBuf,
    version: QueryVersion,
}

impl FileFetcher {
    pub fn new(path: impl Into<PathBuf>, version: QueryVersion) -> Self {
        Self {
            path: path.into(),
            version,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl SchemaFetcher for FileFetcher {
    async fn fetch(&self) -> CatalogResult<Vec<SchemaRow>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CatalogError::Io(format!("{}: {}", self.path.display(), e)))?;
        debug!(path = %self.path.display(), "Loaded captured schema output");
        parse_output(&content, self.version)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
