// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock schema fetcher for testing
//!
//! Replays scripted results in order and counts how often it was called.
//! Once the script is exhausted the last result repeats.

use mssql_complete_catalog::{
    CatalogError, CatalogResult, QueryVersion, SchemaFetcher, SchemaRow, rows::parse_output,
};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scripted in-memory fetcher
#[derive(Debug, Clone)]
pub struct MockFetcher {
    script: Arc<Mutex<Vec<CatalogResult<Vec<SchemaRow>>>>>,
    calls: Arc<AtomicUsize>,
}

impl MockFetcher {
    /// Fetcher that always returns the given rows
    pub fn with_rows(rows: Vec<SchemaRow>) -> Self {
        MockFetcherBuilder::new().then_rows(rows).build()
    }

    /// Fetcher that parses the given client output with the given version
    pub fn with_output(output: &str, version: QueryVersion) -> Self {
        MockFetcherBuilder::new().then_output(output, version).build()
    }

    /// Fetcher that always fails with the given error
    pub fn failing(error: CatalogError) -> Self {
        MockFetcherBuilder::new().then_error(error).build()
    }

    /// Number of fetches performed so far
    ///
    /// Clones share the counter, so a test can keep a handle after moving
    /// the fetcher into an engine.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SchemaFetcher for MockFetcher {
    async fn fetch(&self) -> CatalogResult<Vec<SchemaRow>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self
            .script
            .lock()
            .map_err(|_| CatalogError::Io("mock script poisoned".to_string()))?;
        match script.get(call).or_else(|| script.last()) {
            Some(result) => result.clone(),
            None => Ok(Vec::new()),
        }
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

/// Builder for creating scripted fetchers with a fluent API
#[derive(Default)]
pub struct MockFetcherBuilder {
    script: Vec<CatalogResult<Vec<SchemaRow>>>,
}

impl MockFetcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next call succeeds with these rows
    pub fn then_rows(mut self, rows: Vec<SchemaRow>) -> Self {
        self.script.push(Ok(rows));
        self
    }

    /// Next call returns whatever parsing this output yields
    pub fn then_output(mut self, output: &str, version: QueryVersion) -> Self {
        self.script.push(parse_output(output, version));
        self
    }

    /// Next call fails
    pub fn then_error(mut self, error: CatalogError) -> Self {
        self.script.push(Err(error));
        self
    }

    pub fn build(self) -> MockFetcher {
        MockFetcher {
            script: Arc::new(Mutex::new(self.script)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}
