// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Completion module
//!
//! This module turns one host request into a candidate list.
//!
//! ## Flow
//!
//! ```text
//! 1. Host sends a CompletionRequest (line, column, buffer)
//!    ↓
//! 2. SchemaCache::ensure_loaded()   (fetch on first use / after failure)
//!    ↓
//! 3. BufferScan::scan()             (variables + aliases, every request)
//!    ↓
//! 4. classify()                     (Variable | Column | Default)
//!    ↓
//! 5. CandidateRenderer              (render, case variants, sort)
//!    ↓
//! 6. CompletionResponse back to the host
//! ```
//!
//! A failed schema fetch never fails the request: the error is logged and
//! reported in [`CompletionResponse::errors`], and completion continues with
//! an empty schema. The next request retries the fetch.

pub mod error;
pub mod render;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use mssql_complete_catalog::{SchemaCache, SchemaFetcher, SchemaSnapshot};
use mssql_complete_context::{BufferScan, CompletionContext, CompletionMode, classify};

use crate::completion::error::CompletionError;
use crate::completion::render::{Candidate, CandidateRenderer};
use crate::config::EngineConfig;

/// One completion request from the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionRequest {
    /// Text of the cursor line; taken from `buffer[row]` when absent
    pub line: Option<String>,
    /// Zero-based cursor row in `buffer`
    pub row: Option<usize>,
    /// Cursor column in characters; end of line when absent
    pub column: Option<usize>,
    /// Every line of the buffer
    pub buffer: Vec<String>,
    /// The partial word the host is completing, informational only
    pub complete_str: Option<String>,
    /// Host variable store
    pub vars: Value,
}

impl CompletionRequest {
    /// Request for `line` with the cursor at `column`
    pub fn new(line: impl Into<String>, column: usize) -> Self {
        Self {
            line: Some(line.into()),
            column: Some(column),
            ..Default::default()
        }
    }

    /// Request with the cursor at `(row, column)` of `buffer`
    pub fn at(buffer: Vec<String>, row: usize, column: usize) -> Self {
        Self {
            row: Some(row),
            column: Some(column),
            buffer,
            ..Default::default()
        }
    }

    /// Builder method: set buffer lines
    pub fn with_buffer<S: Into<String>>(mut self, lines: impl IntoIterator<Item = S>) -> Self {
        self.buffer = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: set host variables
    pub fn with_vars(mut self, vars: Value) -> Self {
        self.vars = vars;
        self
    }

    /// Text of the cursor line
    pub fn line_text(&self) -> Result<&str, CompletionError> {
        if let Some(line) = &self.line {
            return Ok(line);
        }
        let row = self.row.ok_or_else(|| {
            CompletionError::InvalidRequest("request has neither 'line' nor 'row'".to_string())
        })?;
        self.buffer.get(row).map(String::as_str).ok_or_else(|| {
            CompletionError::InvalidRequest(format!(
                "row {} is outside the buffer ({} lines)",
                row,
                self.buffer.len()
            ))
        })
    }
}

/// Candidates for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Candidates in display order
    pub candidates: Vec<Candidate>,
    /// Column where the completed word starts
    pub complete_position: usize,
    /// Which rule classified the cursor context
    pub mode: CompletionMode,
    /// Errors for the host to show (failed schema fetch)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Completion engine
///
/// Owns the session's schema cache and the fetcher that fills it.
pub struct CompletionEngine {
    config: EngineConfig,
    fetcher: Arc<dyn SchemaFetcher>,
    cache: SchemaCache,
}

impl CompletionEngine {
    /// Create an engine using the fetcher described by `config`
    pub fn new(config: EngineConfig) -> Self {
        let fetcher = config.build_fetcher();
        Self::with_fetcher(config, fetcher)
    }

    /// Create an engine with an injected fetcher
    pub fn with_fetcher(config: EngineConfig, fetcher: Arc<dyn SchemaFetcher>) -> Self {
        let missing = config.missing_connection_settings();
        if !missing.is_empty() {
            warn!(
                missing = %missing.join(", "),
                "Connection settings incomplete; schema fetch will fail"
            );
        }
        Self {
            config,
            fetcher,
            cache: SchemaCache::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Drop the cached schema; the next request fetches again
    pub fn reload(&mut self) {
        debug!("Schema cache invalidated");
        self.cache.invalidate();
    }

    /// Perform completion for a request
    ///
    /// # Returns
    ///
    /// - `Ok(response)` - candidates, possibly empty, plus any fetch error
    /// - `Err(CompletionError::InvalidRequest)` - the cursor line is unknown
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let mut engine = CompletionEngine::new(config);
    /// let request = CompletionRequest::new("SELECT c.", 9)
    ///     .with_buffer(["SELECT c.", "FROM customers c"]);
    /// let response = engine.complete(&request).await?;
    /// ```
    #[instrument(skip_all)]
    pub async fn complete(
        &mut self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let line = request.line_text()?;
        let column = request.column.unwrap_or_else(|| line.chars().count());
        let ctx = classify(line, column);
        debug!(?ctx, "Classified cursor context");

        let scan = if request.buffer.is_empty() {
            BufferScan::scan(&[line], self.config.variable_scope)
        } else {
            BufferScan::scan(&request.buffer, self.config.variable_scope)
        };

        let mut errors = Vec::new();
        let empty = SchemaSnapshot::new();
        let snapshot: &SchemaSnapshot = match self.cache.ensure_loaded(self.fetcher.as_ref()).await
        {
            Ok(snapshot) => {
                let applied = snapshot.apply_aliases(scan.alias_pairs());
                debug!(applied, total = scan.aliases.len(), "Applied buffer aliases");
                &*snapshot
            }
            Err(err) => {
                errors.push(err.to_string());
                &empty
            }
        };

        let candidates = Self::resolve(&self.config, &ctx, snapshot, &scan);
        debug!(count = candidates.len(), mode = ?ctx.mode(), "Resolved candidates");

        Ok(CompletionResponse {
            candidates,
            complete_position: ctx.start(),
            mode: ctx.mode(),
            errors,
        })
    }

    fn resolve(
        config: &EngineConfig,
        ctx: &CompletionContext,
        snapshot: &SchemaSnapshot,
        scan: &BufferScan,
    ) -> Vec<Candidate> {
        let mut candidates = match ctx {
            CompletionContext::Variable { .. } => {
                CandidateRenderer::render_variables(&scan.variables)
            }
            CompletionContext::Column {
                qualifier: Some(qualifier),
                ..
            } => {
                let tables = snapshot.tables_for_qualifier(qualifier);
                CandidateRenderer::render_columns(&tables)
            }
            CompletionContext::Column { qualifier: None, .. } => Vec::new(),
            CompletionContext::Default { .. } => {
                CandidateRenderer::render_tables(snapshot, config.seed_columns)
            }
        };

        if config.case_variants {
            candidates = CandidateRenderer::with_case_variants(candidates);
        }
        if config.sort_candidates {
            CandidateRenderer::sort(&mut candidates);
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mssql_complete_test_utils::{MockFetcher, SchemaFixtures};
    use serde_json::json;

    #[test]
    fn test_line_text_sources() {
        let request = CompletionRequest::new("SELECT 1", 3).with_buffer(["other"]);
        assert_eq!(request.line_text().unwrap(), "SELECT 1");

        let request = CompletionRequest::at(vec!["a".to_string(), "b".to_string()], 1, 0);
        assert_eq!(request.line_text().unwrap(), "b");

        let request = CompletionRequest::default();
        assert!(matches!(
            request.line_text(),
            Err(CompletionError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_request_from_json() {
        let request: CompletionRequest = serde_json::from_value(json!({
            "row": 0,
            "buffer": ["SELECT c."],
            "vars": {"mssql#server": "db01"}
        }))
        .unwrap();
        assert_eq!(request.line_text().unwrap(), "SELECT c.");
        assert_eq!(request.column, None);
        assert_eq!(request.vars["mssql#server"], "db01");
    }

    #[test]
    fn test_column_defaults_to_end_of_line() {
        let fetcher = MockFetcher::with_rows(SchemaFixtures::standard_rows());
        let mut engine = CompletionEngine::with_fetcher(EngineConfig::default(), Arc::new(fetcher));

        let request = CompletionRequest {
            line: Some("SELECT customers.".to_string()),
            ..Default::default()
        };
        let response = tokio_test::block_on(engine.complete(&request)).unwrap();
        assert_eq!(response.complete_position, 17);
        assert_eq!(response.candidates.len(), 4);
    }
}
