// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Schema cache
//!
//! Holds the schema snapshot for the lifetime of a session. The snapshot is
//! fetched lazily on first use and never refreshed from the database
//! afterwards unless [`SchemaCache::invalidate`] is called.
//!
//! ```text
//! Unloaded ──fetch ok──▶ Loaded
//!    │                     ▲
//!    └──fetch err──▶ Failed ┘ (next ensure_loaded retries)
//! ```
//!
//! A fetch result is committed only after the whole output parsed, so a bad
//! row leaves the cache in `Failed` rather than half populated.

use tracing::{error, info, instrument};

use crate::error::CatalogError;
use crate::metadata::SchemaSnapshot;
use crate::r#trait::SchemaFetcher;

/// Load state of the schema cache
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SchemaState {
    /// Nothing fetched yet
    #[default]
    Unloaded,
    /// Snapshot fetched successfully
    Loaded(SchemaSnapshot),
    /// Last fetch failed; the next request retries
    Failed {
        error: CatalogError,
        attempts: u32,
    },
}

/// Session-scoped schema cache
#[derive(Debug, Default)]
pub struct SchemaCache {
    state: SchemaState,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache that is already loaded
    pub fn with_snapshot(snapshot: SchemaSnapshot) -> Self {
        Self {
            state: SchemaState::Loaded(snapshot),
        }
    }

    pub fn state(&self) -> &SchemaState {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, SchemaState::Loaded(_))
    }

    /// Number of consecutive failed fetches
    pub fn attempts(&self) -> u32 {
        match self.state {
            SchemaState::Failed { attempts, .. } => attempts,
            _ => 0,
        }
    }

    pub fn snapshot(&self) -> Option<&SchemaSnapshot> {
        match &self.state {
            SchemaState::Loaded(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// Forget the snapshot; the next `ensure_loaded` fetches again
    pub fn invalidate(&mut self) {
        self.state = SchemaState::Unloaded;
    }

    /// Return the snapshot, fetching it first unless already loaded.
    ///
    /// A failed fetch moves the cache to `Failed` and returns the error; the
    /// cache stays retryable.
    #[instrument(skip_all, fields(source = %fetcher.describe()))]
    pub async fn ensure_loaded(
        &mut self,
        fetcher: &dyn SchemaFetcher,
    ) -> Result<&mut SchemaSnapshot, CatalogError> {
        if !self.is_loaded() {
            match fetcher.fetch().await {
                Ok(rows) => {
                    let snapshot = SchemaSnapshot::from_rows(rows);
                    info!(tables = snapshot.len(), "Schema cache populated");
                    self.state = SchemaState::Loaded(snapshot);
                }
                Err(err) => {
                    let attempts = self.attempts() + 1;
                    error!(attempts, error = %err, "Schema fetch failed");
                    self.state = SchemaState::Failed {
                        error: err.clone(),
                        attempts,
                    };
                    return Err(err);
                }
            }
        }

        match &mut self.state {
            SchemaState::Loaded(snapshot) => Ok(snapshot),
            // Failed/Unloaded return early above
            _ => Err(CatalogError::Configuration(
                "schema cache is not loaded".to_string(),
            )),
        }
    }
}
