// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SchemaFetcher trait
//!
//! The capability that produces schema rows. The completion engine only sees
//! this trait, so tests can substitute a scripted fetcher for the real
//! `sqlcmd` process.

use crate::error::CatalogResult;
use crate::metadata::SchemaRow;

/// Source of schema rows
///
/// # Examples
///
/// ```rust,ignore
/// use mssql_complete_catalog::{SchemaFetcher, SchemaSnapshot};
///
/// async fn load(fetcher: &dyn SchemaFetcher) -> CatalogResult<SchemaSnapshot> {
///     let rows = fetcher.fetch().await?;
///     Ok(SchemaSnapshot::from_rows(rows))
/// }
/// ```
#[async_trait::async_trait]
pub trait SchemaFetcher: Send + Sync {
    /// Fetch every table/view column row
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::FetchFailed` if the client exits non-zero.
    /// Returns `CatalogError::MalformedRow` if a data row has the wrong shape.
    async fn fetch(&self) -> CatalogResult<Vec<SchemaRow>>;

    /// Short human-readable description used in logs
    fn describe(&self) -> String;
}
