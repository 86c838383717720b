// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # mssql-complete - Catalog Layer
//!
//! This crate provides the SQL Server schema snapshot used for completion.
//!
//! - **Fetchers**: [`SqlcmdFetcher`] runs the `sqlcmd` client,
//!   [`FileFetcher`] reads captured output from disk. Both implement
//!   [`SchemaFetcher`], so tests can inject their own.
//! - **Parsing**: [`rows::parse_output`] turns the comma-delimited query
//!   output into [`SchemaRow`]s for one of five [`QueryVersion`] layouts.
//! - **Caching**: [`SchemaCache`] fetches lazily, keeps the snapshot for the
//!   session and retries on the next request after a failure.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mssql_complete_catalog::{ConnectionSettings, SchemaCache, SqlcmdFetcher};
//!
//! let fetcher = SqlcmdFetcher::new(settings);
//! let mut cache = SchemaCache::new();
//! let snapshot = cache.ensure_loaded(&fetcher).await?;
//! for table in snapshot.tables() {
//!     println!("{} [{}]", table.name, table.kind);
//! }
//! ```

pub mod cache;
pub mod error;
pub mod file;
pub mod metadata;
pub mod query;
pub mod rows;
pub mod sqlcmd;
pub mod r#trait;

// Re-exports
pub use cache::{SchemaCache, SchemaState};
pub use error::{CatalogError, CatalogResult};
pub use file::FileFetcher;
pub use metadata::{ColumnEntry, SchemaRow, SchemaSnapshot, TableEntry, TableKind};
pub use query::QueryVersion;
pub use sqlcmd::{ConnectionSettings, SqlcmdFetcher};
pub use r#trait::SchemaFetcher;
