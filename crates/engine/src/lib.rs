// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # mssql-complete
//!
//! SQL Server completion engine and stdio server for editor plugins.
//!
//! ## Overview
//!
//! The engine provides:
//! - Column completion after `alias.` for aliases bound in the buffer
//! - Variable completion after `@` for `DECLARE`d variables
//! - Table, view and alias completion everywhere else
//! - A per-session schema cache filled by one `sqlcmd` query
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Editor plugin (host)             │
//! └──────────────┬──────────────────────────┘
//!                │ NDJSON over stdio
//!                ↓
//! ┌─────────────────────────────────────────┐
//! │         Session (server.rs)             │
//! ├─────────────────────────────────────────┤
//! │  • complete / reload / ping             │
//! └──────────────┬──────────────────────────┘
//!                │
//!         ┌──────┴──────┬────────────────┐
//!         ↓             ↓                ↓
//! ┌────────────┐ ┌──────────────┐ ┌─────────────┐
//! │   Config   │ │  Completion  │ │ SchemaCache │
//! │            │ │    Engine    │ │  + Fetcher  │
//! └────────────┘ └──────────────┘ └─────────────┘
//! ```
//!
//! ## Configuration
//!
//! 1. **Host variables** (sent with each request, read once per session)
//! ```json
//! {
//!   "mssql#server": "localhost",
//!   "mssql#user": "sa",
//!   "mssql#password": "secret",
//!   "mssql#db": "shop"
//! }
//! ```
//!
//! 2. **Configuration file** (`--config`)
//! ```yaml
//! connection:
//!   server: localhost
//!   user: sa
//!   password: secret
//!   database: shop
//! query_version: V5
//! fetch_timeout_secs: 10
//! ```
//!
//! ## Error Handling
//!
//! - Schema fetch fails → empty schema for this request, error reported, retried next request
//! - Malformed schema output → nothing cached, error reported, retried next request
//! - Unknown alias → no candidates
//! - Malformed request line → error response, server keeps running
//!
//! ## Modules
//!
//! - [`completion`]: Request handling, candidate resolution and rendering
//! - [`config`]: Engine configuration from YAML and host variables
//! - [`server`]: Newline-delimited JSON stdio transport

pub mod completion;
pub mod config;
pub mod server;

// Re-exports for convenience
pub use completion::error::CompletionError;
pub use completion::render::{Candidate, CandidateRenderer};
pub use completion::{CompletionEngine, CompletionRequest, CompletionResponse};
pub use config::{ConfigError, EngineConfig, VAR_PREFIX};
pub use server::{RequestEnvelope, ResponseEnvelope, ServerError, Session, serve};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server name
pub const SERVER_NAME: &str = "mssql-complete";
