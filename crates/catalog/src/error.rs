// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for Catalog operations
//!
//! This module defines the error types used throughout the catalog layer.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for Catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while fetching or parsing schema metadata
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
pub enum CatalogError {
    /// The schema client could not be started
    #[error("Failed to start schema client '{program}': {reason}")]
    Spawn { program: String, reason: String },

    /// The schema client exited with a non-zero status
    #[error("Schema fetch failed ({status}): {stderr}")]
    FetchFailed { status: String, stderr: String },

    /// The schema client did not finish in time
    #[error("Schema fetch timed out after {0}s")]
    Timeout(u64),

    /// A data row did not have the field layout of the configured query
    #[error("Malformed schema row at line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A data row had the right shape but an unreadable field
    #[error("Invalid value in schema row at line {line}: {reason}")]
    InvalidField { line: usize, reason: String },

    /// Required connection settings are missing
    #[error("Invalid catalog configuration: {0}")]
    Configuration(String),

    /// Reading a captured schema file failed
    #[error("I/O error: {0}")]
    Io(String),
}
