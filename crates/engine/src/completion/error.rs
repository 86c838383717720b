// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Completion error types
//!
//! Schema fetch failures are not errors at this level; they are reported in
//! the response and completion continues with an empty schema.

use crate::config::ConfigError;

/// Errors that can occur during completion
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The request names neither a line text nor a valid buffer row
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Host variables could not be turned into a configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The response could not be encoded
    #[error("Failed to encode response: {0}")]
    Encode(String),
}

impl CompletionError {
    /// Whether the caller sent something unusable (vs. a fault on our side)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CompletionError::InvalidRequest(_) | CompletionError::Config(_)
        )
    }
}
