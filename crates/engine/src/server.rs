// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Stdio transport
//!
//! Newline-delimited JSON over stdin/stdout. Each input line is one request
//! envelope, each output line one response envelope:
//!
//! ```text
//! → {"id":1,"method":"complete","params":{"line":"SELECT c.","buffer":["SELECT c.","FROM customers c"]}}
//! ← {"id":1,"result":{"candidates":[...],"complete_position":9,"mode":"column"}}
//! ```
//!
//! Methods: `complete`, `reload`, `ping`. The engine is created on the first
//! request that needs it, from the base configuration overlaid with that
//! request's `vars`, and lives for the rest of the session.

use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use mssql_complete_catalog::SchemaFetcher;

use crate::completion::error::CompletionError;
use crate::completion::{CompletionEngine, CompletionRequest};
use crate::config::{ConfigError, EngineConfig};

/// JSON-RPC style error codes
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Request envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestEnvelope {
    #[serde(default)]
    pub id: JsonValue,
    pub method: String,
    #[serde(default)]
    pub params: JsonValue,
}

/// Response envelope
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResponseEnvelope {
    pub id: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorBody {
    pub code: i32,
    pub message: String,
}

impl ResponseEnvelope {
    fn ok(id: JsonValue, result: JsonValue) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: JsonValue, code: i32, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(ErrorBody {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-process session state
pub struct Session {
    base_config: EngineConfig,
    fetcher: Option<Arc<dyn SchemaFetcher>>,
    engine: Option<CompletionEngine>,
}

impl Session {
    pub fn new(base_config: EngineConfig) -> Self {
        Self {
            base_config,
            fetcher: None,
            engine: None,
        }
    }

    /// Session whose engine uses the given fetcher instead of the configured one
    pub fn with_fetcher(base_config: EngineConfig, fetcher: Arc<dyn SchemaFetcher>) -> Self {
        Self {
            base_config,
            fetcher: Some(fetcher),
            engine: None,
        }
    }

    pub fn engine(&self) -> Option<&CompletionEngine> {
        self.engine.as_ref()
    }

    fn engine_for(&mut self, vars: &JsonValue) -> Result<&mut CompletionEngine, ConfigError> {
        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => {
                let mut config = self.base_config.clone();
                config.merge_host_vars(vars)?;
                info!(version = %config.query_version, "Creating completion engine");
                match &self.fetcher {
                    Some(fetcher) => CompletionEngine::with_fetcher(config, fetcher.clone()),
                    None => CompletionEngine::new(config),
                }
            }
        };
        Ok(self.engine.insert(engine))
    }

    /// Handle one raw input line; `None` for blank lines
    pub async fn handle_line(&mut self, line: &str) -> Option<ResponseEnvelope> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match serde_json::from_str::<RequestEnvelope>(line) {
            Ok(envelope) => Some(self.handle(envelope).await),
            Err(e) => {
                warn!(error = %e, "Discarding malformed request");
                Some(ResponseEnvelope::err(
                    JsonValue::Null,
                    codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                ))
            }
        }
    }

    /// Dispatch one request
    pub async fn handle(&mut self, envelope: RequestEnvelope) -> ResponseEnvelope {
        let RequestEnvelope { id, method, params } = envelope;
        debug!(%method, "Handling request");

        match method.as_str() {
            "ping" => ResponseEnvelope::ok(id, json!({ "version": crate::VERSION })),
            "reload" => {
                if let Some(engine) = self.engine.as_mut() {
                    engine.reload();
                }
                ResponseEnvelope::ok(id, json!({ "reloaded": true }))
            }
            "complete" => {
                let request: CompletionRequest = match serde_json::from_value(params) {
                    Ok(request) => request,
                    Err(e) => {
                        return ResponseEnvelope::err(id, codes::INVALID_PARAMS, e.to_string());
                    }
                };
                match self.complete(&request).await {
                    Ok(result) => ResponseEnvelope::ok(id, result),
                    Err(e) => ResponseEnvelope::err(id, error_code(&e), e.to_string()),
                }
            }
            other => ResponseEnvelope::err(
                id,
                codes::METHOD_NOT_FOUND,
                format!("Unknown method '{}'", other),
            ),
        }
    }

    async fn complete(&mut self, request: &CompletionRequest) -> Result<JsonValue, CompletionError> {
        let engine = self.engine_for(&request.vars)?;
        let response = engine.complete(request).await?;
        serde_json::to_value(response).map_err(|e| CompletionError::Encode(e.to_string()))
    }
}

fn error_code(err: &CompletionError) -> i32 {
    if err.is_client_error() {
        codes::INVALID_PARAMS
    } else {
        codes::INTERNAL_ERROR
    }
}

/// Serve requests from `reader` until EOF, writing responses to `writer`
pub async fn serve<R, W>(session: &mut Session, reader: R, mut writer: W) -> Result<(), ServerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(response) = session.handle_line(&line).await {
            let mut encoded = serde_json::to_vec(&response)?;
            encoded.push(b'\n');
            writer.write_all(&encoded).await?;
            writer.flush().await?;
        }
    }
    info!("Input closed, shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_omits_absent_fields() {
        let ok = ResponseEnvelope::ok(json!(7), json!({"reloaded": true}));
        assert_eq!(
            serde_json::to_string(&ok).unwrap(),
            r#"{"id":7,"result":{"reloaded":true}}"#
        );

        let err = ResponseEnvelope::err(JsonValue::Null, codes::METHOD_NOT_FOUND, "nope");
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            r#"{"id":null,"error":{"code":-32601,"message":"nope"}}"#
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            error_code(&CompletionError::InvalidRequest("row 3".to_string())),
            codes::INVALID_PARAMS
        );
        assert_eq!(
            error_code(&CompletionError::Config(ConfigError::NotAnObject)),
            codes::INVALID_PARAMS
        );
        assert_eq!(
            error_code(&CompletionError::Encode("key must be a string".to_string())),
            codes::INTERNAL_ERROR
        );
    }

    #[test]
    fn test_request_defaults() {
        let request: RequestEnvelope = serde_json::from_str(r#"{"method":"ping"}"#).unwrap();
        assert_eq!(request.id, JsonValue::Null);
        assert_eq!(request.params, JsonValue::Null);
    }
}
