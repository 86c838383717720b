// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # mssql-complete - Context Detection Layer
//!
//! Text-level analysis of the editor buffer for completion.
//!
//! ## Buffer Scanning
//!
//! [`scanner`] finds variable declarations (`@name TYPE`) and table aliases
//! (`FROM table alias`, `JOIN table alias`). The scan is cheap and is rerun
//! from scratch on every request.
//!
//! ## Completion Context
//!
//! [`classify`] inspects the text before the cursor and picks one of
//! [`CompletionContext::Variable`], [`CompletionContext::Column`] or
//! [`CompletionContext::Default`].
//!
//! ## Examples
//!
//! ```rust
//! use mssql_complete_context::{classify, CompletionContext};
//!
//! match classify("SELECT c.na", 11) {
//!     CompletionContext::Column { qualifier, prefix, start } => {
//!         assert_eq!(qualifier.as_deref(), Some("c"));
//!         assert_eq!(prefix, "na");
//!         assert_eq!(start, 9);
//!     }
//!     other => panic!("unexpected context {:?}", other),
//! }
//! ```

pub mod classify;
pub mod scanner;

// Re-export commonly used types
pub use classify::{CompletionContext, CompletionMode, classify};
pub use scanner::{AliasBinding, BufferScan, VariableDecl, VariableScope, scan_aliases, scan_variables};
