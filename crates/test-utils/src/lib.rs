// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for mssql-complete
//!
//! This crate provides common testing components including:
//! - A scripted schema fetcher that never spawns a process
//! - Sample schema output and buffers

pub mod fixtures;
pub mod mock_fetcher;

// Re-exports for convenience
pub use fixtures::{BufferFixtures, SchemaFixtures};
pub use mock_fetcher::{MockFetcher, MockFetcherBuilder};
