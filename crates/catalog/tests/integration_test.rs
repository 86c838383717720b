// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for the schema cache lifecycle

use mssql_complete_catalog::{
    CatalogError, QueryVersion, SchemaCache, SchemaState, TableKind,
};
use mssql_complete_test_utils::{MockFetcher, MockFetcherBuilder, SchemaFixtures};

#[tokio::test]
async fn test_cache_fetches_once() {
    let fetcher = MockFetcher::with_rows(SchemaFixtures::standard_rows());
    let mut cache = SchemaCache::new();

    let snapshot = cache.ensure_loaded(&fetcher).await.unwrap();
    assert_eq!(snapshot.len(), 3);
    assert_eq!(
        snapshot.table("active_customers").unwrap().kind,
        TableKind::View
    );

    cache.ensure_loaded(&fetcher).await.unwrap();
    assert_eq!(fetcher.calls(), 1);
    assert!(cache.is_loaded());
}

#[tokio::test]
async fn test_failure_is_not_cached() {
    let fetcher = MockFetcherBuilder::new()
        .then_error(CatalogError::FetchFailed {
            status: "exit status: 1".to_string(),
            stderr: "Login failed for user 'sa'.".to_string(),
        })
        .then_rows(SchemaFixtures::standard_rows())
        .build();
    let mut cache = SchemaCache::new();

    let err = cache.ensure_loaded(&fetcher).await.unwrap_err();
    assert!(matches!(err, CatalogError::FetchFailed { .. }));
    assert_eq!(cache.attempts(), 1);
    assert!(cache.snapshot().is_none());

    let snapshot = cache.ensure_loaded(&fetcher).await.unwrap();
    assert_eq!(snapshot.len(), 3);
    assert_eq!(fetcher.calls(), 2);
    assert_eq!(cache.attempts(), 0);
}

#[tokio::test]
async fn test_attempts_accumulate() {
    let fetcher = MockFetcher::failing(CatalogError::Timeout(5));
    let mut cache = SchemaCache::new();

    for _ in 0..3 {
        assert!(cache.ensure_loaded(&fetcher).await.is_err());
    }
    assert_eq!(cache.attempts(), 3);
    assert!(matches!(
        cache.state(),
        SchemaState::Failed {
            error: CatalogError::Timeout(5),
            attempts: 3
        }
    ));
}

#[tokio::test]
async fn test_malformed_output_leaves_cache_retryable() {
    let fetcher = MockFetcherBuilder::new()
        .then_output(SchemaFixtures::truncated_output(), QueryVersion::V5)
        .then_output(SchemaFixtures::standard_output(), QueryVersion::V5)
        .build();
    let mut cache = SchemaCache::new();

    let err = cache.ensure_loaded(&fetcher).await.unwrap_err();
    assert_eq!(
        err,
        CatalogError::MalformedRow {
            line: 3,
            expected: 6,
            found: 2
        }
    );
    // No partially populated snapshot survives the bad row
    assert!(cache.snapshot().is_none());

    let snapshot = cache.ensure_loaded(&fetcher).await.unwrap();
    assert_eq!(snapshot.table("orders").unwrap().columns.len(), 3);
}

#[tokio::test]
async fn test_invalidate_refetches() {
    let fetcher = MockFetcher::with_output(SchemaFixtures::minimal_output(), QueryVersion::V1);
    let mut cache = SchemaCache::new();

    cache.ensure_loaded(&fetcher).await.unwrap();
    cache.invalidate();
    assert_eq!(cache.state(), &SchemaState::Unloaded);

    let snapshot = cache.ensure_loaded(&fetcher).await.unwrap();
    let customers = snapshot.table("customers").unwrap();
    assert_eq!(customers.kind, TableKind::Table);
    assert_eq!(customers.columns[1].name, "NAME");
    assert_eq!(fetcher.calls(), 2);
}
