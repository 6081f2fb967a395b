mod common;

use assert2::{check, let_assert};
use common::{FOX_URL, FoxState, StubFetcher, fox_archive, fox_state, state_with, zip_of};
use docs_search_mcp::tools::{
    InvalidateDocsRequest, handle_invalidate_docs, handle_list_cached_sources,
};
use docs_search_mcp::{DocsError, SourceRef};
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sequential_requests_fetch_once(fox_state: FoxState) {
    let source = SourceRef::parse(FOX_URL).unwrap();

    let first = fox_state.state.index_for(&source).await.unwrap();
    let second = fox_state.state.index_for(&source).await.unwrap();

    check!(fox_state.fetcher.calls() == 1);
    check!(Arc::ptr_eq(&first, &second));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn equivalent_urls_share_entry(fox_state: FoxState) {
    fox_state.state.search_docs(FOX_URL, "fox", None).await.unwrap();
    fox_state
        .state
        .search_docs("HTTPS://GitHub.com:443/example/docs/archive/refs/heads/main.zip#top", "dog", None)
        .await
        .unwrap();

    check!(fox_state.fetcher.calls() == 1);
    check!(fox_state.state.cache().len().await == 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn different_sources_build_separately(fox_state: FoxState) {
    fox_state.state.search_docs(FOX_URL, "fox", None).await.unwrap();
    fox_state
        .state
        .search_docs("https://github.com/example/other/archive/main.zip", "fox", None)
        .await
        .unwrap();

    check!(fox_state.fetcher.calls() == 2);
    check!(fox_state.state.cache().len().await == 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_build_leaves_no_entry_and_retries() {
    let fetcher = Arc::new(StubFetcher::failing(DocsError::Fetch("connection refused".into())));
    let state = state_with(Arc::clone(&fetcher));
    let source = SourceRef::parse(FOX_URL).unwrap();

    let_assert!(Err(DocsError::Fetch(_)) = state.index_for(&source).await);
    check!(!state.cache().is_cached(&source).await);
    check!(!state.cache().is_building(&source).await);

    let_assert!(Err(DocsError::Fetch(_)) = state.index_for(&source).await);
    check!(fetcher.calls() == 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_misses_share_one_fetch(fox_archive: Vec<u8>) {
    let fetcher = Arc::new(StubFetcher::serving(fox_archive).with_delay(Duration::from_millis(200)));
    let state = state_with(Arc::clone(&fetcher));

    let (a, b) = tokio::join!(
        state.search_docs(FOX_URL, "quick fox", Some(2)),
        state.search_docs(FOX_URL, "lazy dog", Some(2)),
    );

    check!(fetcher.calls() == 1);
    check!(a.unwrap().len() == 2);
    check!(b.unwrap()[0].document_id == "b.md");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_misses_from_spawned_tasks_share_one_fetch(fox_archive: Vec<u8>) {
    let fetcher = Arc::new(StubFetcher::serving(fox_archive).with_delay(Duration::from_millis(200)));
    let state = state_with(Arc::clone(&fetcher));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let state = Arc::clone(&state);
            tokio::spawn(async move { state.search_docs(FOX_URL, "fox", None).await })
        })
        .collect();
    for task in tasks {
        check!(task.await.unwrap().unwrap().len() == 2);
    }

    check!(fetcher.calls() == 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_failure_reaches_every_waiter() {
    let fetcher = Arc::new(
        StubFetcher::failing(DocsError::Fetch("HTTP error 500".into()))
            .with_delay(Duration::from_millis(100)),
    );
    let state = state_with(Arc::clone(&fetcher));

    let (a, b) = tokio::join!(
        state.search_docs(FOX_URL, "fox", None),
        state.search_docs(FOX_URL, "fox", None),
    );

    let_assert!(Err(DocsError::Fetch(_)) = a);
    let_assert!(Err(DocsError::Fetch(_)) = b);
    check!(fetcher.calls() == 1);
    check!(state.cache().is_empty().await);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalidate_forces_refetch(fox_state: FoxState) {
    fox_state.state.search_docs(FOX_URL, "fox", None).await.unwrap();

    let output = handle_invalidate_docs(
        &fox_state.state,
        InvalidateDocsRequest {
            source_url: FOX_URL.to_string(),
        },
    )
    .await
    .unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    check!(json["invalidated"] == true);

    fox_state.state.search_docs(FOX_URL, "fox", None).await.unwrap();
    check!(fox_state.fetcher.calls() == 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalidate_missing_entry_reports_false(fox_state: FoxState) {
    check!(!fox_state.state.invalidate(FOX_URL).await.unwrap());
    let_assert!(Err(DocsError::InvalidArgument(_)) = fox_state.state.invalidate("").await);
}

#[tokio::test(flavor = "multi_thread")]
async fn list_cached_sources_reports_entries() {
    let archive = zip_of(&[
        ("site-main/index.md", b"welcome"),
        ("site-main/guide/setup.mdx", b"install the server"),
    ]);
    let state = state_with(Arc::new(StubFetcher::serving(archive)));

    check!(handle_list_cached_sources(&state).await.unwrap().trim() == "[]");

    state.search_docs(FOX_URL, "install", None).await.unwrap();
    let output = handle_list_cached_sources(&state).await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    let entries = json.as_array().unwrap();

    check!(entries.len() == 1);
    check!(entries[0]["url"] == FOX_URL);
    check!(entries[0]["documents"] == 2);
    check!(entries[0]["key"].as_str().unwrap().len() == 16);
}
