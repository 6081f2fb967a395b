//! Long-lived server state and the ingestion pipeline.
//!
//! [`DocState`] owns the index cache and is passed to every tool handler. A
//! cache miss runs fetch, then extract and build on the blocking pool; the
//! whole `search_docs` request is bounded by the configured request timeout.

use crate::cache::{CacheEntry, IndexCache};
use crate::config::Config;
use crate::error::DocsError;
use crate::extract::extract;
use crate::fetch::{ArchiveFetcher, HttpFetcher};
use crate::scrape::{Scraper, WordCount, count_occurrences};
use crate::search::{KeywordIndex, SearchHit, TermIndex};
use crate::source::SourceRef;
use std::sync::Arc;

/// Shared state for documentation caching and retrieval.
pub struct DocState {
    config: Config,
    fetcher: Arc<dyn ArchiveFetcher>,
    cache: IndexCache<TermIndex>,
    scraper: Scraper,
}

impl std::fmt::Debug for DocState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocState")
            .field("cache", &self.cache)
            .field("request_timeout", &self.config.request_timeout())
            .finish_non_exhaustive()
    }
}

impl DocState {
    /// Creates state that downloads archives over HTTP.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Creates state with a caller-supplied archive fetcher.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn ArchiveFetcher>) -> anyhow::Result<Self> {
        let scraper = Scraper::new(&config.scrape)?;
        Ok(Self {
            config,
            fetcher,
            cache: IndexCache::new(),
            scraper,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &IndexCache<TermIndex> {
        &self.cache
    }

    /// Returns the index for `source`, running the pipeline on a miss.
    pub async fn index_for(&self, source: &SourceRef) -> Result<Arc<TermIndex>, DocsError> {
        let fetcher = Arc::clone(&self.fetcher);
        self.cache
            .get_or_build(source, move |source| build_index(fetcher, source))
            .await
    }

    /// Searches the archive at `source_url`, ingesting it first if needed.
    ///
    /// `max_results` falls back to the configured default; zero or negative
    /// values are rejected, as is a blank query. Both are checked before any
    /// download. Exceeding the request timeout is reported as a fetch failure
    /// and leaves no cache entry behind.
    pub async fn search_docs(
        &self,
        source_url: &str,
        query: &str,
        max_results: Option<i64>,
    ) -> Result<Vec<SearchHit>, DocsError> {
        let max_results = match max_results {
            None => self.config.search.default_max_results,
            Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
            Some(n) => {
                return Err(DocsError::invalid(format!(
                    "max_results must be a positive integer, got {}",
                    n
                )));
            }
        };
        if query.trim().is_empty() {
            return Err(DocsError::invalid("query must not be empty or whitespace only"));
        }
        let source = SourceRef::parse(source_url)?;

        let timeout = self.config.request_timeout();
        let index = tokio::time::timeout(timeout, self.index_for(&source))
            .await
            .map_err(|_| {
                DocsError::Fetch(format!(
                    "request for {} timed out after {:?}",
                    source.url(),
                    timeout
                ))
            })??;

        index.search(query, max_results)
    }

    /// Fetches `page_url` as markdown through the reader service.
    pub async fn scrape_web(&self, page_url: &str) -> Result<String, DocsError> {
        self.scraper.scrape(page_url).await
    }

    /// Scrapes `page_url` and counts occurrences of `word` in the result.
    pub async fn count_word_occurrences(
        &self,
        page_url: &str,
        word: &str,
        case_insensitive: bool,
    ) -> Result<WordCount, DocsError> {
        if word.is_empty() {
            return Err(DocsError::invalid("word must not be empty"));
        }

        let content = self.scraper.scrape(page_url).await?;
        let count = count_occurrences(&content, word, case_insensitive)?;
        Ok(WordCount {
            word: word.to_string(),
            count,
            case_insensitive,
            url: page_url.to_string(),
            content_length: content.chars().count(),
        })
    }

    /// Drops the cached index for `source_url`. Returns whether one existed.
    pub async fn invalidate(&self, source_url: &str) -> Result<bool, DocsError> {
        let source = SourceRef::parse(source_url)?;
        Ok(self.cache.invalidate(&source).await)
    }

    /// Snapshot of resident cache entries, oldest first.
    pub async fn cached_sources(&self) -> Vec<Arc<CacheEntry<TermIndex>>> {
        self.cache.entries().await
    }
}

/// Fetch, extract and build for one source.
///
/// Extraction and indexing are CPU-bound and run on the blocking pool.
async fn build_index(
    fetcher: Arc<dyn ArchiveFetcher>,
    source: SourceRef,
) -> Result<TermIndex, DocsError> {
    let bytes = fetcher.fetch(source.normalized_url()).await?;

    tokio::task::spawn_blocking(move || {
        let documents = extract(&bytes)?;
        tracing::info!("Extracted {} documents from {}", documents.len(), source);
        TermIndex::build(documents)
    })
    .await
    .map_err(|e| DocsError::Build(format!("index build task failed: {}", e)))?
}
