//! Full-text keyword search over documentation archives.
//!
//! This module provides TF-IDF search over extracted markdown documents,
//! including tokenization, indexing, ranking and excerpt generation.

// Module declarations
pub(crate) mod excerpt;
pub(crate) mod index;
pub(crate) mod query;
pub(crate) mod tokenize;

use crate::error::DocsError;
use crate::extract::Document;
use serde::Serialize;

// Public re-exports (used via lib.rs)
pub use index::TermIndex;

/// One ranked query result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub document_id: String,
    /// Relative relevance within one index; not comparable across indexes
    pub score: f32,
    /// Bounded snippet around the first matched term
    pub excerpt: String,
}

/// A keyword-searchable structure built once over a fixed document set.
///
/// Implementations must be immutable after `build` so that a shared
/// reference can serve concurrent searches.
pub trait KeywordIndex: Send + Sync + Sized + 'static {
    /// Builds an index over `documents` in their given order.
    fn build(documents: Vec<Document>) -> Result<Self, DocsError>;

    /// Returns at most `max_results` hits in descending score order, ties
    /// broken by document order. An unmatched or empty query yields no hits;
    /// `max_results == 0` is an `InvalidArgument` error.
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, DocsError>;

    fn document_count(&self) -> usize;
}
