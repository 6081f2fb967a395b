//! TF-IDF inverted index over extracted markdown documents.

use crate::error::DocsError;
use crate::extract::Document;
use ahash::AHashMap;

use super::query::rank;
use super::tokenize::Tokenizer;
use super::{KeywordIndex, SearchHit};

/// Posting list entry: (document position, tf-idf score)
type Posting = (usize, f32);

/// A searchable term index with TF-IDF scoring.
///
/// Immutable once built; concurrent searches only read it.
#[derive(Debug)]
pub struct TermIndex {
    /// Documents in ingestion order; a document's position is its internal id
    documents: Vec<Document>,
    /// Map from stemmed term to postings, ordered by document position
    terms: AHashMap<String, Vec<Posting>>,
}

impl TermIndex {
    /// Builds an index over `documents`, keeping their order.
    ///
    /// An empty document list is a build failure, not an empty index.
    pub fn build(documents: Vec<Document>) -> Result<Self, DocsError> {
        if documents.is_empty() {
            return Err(DocsError::Build(
                "cannot build index from empty document list".to_string(),
            ));
        }

        let start = std::time::Instant::now();
        let mut builder = TermBuilder::default();
        for document in &documents {
            builder.add_document(&document.content);
        }
        let (terms, total_pairs) = builder.finalize();

        let index = Self { documents, terms };
        tracing::info!(
            "Built search index: {} unique terms, {} documents, {} term-document pairs in {:?}",
            index.term_count(),
            index.document_count(),
            total_pairs,
            start.elapsed()
        );
        Ok(index)
    }

    pub(super) fn postings(&self, term: &str) -> &[Posting] {
        self.terms.get(term).map_or(&[], Vec::as_slice)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Get the number of unique terms in the index
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Get the number of documents in the index
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}

impl KeywordIndex for TermIndex {
    fn build(documents: Vec<Document>) -> Result<Self, DocsError> {
        Self::build(documents)
    }

    fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, DocsError> {
        rank(self, query, max_results)
    }

    fn document_count(&self) -> usize {
        self.documents.len()
    }
}

/// Accumulates raw term counts before TF-IDF finalization.
#[derive(Default)]
struct TermBuilder {
    /// Map from term to (document position, raw count), in document order
    counts: AHashMap<String, Vec<(usize, u32)>>,
    /// Token count per document, for length normalization
    doc_lengths: Vec<usize>,
    tokenizer: Tokenizer,
}

impl TermBuilder {
    fn add_document(&mut self, text: &str) {
        let doc = self.doc_lengths.len();
        let tokens = self.tokenizer.tokenize(text);
        self.doc_lengths.push(tokens.len());

        let mut word_counts: AHashMap<String, u32> = AHashMap::with_capacity(tokens.len());
        for token in tokens {
            *word_counts.entry(token).or_insert(0) += 1;
        }

        for (term, count) in word_counts {
            self.counts.entry(term).or_default().push((doc, count));
        }
    }

    /// Calculates IDF scores and produces the final posting lists.
    ///
    /// score = ln(1 + tf_normalized) * ln(1 + total_docs / doc_freq), where
    /// tf_normalized = tf / max(doc_length / avg_doc_length, 0.5). Both factors
    /// are positive for any matching term, so a match always scores above zero.
    fn finalize(self) -> (AHashMap<String, Vec<Posting>>, usize) {
        let total_docs = self.doc_lengths.len() as f32;
        let total_length: usize = self.doc_lengths.iter().sum();
        let avg_doc_length = if total_length > 0 {
            total_length as f32 / total_docs
        } else {
            1.0
        };

        let mut total_pairs = 0;
        let mut terms = AHashMap::with_capacity(self.counts.len());
        for (term, doc_counts) in self.counts {
            let idf = (1.0 + total_docs / doc_counts.len() as f32).ln();
            total_pairs += doc_counts.len();

            let postings = doc_counts
                .into_iter()
                .map(|(doc, count)| {
                    let length_norm = self.doc_lengths[doc] as f32 / avg_doc_length;
                    // Clamp to prevent over-rewarding very short documents
                    let tf_normalized = count as f32 / length_norm.max(0.5);
                    (doc, tf_normalized.ln_1p() * idf)
                })
                .collect();
            terms.insert(term, postings);
        }

        (terms, total_pairs)
    }
}
