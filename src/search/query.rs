//! Query ranking against a [`TermIndex`].

use crate::error::DocsError;

use super::SearchHit;
use super::excerpt::excerpt;
use super::index::TermIndex;
use super::tokenize::Tokenizer;

/// Ranks the documents of `index` against `query`.
///
/// The query goes through the same tokenizer as indexed content. Each
/// distinct query term contributes its tf-idf score to every document it
/// occurs in; documents matching no term are left out.
pub(crate) fn rank(
    index: &TermIndex,
    query: &str,
    max_results: usize,
) -> Result<Vec<SearchHit>, DocsError> {
    if max_results == 0 {
        return Err(DocsError::invalid("max_results must be a positive integer"));
    }

    let tokenizer = Tokenizer::default();
    let mut terms = tokenizer.tokenize(query);
    // Keep first occurrences so summation order follows the query text
    let mut seen = ahash::AHashSet::with_capacity(terms.len());
    terms.retain(|term| seen.insert(term.clone()));

    if terms.is_empty() {
        return Ok(vec![]);
    }

    let documents = index.documents();
    let mut scores: Vec<Option<f32>> = vec![None; documents.len()];
    for term in &terms {
        for &(doc, score) in index.postings(term) {
            *scores[doc].get_or_insert(0.0) += score;
        }
    }

    let mut ranked: Vec<(usize, f32)> = scores
        .into_iter()
        .enumerate()
        .filter_map(|(doc, score)| score.map(|s| (doc, s)))
        .collect();
    // Stable sort keeps document order among equal scores
    ranked.sort_by(|(_, a), (_, b)| b.total_cmp(a));
    ranked.truncate(max_results);

    tracing::debug!(
        "Query {:?} ({} terms) matched {} of {} documents",
        query,
        terms.len(),
        ranked.len(),
        documents.len()
    );

    Ok(ranked
        .into_iter()
        .map(|(doc, score)| {
            let document = &documents[doc];
            SearchHit {
                document_id: document.id.clone(),
                score,
                excerpt: excerpt(&document.content, &terms, &tokenizer),
            }
        })
        .collect())
}
