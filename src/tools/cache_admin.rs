//! Cache inspection and invalidation.

use crate::state::DocState;
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use super::{to_json, tool_error};

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct InvalidateDocsRequest {
    /// Archive URL whose cached index should be dropped
    pub source_url: String,
}

#[derive(Debug, Serialize)]
struct InvalidateResponse<'a> {
    source_url: &'a str,
    invalidated: bool,
}

/// One resident cache entry as reported by `list_cached_sources`.
#[derive(Debug, Serialize)]
pub struct CachedSource {
    pub key: String,
    pub url: String,
    pub documents: usize,
    /// Seconds since the Unix epoch
    pub created_at: u64,
}

pub async fn handle_invalidate_docs(
    state: &Arc<DocState>,
    request: InvalidateDocsRequest,
) -> Result<String, String> {
    let invalidated = state
        .invalidate(&request.source_url)
        .await
        .map_err(|e| tool_error(&e))?;
    to_json(&InvalidateResponse {
        source_url: &request.source_url,
        invalidated,
    })
}

pub async fn handle_list_cached_sources(state: &Arc<DocState>) -> Result<String, String> {
    let sources: Vec<CachedSource> = state
        .cached_sources()
        .await
        .iter()
        .map(|entry| CachedSource {
            key: entry.key().as_hex(),
            url: entry.source().url().to_string(),
            documents: entry.index().document_count(),
            created_at: entry
                .created_at()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_secs()),
        })
        .collect();
    to_json(&sources)
}
