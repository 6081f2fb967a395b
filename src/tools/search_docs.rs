//! Keyword search over a zipped documentation archive.

use crate::state::DocState;
use rmcp::schemars;
use serde::Deserialize;
use std::sync::Arc;

use super::{to_json, tool_error};

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchDocsRequest {
    /// URL of a zip archive of markdown documentation (e.g. a GitHub branch archive)
    pub source_url: String,
    /// Keywords to search for
    pub query: String,
    /// Maximum number of results to return (default: 5)
    #[serde(default)]
    pub max_results: Option<i64>,
}

/// Ingest the archive if needed and return ranked hits as a JSON array of
/// `{document_id, score, excerpt}`.
pub async fn handle_search_docs(
    state: &Arc<DocState>,
    request: SearchDocsRequest,
) -> Result<String, String> {
    let hits = state
        .search_docs(&request.source_url, &request.query, request.max_results)
        .await
        .map_err(|e| tool_error(&e))?;

    tracing::debug!(
        "search_docs {:?} on {} returned {} hits",
        request.query,
        request.source_url,
        hits.len()
    );
    to_json(&hits)
}
