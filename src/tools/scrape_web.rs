//! Single-page markdown scraping.

use crate::state::DocState;
use rmcp::schemars;
use serde::Deserialize;
use std::sync::Arc;

use super::tool_error;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ScrapeWebRequest {
    /// Absolute http(s) URL of the page to convert
    pub url: String,
}

/// Returns the page's markdown rendering as plain text.
pub async fn handle_scrape_web(
    state: &Arc<DocState>,
    request: ScrapeWebRequest,
) -> Result<String, String> {
    state
        .scrape_web(&request.url)
        .await
        .map_err(|e| tool_error(&e))
}
