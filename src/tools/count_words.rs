//! Word frequency on a scraped page.

use crate::state::DocState;
use rmcp::schemars;
use serde::Deserialize;
use std::sync::Arc;

use super::{to_json, tool_error};

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CountWordsRequest {
    /// Absolute http(s) URL of the page to scan
    pub url: String,
    /// Word or phrase to count
    pub word: String,
    /// Ignore letter case when matching (default: true)
    #[serde(default = "default_case_insensitive")]
    pub case_insensitive: bool,
}

fn default_case_insensitive() -> bool {
    true
}

pub async fn handle_count_words(
    state: &Arc<DocState>,
    request: CountWordsRequest,
) -> Result<String, String> {
    let result = state
        .count_word_occurrences(&request.url, &request.word, request.case_insensitive)
        .await
        .map_err(|e| tool_error(&e))?;
    to_json(&result)
}
