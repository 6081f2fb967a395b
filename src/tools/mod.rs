//! Request types and handlers for the MCP tool surface.
//!
//! Handlers return `Ok` with JSON text on success and `Err` with a JSON
//! `{"kind", "message"}` object on failure.

pub mod cache_admin;
pub mod count_words;
pub mod scrape_web;
pub mod search_docs;

pub use cache_admin::*;
pub use count_words::*;
pub use scrape_web::*;
pub use search_docs::*;

use crate::error::{DocsError, ToolError};
use serde::Serialize;

pub(crate) fn tool_error(err: &DocsError) -> String {
    ToolError::from(err).to_json()
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| {
        tracing::error!("Failed to serialize tool response: {}", e);
        format!(
            "{{\"kind\":\"internal\",\"message\":\"failed to serialize response: {}\"}}",
            e
        )
    })
}
