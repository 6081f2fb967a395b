//! MCP server implementation.

use crate::config::Config;
use crate::state::DocState;
use crate::tools::{
    CountWordsRequest, InvalidateDocsRequest, ScrapeWebRequest, SearchDocsRequest,
    handle_count_words, handle_invalidate_docs, handle_list_cached_sources, handle_scrape_web,
    handle_search_docs,
};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP server for documentation archive search
#[derive(Clone)]
pub struct DocsServer {
    /// Shared state (config, index cache, fetchers)
    state: Arc<DocState>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for DocsServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocsServer")
            .field("state", &self.state)
            .finish()
    }
}

#[tool_router]
impl DocsServer {
    /// Create a server that downloads archives over HTTP.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        Ok(Self::with_state(Arc::new(DocState::new(config)?)))
    }

    /// Create a server around existing state.
    pub fn with_state(state: Arc<DocState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    pub fn doc_state(&self) -> &Arc<DocState> {
        &self.state
    }

    #[tool(
        description = "Search a documentation archive for keywords. The archive at source_url must be a zip of markdown files (for example https://github.com/<owner>/<repo>/archive/refs/heads/main.zip). The first search downloads and indexes the archive; later searches reuse the index. Returns a JSON array of {document_id, score, excerpt} ordered by relevance.",
        input_schema = inline_schema_for_type::<SearchDocsRequest>()
    )]
    async fn search_docs(
        &self,
        Parameters(request): Parameters<SearchDocsRequest>,
    ) -> std::result::Result<String, String> {
        handle_search_docs(&self.state, request).await
    }

    #[tool(
        description = "Fetch a single web page converted to markdown text. The page is not indexed.",
        input_schema = inline_schema_for_type::<ScrapeWebRequest>()
    )]
    async fn scrape_web(
        &self,
        Parameters(request): Parameters<ScrapeWebRequest>,
    ) -> std::result::Result<String, String> {
        handle_scrape_web(&self.state, request).await
    }

    #[tool(
        description = "Count occurrences of a word on a web page (case-insensitive by default). Returns JSON {word, count, case_insensitive, url, content_length}.",
        input_schema = inline_schema_for_type::<CountWordsRequest>()
    )]
    async fn count_word_occurrences(
        &self,
        Parameters(request): Parameters<CountWordsRequest>,
    ) -> std::result::Result<String, String> {
        handle_count_words(&self.state, request).await
    }

    #[tool(
        description = "Drop the cached index for a documentation archive so the next search downloads it again.",
        input_schema = inline_schema_for_type::<InvalidateDocsRequest>()
    )]
    async fn invalidate_docs(
        &self,
        Parameters(request): Parameters<InvalidateDocsRequest>,
    ) -> std::result::Result<String, String> {
        handle_invalidate_docs(&self.state, request).await
    }

    #[tool(
        description = "List the documentation archives currently indexed in memory, with document counts."
    )]
    async fn list_cached_sources(&self) -> std::result::Result<String, String> {
        handle_list_cached_sources(&self.state).await
    }
}

#[tool_handler]
impl ServerHandler for DocsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "docs-search-mcp: keyword search over zipped markdown documentation. \
                 Call search_docs with an archive URL and a query; archives are downloaded \
                 and indexed in memory on first use and reused for the life of the process. \
                 Use scrape_web for single pages that are not published as an archive."
                    .to_string(),
            )
    }
}

/// Input schema for a tool request struct.
///
/// Subschemas are inlined rather than referenced through `$ref`, and optional
/// fields such as `max_results` are marked nullable. Panics only if schemars
/// emits a non-object root, which request structs never produce.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let object = serde_json::to_value(schema).expect("failed to serialize schema");

    let json_object = match object {
        serde_json::Value::Object(object) => object,
        _ => panic!("Schema serialization produced non-object value"),
    };

    Arc::new(json_object)
}
