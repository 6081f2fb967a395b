use docs_search_mcp::{Config, DocsServer};
use rmcp::{ServiceExt, transport::stdio};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging goes to stderr; stdout carries the MCP protocol
    docs_search_mcp::tracing::init();

    tracing::info!("Starting docs-search-mcp MCP server");

    let config = Config::load()?;
    let server = DocsServer::new(config)?;
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    // Wait for the service to complete
    service.waiting().await?;

    Ok(())
}
