//! Keyword search over zipped markdown documentation, served over MCP.
//!
//! A documentation source is a URL to a zip archive. The first request for a
//! source downloads it into memory, extracts its `.md`/`.mdx` files and builds
//! a TF-IDF index; the index is then cached for the life of the process.

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod scrape;
pub mod search;
pub mod server;
pub mod source;
pub mod state;
pub mod tools;
pub mod tracing;

pub use cache::{CacheEntry, IndexCache};
pub use config::Config;
pub use error::{DocsError, ErrorKind, ToolError};
pub use extract::{Document, extract};
pub use fetch::{ArchiveFetcher, HttpFetcher};
pub use search::{KeywordIndex, SearchHit, TermIndex};
pub use server::DocsServer;
pub use source::{CacheKey, SourceRef};
pub use state::DocState;
