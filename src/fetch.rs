//! Archive download over HTTP.
//!
//! The fetcher only moves bytes: it performs one GET (following redirects),
//! buffers the full body in memory and hands it back. Nothing is written to
//! disk and nothing is retried here.

use crate::config::FetchConfig;
use crate::error::DocsError;
use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::redirect::Policy;
use std::time::Duration;

/// Maximum number of redirects followed for a single archive download.
const MAX_REDIRECTS: usize = 10;

/// Retrieves a documentation archive as raw bytes.
///
/// The returned future owns everything it needs so it can be stored in the
/// cache's in-flight table and driven by whichever caller polls it.
pub trait ArchiveFetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, DocsError>>;
}

/// [`ArchiveFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(Policy::limited(MAX_REDIRECTS))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            max_bytes: config.max_archive_bytes,
        })
    }

    async fn download(
        client: reqwest::Client,
        url: String,
        max_bytes: u64,
    ) -> Result<Vec<u8>, DocsError> {
        let start = std::time::Instant::now();
        tracing::info!("Downloading archive from {}", url);

        let mut response = client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DocsError::Fetch(format!(
                "HTTP error {} while downloading {}",
                status, url
            )));
        }

        let declared = response.content_length();
        if let Some(len) = declared
            && len > max_bytes
        {
            return Err(DocsError::Fetch(format!(
                "archive at {} is {} bytes, exceeding the {} byte limit",
                url, len, max_bytes
            )));
        }

        // Chunked responses carry no length, so the limit is enforced as the
        // body streams in.
        let capacity = usize::try_from(declared.unwrap_or(0)).unwrap_or(0);
        let mut body = Vec::with_capacity(capacity);
        while let Some(chunk) = response.chunk().await? {
            if (body.len() + chunk.len()) as u64 > max_bytes {
                return Err(DocsError::Fetch(format!(
                    "archive at {} exceeds the {} byte limit",
                    url, max_bytes
                )));
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(
            "Downloaded {} bytes from {} in {:?}",
            body.len(),
            url,
            start.elapsed()
        );
        Ok(body)
    }
}

impl ArchiveFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, DocsError>> {
        Self::download(self.client.clone(), url.to_string(), self.max_bytes).boxed()
    }
}
