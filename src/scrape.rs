//! Single-page markdown conversion through an external reader service.
//!
//! The reader is addressed by prefixing the target page URL with the
//! configured reader URL (`https://r.jina.ai/https://example.com/page`). Pages
//! fetched here are returned as text only and never enter the index cache.

use crate::config::ScrapeConfig;
use crate::error::DocsError;
use crate::source::validate_url;
use serde::Serialize;
use std::time::Duration;

/// Client for the page-to-markdown reader service.
#[derive(Debug, Clone)]
pub struct Scraper {
    client: reqwest::Client,
    reader_url: String,
    api_key: Option<String>,
}

impl Scraper {
    pub fn new(config: &ScrapeConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            reader_url: config.reader_url.clone(),
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
        })
    }

    /// Returns the markdown rendering of `page_url`.
    pub async fn scrape(&self, page_url: &str) -> Result<String, DocsError> {
        let page = validate_url(page_url)?;
        let target = reader_url_for(&self.reader_url, page.as_str());
        tracing::info!("Scraping {} via reader service", page);

        let mut request = self.client.get(&target);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DocsError::Fetch(format!(
                "reader service returned HTTP {} for {}",
                status, page
            )));
        }

        let content = response.text().await?;
        tracing::debug!("Scraped {} ({} bytes)", page, content.len());
        Ok(content)
    }
}

/// Result of [`count_occurrences`] over a scraped page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
    pub case_insensitive: bool,
    pub url: String,
    pub content_length: usize,
}

/// Joins the reader prefix and the page URL.
pub(crate) fn reader_url_for(reader_url: &str, page_url: &str) -> String {
    format!("{}{}", reader_url, page_url)
}

/// Counts non-overlapping occurrences of `word` in `content`.
pub fn count_occurrences(content: &str, word: &str, case_insensitive: bool) -> Result<usize, DocsError> {
    if word.is_empty() {
        return Err(DocsError::invalid("word must not be empty"));
    }

    let count = if case_insensitive {
        content.to_lowercase().matches(&word.to_lowercase()).count()
    } else {
        content.matches(word).count()
    };
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    #[test]
    fn test_reader_url_is_prefix_join() {
        check!(
            reader_url_for("https://r.jina.ai/", "https://example.com/page")
                == "https://r.jina.ai/https://example.com/page"
        );
    }

    #[rstest]
    #[case("Rust rust RUST rusty", "rust", true, 4)]
    #[case("Rust rust RUST rusty", "rust", false, 2)]
    #[case("aaaa", "aa", true, 2)]
    #[case("nothing here", "zebra", true, 0)]
    #[case("", "word", false, 0)]
    fn test_count_occurrences(
        #[case] content: &str,
        #[case] word: &str,
        #[case] case_insensitive: bool,
        #[case] expected: usize,
    ) {
        check!(count_occurrences(content, word, case_insensitive).unwrap() == expected);
    }

    #[test]
    fn test_empty_word_rejected() {
        let_assert!(Err(DocsError::InvalidArgument(_)) = count_occurrences("text", "", true));
    }

    #[rstest]
    #[case("")]
    #[case("not a url")]
    #[case("file:///etc/passwd")]
    #[tokio::test]
    async fn test_invalid_page_url_rejected(#[case] url: &str) {
        let scraper = Scraper::new(&ScrapeConfig::default()).unwrap();
        let_assert!(Err(DocsError::InvalidArgument(_)) = scraper.scrape(url).await);
    }

    #[test]
    fn test_blank_api_key_ignored() {
        let config = ScrapeConfig {
            api_key: Some("  ".to_string()),
            ..ScrapeConfig::default()
        };
        let scraper = Scraper::new(&config).unwrap();
        check!(scraper.api_key.is_none());
    }
}
