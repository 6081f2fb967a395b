//! Documentation source identifiers and URL validation.

use crate::error::DocsError;
use reqwest::Url;
use serde::{Serialize, Serializer};
use std::fmt;
use xxhash_rust::xxh3::xxh3_64;

/// Cache key derived from a normalized source URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(u64);

impl CacheKey {
    fn for_url(normalized: &str) -> Self {
        Self(xxh3_64(normalized.as_bytes()))
    }

    /// Returns the key as a lowercase hexadecimal string
    pub fn as_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl Serialize for CacheKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

/// Identifies one documentation origin.
///
/// Holds the URL as given and a key derived from its normalized form. Scheme
/// and host case, default ports and fragments do not change the key; path and
/// query do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    url: String,
    normalized: String,
    key: CacheKey,
}

impl SourceRef {
    /// Validates `url` as an absolute http(s) URL and derives its cache key.
    pub fn parse(url: &str) -> Result<Self, DocsError> {
        let trimmed = url.trim();
        let parsed = validate_url(trimmed)?;
        let normalized = normalize(parsed);
        let key = CacheKey::for_url(&normalized);
        Ok(Self {
            url: trimmed.to_string(),
            normalized,
            key,
        })
    }

    /// The URL as supplied by the caller (whitespace trimmed).
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The URL the fetcher should request.
    pub fn normalized_url(&self) -> &str {
        &self.normalized
    }

    pub fn key(&self) -> CacheKey {
        self.key
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.url, self.key)
    }
}

/// Parses `url` and checks it is an http(s) URL with a host.
pub fn validate_url(url: &str) -> Result<Url, DocsError> {
    if url.trim().is_empty() {
        return Err(DocsError::invalid("URL must be a non-empty string"));
    }

    let parsed =
        Url::parse(url).map_err(|e| DocsError::invalid(format!("Invalid URL '{}': {}", url, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DocsError::invalid(format!(
            "Invalid URL '{}': scheme must be http or https",
            url
        )));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(DocsError::invalid(format!(
            "Invalid URL '{}': missing host",
            url
        )));
    }

    Ok(parsed)
}

fn normalize(mut url: Url) -> String {
    url.set_fragment(None);
    url.to_string()
}
