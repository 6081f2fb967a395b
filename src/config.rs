//! Server configuration loaded from an optional TOML file plus environment overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "DOCS_SEARCH_MCP_CONFIG";

/// Environment variable carrying the reader service credential.
pub const READER_API_KEY_ENV: &str = "JINA_API_KEY";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub search: SearchConfig,
    pub scrape: ScrapeConfig,
    /// Upper bound on a whole `search_docs` request, including any index build.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            search: SearchConfig::default(),
            scrape: ScrapeConfig::default(),
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub max_archive_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            max_archive_bytes: 256 * 1024 * 1024,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Result count used when a request does not name one.
    pub default_max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_max_results: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Prefix prepended to the page URL to obtain its markdown rendering.
    pub reader_url: String,
    pub timeout_secs: u64,
    pub api_key: Option<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            reader_url: "https://r.jina.ai/".to_string(),
            timeout_secs: 30,
            api_key: None,
        }
    }
}

impl Config {
    /// Loads configuration for the running server.
    ///
    /// Uses `$DOCS_SEARCH_MCP_CONFIG` if set, otherwise
    /// `<config dir>/docs-search-mcp/config.toml` when it exists, otherwise
    /// built-in defaults. `$JINA_API_KEY` overrides `scrape.api_key`.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let path = explicit.or_else(|| {
            dirs::config_dir()
                .map(|dir| dir.join("docs-search-mcp").join("config.toml"))
                .filter(|path| path.is_file())
        });

        let mut config = match path {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };

        if let Ok(key) = std::env::var(READER_API_KEY_ENV)
            && !key.trim().is_empty()
        {
            config.scrape.api_key = Some(key);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.fetch.timeout_secs == 0 {
            anyhow::bail!("fetch.timeout_secs must be > 0");
        }
        if self.fetch.max_archive_bytes == 0 {
            anyhow::bail!("fetch.max_archive_bytes must be > 0");
        }
        if self.scrape.timeout_secs == 0 {
            anyhow::bail!("scrape.timeout_secs must be > 0");
        }
        if self.search.default_max_results == 0 {
            anyhow::bail!("search.default_max_results must be >= 1");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be > 0");
        }
        if !(self.scrape.reader_url.starts_with("http://")
            || self.scrape.reader_url.starts_with("https://"))
        {
            anyhow::bail!(
                "scrape.reader_url must be an http(s) URL, got '{}'",
                self.scrape.reader_url
            );
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
