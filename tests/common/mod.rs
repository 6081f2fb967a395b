//! Shared test fixtures and utilities for integration tests.
//!
//! # Test Isolation Strategy
//!
//! No test touches the network. Each test gets its own `DocState` wired to a
//! [`StubFetcher`] that serves an in-memory zip archive, so every test starts
//! with an empty index cache and can observe how often the pipeline fetched.
//!
//! # Available Fixtures
//!
//! - `fox_archive`: the three-document quick/lazy/brown fox archive
//! - `fox_state`: a `DocState` serving `fox_archive` for any URL

use docs_search_mcp::{ArchiveFetcher, Config, DocState, DocsError};
use futures::FutureExt;
use futures::future::BoxFuture;
use rstest::fixture;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Archive URL used by tests; never actually requested.
pub const FOX_URL: &str = "https://github.com/example/docs/archive/refs/heads/main.zip";

/// Builds a zip archive in memory. Names ending in `/` become directories.
pub fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(*name, SimpleFileOptions::default())
                .unwrap();
        } else {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// [`ArchiveFetcher`] that serves fixed bytes and counts calls.
#[derive(Debug)]
pub struct StubFetcher {
    response: Result<Vec<u8>, DocsError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    urls: std::sync::Mutex<Vec<String>>,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl StubFetcher {
    pub fn serving(bytes: Vec<u8>) -> Self {
        Self {
            response: Ok(bytes),
            delay: None,
            calls: AtomicUsize::new(0),
            urls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: DocsError) -> Self {
        Self {
            response: Err(err),
            ..Self::serving(Vec::new())
        }
    }

    /// Sleep before responding.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl ArchiveFetcher for StubFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, DocsError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        let response = self.response.clone();
        let delay = self.delay;
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            response
        }
        .boxed()
    }
}

/// State wired to `fetcher` with default configuration.
pub fn state_with(fetcher: Arc<StubFetcher>) -> Arc<DocState> {
    state_with_config(Config::default(), fetcher)
}

pub fn state_with_config(config: Config, fetcher: Arc<StubFetcher>) -> Arc<DocState> {
    docs_search_mcp::tracing::init();
    Arc::new(DocState::with_fetcher(config, fetcher).unwrap())
}

#[fixture]
pub fn fox_archive() -> Vec<u8> {
    zip_of(&[
        ("docs-main/", b""),
        ("docs-main/a.md", b"the quick fox"),
        ("docs-main/b.md", b"the lazy dog"),
        ("docs-main/c.mdx", b"quick brown fox jumps"),
        ("docs-main/logo.png", b"\x89PNG"),
    ])
}

/// Fox archive state plus the fetcher, for call counting.
#[allow(dead_code)]
pub struct FoxState {
    pub state: Arc<DocState>,
    pub fetcher: Arc<StubFetcher>,
}

#[fixture]
pub fn fox_state(fox_archive: Vec<u8>) -> FoxState {
    let fetcher = Arc::new(StubFetcher::serving(fox_archive));
    FoxState {
        state: state_with(Arc::clone(&fetcher)),
        fetcher,
    }
}

/// Minimal HTTP/1.1 server answering GETs with canned responses by path.
///
/// Every response closes the connection. Unknown paths get a 404. Request
/// heads are recorded for header assertions.
#[allow(dead_code)]
pub struct CannedServer {
    pub addr: std::net::SocketAddr,
    requests: Arc<std::sync::Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl CannedServer {
    pub async fn start(routes: Vec<(&'static str, Vec<u8>)>) -> Self {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(std::sync::Mutex::new(Vec::new()));
        let routes = Arc::new(routes);

        let recorded = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let routes = Arc::clone(&routes);
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    let mut head = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => head.extend_from_slice(&buf[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&head).into_owned();
                    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    recorded.lock().unwrap().push(head);

                    let response = routes
                        .iter()
                        .find(|(route, _)| *route == path)
                        .map_or_else(|| status_response(404, "Not Found"), |(_, r)| r.clone());
                    let _ = socket.write_all(&response).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { addr, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[allow(dead_code)]
pub fn ok_response(body: &[u8]) -> Vec<u8> {
    let mut response = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(body);
    response
}

/// 200 response with a chunked body and no Content-Length.
#[allow(dead_code)]
pub fn chunked_response(chunks: &[&[u8]]) -> Vec<u8> {
    let mut response =
        b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n".to_vec();
    for chunk in chunks {
        response.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
        response.extend_from_slice(chunk);
        response.extend_from_slice(b"\r\n");
    }
    response.extend_from_slice(b"0\r\n\r\n");
    response
}

#[allow(dead_code)]
pub fn redirect_response(location: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        location
    )
    .into_bytes()
}

#[allow(dead_code)]
pub fn status_response(code: u16, reason: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        code, reason
    )
    .into_bytes()
}
