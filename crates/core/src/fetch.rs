//! Content fetching from URLs, files, and stdin.
//!
//! Crawls go through the [`PageSource`] trait so the network can be swapped
//! for canned pages in tests. [`HttpSource`] is the real implementation.

use std::fs;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::{HarvestError, Result};

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 15,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// Anything that can return the HTML of a page.
pub trait PageSource {
    /// Fetches the body of `url` as text.
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String>> + Send;
}

/// A [`PageSource`] backed by one reusable reqwest client.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    config: FetchConfig,
}

impl HttpSource {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(HarvestError::HttpError)?;

        Ok(Self { client, config })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl PageSource for HttpSource {
    async fn fetch(&self, url: &Url) -> Result<String> {
        get_text(&self.client, url.clone(), self.config.timeout).await
    }
}

/// Fetches HTML content from a URL.
///
/// Follows redirects, respects the configured timeout and treats non-success
/// status codes as errors.
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    let parsed_url = Url::parse(url).map_err(|e| HarvestError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed_url.scheme(), "http" | "https") {
        return Err(HarvestError::InvalidUrl(
            "URL must use http:// or https://".to_string(),
        ));
    }

    let source = HttpSource::new(config.clone())?;
    source.fetch(&parsed_url).await
}

async fn get_text(client: &Client, url: Url, timeout: u64) -> Result<String> {
    let response = client
        .get(url)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| {
            if e.is_timeout() {
                HarvestError::Timeout { timeout }
            } else {
                HarvestError::HttpError(e)
            }
        })?;

    let content = response.text().await?;

    Ok(content)
}

/// Reads HTML content from a local file.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(HarvestError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(HarvestError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(HarvestError::from)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 15);
        assert!(config.user_agent.contains("Mozilla/5.0"));
    }

    #[tokio::test]
    async fn test_fetch_url_invalid() {
        let result = fetch_url("not-a-url", &FetchConfig::default()).await;
        assert!(matches!(result, Err(HarvestError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_url_rejects_other_schemes() {
        let result = fetch_url("ftp://example.com/index.html", &FetchConfig::default()).await;
        assert!(matches!(result, Err(HarvestError::InvalidUrl(_))));
    }

    #[test]
    fn test_fetch_file_not_found() {
        let result = fetch_file("/nonexistent/path/file.html");
        assert!(matches!(result, Err(HarvestError::FileNotFound(_))));
    }

    #[test]
    fn test_fetch_file_reads_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, "<p><strong>Improving</strong></p>").unwrap();

        let html = fetch_file(path.to_str().unwrap()).unwrap();
        assert!(html.contains("Improving"));
    }
}
