use crate::config::FetchConfig;
use crate::types::{FetchError, HtmlFetcher, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Single-shot page fetcher. No retries: a failed request fails the run.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    /// A page of exactly `max_page_size_mb` is accepted; one byte more is not.
    fn too_large(&self, url: &str, bytes: u64) -> Option<FetchError> {
        let limit = self.config.max_page_size_mb as u64 * BYTES_PER_MB;
        if bytes > limit {
            Some(FetchError::TooLarge { url: url.to_string(), size_mb: (bytes / BYTES_PER_MB) as usize })
        } else {
            None
        }
    }
}

#[async_trait]
impl HtmlFetcher for Fetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        let start_time = Instant::now();

        Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        debug!("Fetching page: {}", url);

        let mut response = self.client.get(url).send().await.map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            FetchError::Transport { url: url.to_string(), message: e.to_string() }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Fetching {} returned HTTP {}", url, status);
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
        }

        if let Some(content_length) = response.content_length() {
            if let Some(err) = self.too_large(url, content_length) {
                warn!("Refusing {}: declared length {} bytes", url, content_length);
                return Err(err);
            }
        }

        // Chunked responses carry no length header, so count while reading
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })? {
            body.extend_from_slice(&chunk);
            if let Some(err) = self.too_large(url, body.len() as u64) {
                warn!("Aborting {}: body exceeded {} MB", url, self.config.max_page_size_mb);
                return Err(err);
            }
        }
        let content = String::from_utf8_lossy(&body).into_owned();

        info!(
            "Fetched page: {} ({} bytes in {}ms)",
            url,
            content.len(),
            start_time.elapsed().as_millis()
        );
        Ok(content)
    }
}
