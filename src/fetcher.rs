use futures::StreamExt;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

use crate::cache::FeedCache;
use crate::config::Config;
use crate::extractor::{extract_items, NewsItem};
use crate::registry::FeedSource;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("response too large: at least {0} bytes")]
    ResponseTooLarge(usize),
}

pub struct Fetcher {
    client: Client,
    cache: FeedCache,
    max_feed_bytes: usize,
}

impl Fetcher {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            cache: FeedCache::new(config.cache_ttl()),
            max_feed_bytes: config.max_feed_bytes,
        })
    }

    /// Fetch one feed and extract its items. Exactly one attempt is made.
    pub async fn fetch_items(&self, feed: &FeedSource) -> Result<Vec<NewsItem>, FetchError> {
        let body = self.fetch_body(feed).await?;
        let items = extract_items(&body, &feed.display_name);
        debug!(feed = %feed.key, count = items.len(), "Extracted items");
        Ok(items)
    }

    async fn fetch_body(&self, feed: &FeedSource) -> Result<String, FetchError> {
        if let Some(body) = self.cache.get(&feed.feed_url).await {
            debug!(feed = %feed.key, "Serving feed body from cache");
            return Ok(body);
        }

        if !self.cache.is_enabled() {
            return self.download(feed).await;
        }

        let _guard = self.cache.lock_url(&feed.feed_url).await;
        if let Some(body) = self.cache.get(&feed.feed_url).await {
            debug!(feed = %feed.key, "Serving feed body fetched by a concurrent request");
            return Ok(body);
        }

        let body = self.download(feed).await?;
        self.cache.insert(&feed.feed_url, body.clone()).await;
        Ok(body)
    }

    async fn download(&self, feed: &FeedSource) -> Result<String, FetchError> {
        info!("Fetching feed: {} ({})", feed.display_name, feed.feed_url);

        let response = self.client.get(&feed.feed_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let bytes = read_limited_bytes(response, self.max_feed_bytes).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Read a response body, giving up as soon as it exceeds `limit` bytes.
async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge(len as usize));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let total = bytes.len().saturating_add(chunk.len());
        if total > limit {
            return Err(FetchError::ResponseTooLarge(total));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
