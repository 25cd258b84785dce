use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::config::{Config, FeedConfig};

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("feed key must not be empty")]
    EmptyKey,
    #[error("duplicate feed key: {0}")]
    DuplicateKey(String),
}

/// A remote RSS source the dashboard knows about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedSource {
    pub key: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(skip)]
    pub feed_url: String,
}

/// Immutable table of feed sources, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct FeedRegistry {
    feeds: Vec<FeedSource>,
}

impl FeedRegistry {
    pub fn new(feeds: Vec<FeedSource>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for feed in &feeds {
            if feed.key.trim().is_empty() {
                return Err(RegistryError::EmptyKey);
            }
            if !seen.insert(feed.key.as_str()) {
                return Err(RegistryError::DuplicateKey(feed.key.clone()));
            }
        }

        Ok(Self { feeds })
    }

    pub fn from_config(configs: &[FeedConfig]) -> Result<Self, RegistryError> {
        let feeds = configs
            .iter()
            .map(|c| FeedSource {
                key: c.key.trim().to_string(),
                display_name: c.name.clone(),
                feed_url: c.url.clone(),
            })
            .collect();
        Self::new(feeds)
    }

    pub fn list_feeds(&self) -> &[FeedSource] {
        &self.feeds
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.feeds.iter().map(|f| f.key.as_str())
    }

    /// Sources whose key is in `keys`, in registry order.
    pub fn filter_by_keys(&self, keys: &HashSet<String>) -> Vec<FeedSource> {
        self.feeds
            .iter()
            .filter(|f| keys.contains(&f.key))
            .cloned()
            .collect()
    }
}

impl Default for FeedRegistry {
    fn default() -> Self {
        let feeds = Config::default()
            .feeds
            .into_iter()
            .map(|c| FeedSource {
                key: c.key,
                display_name: c.name,
                feed_url: c.url,
            })
            .collect();
        Self { feeds }
    }
}
