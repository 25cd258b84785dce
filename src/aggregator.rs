use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use crate::extractor::NewsItem;
use crate::fetcher::Fetcher;
use crate::registry::FeedRegistry;

/// Items kept from the concatenated per-feed lists before de-duplication.
pub const MERGE_LIMIT: usize = 30;
/// Maximum number of unique items in a response.
pub const RESULT_LIMIT: usize = 18;

/// Turn the `feeds` query value into a key set. `None` selects every
/// registered feed; blank segments are dropped.
pub fn parse_feed_keys(param: Option<&str>, registry: &FeedRegistry) -> HashSet<String> {
    match param {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect(),
        None => registry.keys().map(str::to_string).collect(),
    }
}

/// Concatenate per-feed lists, cap, then de-duplicate by URL keeping the
/// first occurrence.
pub fn merge_items(per_feed: Vec<Vec<NewsItem>>) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    per_feed
        .into_iter()
        .flatten()
        .take(MERGE_LIMIT)
        .filter(|item| seen.insert(item.url.clone()))
        .take(RESULT_LIMIT)
        .collect()
}

pub struct Aggregator {
    registry: Arc<FeedRegistry>,
    fetcher: Fetcher,
}

impl Aggregator {
    pub fn new(registry: Arc<FeedRegistry>, fetcher: Fetcher) -> Self {
        Self { registry, fetcher }
    }

    pub fn registry(&self) -> &FeedRegistry {
        &self.registry
    }

    /// Fetch the selected feeds concurrently and merge them. Upstream
    /// failures are logged and contribute no items.
    pub async fn aggregate(&self, feeds_param: Option<&str>) -> Vec<NewsItem> {
        let keys = parse_feed_keys(feeds_param, &self.registry);
        let feeds = self.registry.filter_by_keys(&keys);
        if feeds.is_empty() {
            return Vec::new();
        }

        let results = join_all(feeds.iter().map(|feed| self.fetcher.fetch_items(feed))).await;

        let per_feed = feeds
            .iter()
            .zip(results)
            .map(|(feed, result)| match result {
                Ok(items) => items,
                Err(e) => {
                    warn!(feed = %feed.key, error = %e, "Feed fetch failed");
                    Vec::new()
                }
            })
            .collect();

        let items = merge_items(per_feed);
        info!(feeds = feeds.len(), items = items.len(), "Aggregated headlines");
        items
    }
}
