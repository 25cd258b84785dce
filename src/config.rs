use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Per-feed reuse window in seconds (0 disables caching)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,
    /// Upstream request timeout in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: u64,
    #[serde(default = "default_max_feed_bytes")]
    pub max_feed_bytes: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedConfig>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_cache_ttl() -> u64 {
    600
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_max_feed_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_user_agent() -> String {
    "BetterDefaultPage/1.0 (+https://example.com)".to_string()
}

fn default_feeds() -> Vec<FeedConfig> {
    vec![
        FeedConfig::new("hn", "Hacker News", "https://news.ycombinator.com/rss"),
        FeedConfig::new("npr", "NPR", "https://feeds.npr.org/1001/rss.xml"),
        FeedConfig::new("verge", "The Verge", "https://www.theverge.com/rss/index.xml"),
    ]
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FeedConfig {
    pub key: String,
    pub name: String,
    pub url: String,
}

impl FeedConfig {
    pub fn new(key: &str, name: &str, url: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cache_ttl: default_cache_ttl(),
            fetch_timeout: default_fetch_timeout(),
            max_feed_bytes: default_max_feed_bytes(),
            user_agent: default_user_agent(),
            feeds: default_feeds(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the built-in defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(15));
        assert_eq!(config.max_feed_bytes, 5 * 1024 * 1024);
        assert!(config.user_agent.starts_with("BetterDefaultPage/1.0"));
    }

    #[test]
    fn test_default_feeds_are_hn_npr_verge() {
        let keys: Vec<_> = Config::default()
            .feeds
            .into_iter()
            .map(|f| f.key)
            .collect();
        assert_eq!(keys, vec!["hn", "npr", "verge"]);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
            bind_addr = "127.0.0.1:8080"
            cache_ttl = 60
            fetch_timeout = 5

            [[feeds]]
            key = "lobsters"
            name = "Lobste.rs"
            url = "https://lobste.rs/rss"

            [[feeds]]
            key = "blog"
            name = "Blog"
            url = "https://blog.example.com/feed.xml"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.cache_ttl, 60);
        assert_eq!(config.fetch_timeout, 5);
        assert_eq!(config.feeds.len(), 2);
        assert_eq!(config.feeds[0].key, "lobsters");
        assert_eq!(config.feeds[0].name, "Lobste.rs");
        assert_eq!(config.feeds[1].url, "https://blog.example.com/feed.xml");
    }

    #[test]
    fn test_omitted_feeds_fall_back_to_builtin() {
        let config = Config::from_str("cache_ttl = 0").unwrap();

        assert_eq!(config.cache_ttl, 0);
        assert_eq!(config.feeds.len(), 3);
        assert_eq!(config.feeds[0].name, "Hacker News");
    }

    #[test]
    fn test_empty_feeds_list() {
        let config = Config::from_str("feeds = []").unwrap();
        assert!(config.feeds.is_empty());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/path/config.toml").unwrap();
        assert_eq!(config.feeds, default_feeds());
    }

    #[test]
    fn test_load_or_default_rejects_invalid_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"this is not valid toml {{{").unwrap();

        assert!(Config::load_or_default(temp_file.path()).is_err());
    }

    #[test]
    fn test_load_config_missing_required_fields() {
        let content = r#"
            [[feeds]]
            key = "test"
            name = "Test Feed"
            # Missing url field
        "#;

        let result = Config::from_str(content);
        assert!(result.is_err());
    }
}
