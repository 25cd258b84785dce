//! Tolerant RSS item extraction.
//!
//! Real-world feeds are frequently not well-formed XML, so items are located
//! with a handful of case-insensitive patterns instead of a strict parser.
//! A broken item is skipped; extraction as a whole never fails.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::entities::{decode_xml_entities, strip_cdata};

/// Maximum number of items taken from a single feed body.
pub const MAX_ITEMS_PER_FEED: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    #[serde(rename = "source")]
    pub source_name: String,
    #[serde(rename = "publishedAt", skip_serializing_if = "Option::is_none", default)]
    pub published_at: Option<String>,
}

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("extractor pattern is valid")
}

static ITEM_OPEN: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)<item[\s>]"));
static TITLE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<title>(.*?)</title>"));
static LINK: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<link>(.*?)</link>"));
static LINK_ATTRS: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?is)<link[^>]*>(.*?)</link>"));
static PUB_DATE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<pubDate>(.*?)</pubDate>"));
static DC_DATE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<dc:date>(.*?)</dc:date>"));

/// Extract up to [`MAX_ITEMS_PER_FEED`] items, in document order.
pub fn extract_items(xml: &str, source_name: &str) -> Vec<NewsItem> {
    ITEM_OPEN
        .split(xml)
        .skip(1)
        .filter_map(|fragment| parse_item(&format!("<item {fragment}"), source_name))
        .take(MAX_ITEMS_PER_FEED)
        .collect()
}

fn parse_item(block: &str, source_name: &str) -> Option<NewsItem> {
    let title_raw = first_match(block, &TITLE).unwrap_or_default();
    let link_raw = first_match(block, &LINK)
        .or_else(|| first_match(block, &LINK_ATTRS))
        .unwrap_or_default();

    let title = normalize(title_raw);
    let url = normalize(link_raw);
    if title.is_empty() || url.is_empty() {
        return None;
    }

    let published_at = first_match(block, &PUB_DATE)
        .or_else(|| first_match(block, &DC_DATE))
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    Some(NewsItem {
        title,
        url,
        source_name: source_name.to_string(),
        published_at,
    })
}

fn first_match<'a>(block: &'a str, re: &Regex) -> Option<&'a str> {
    re.captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

fn normalize(raw: &str) -> String {
    decode_xml_entities(strip_cdata(raw)).trim().to_string()
}
