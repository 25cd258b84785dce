//! Newtab News - headline aggregation for a personal start page
//!
//! Fetches a small set of RSS feeds concurrently, extracts items with a
//! tolerant text scanner, and serves a merged, de-duplicated JSON list.

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod entities;
pub mod extractor;
pub mod fetcher;
pub mod registry;
pub mod routes;
