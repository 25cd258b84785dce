use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::aggregator::Aggregator;
use crate::extractor::NewsItem;
use crate::registry::FeedSource;

pub const NEWS_CACHE_CONTROL: &str = "public, max-age=600, stale-while-revalidate=600";

pub struct AppState {
    pub aggregator: Aggregator,
}

#[derive(Debug, Default, PartialEq)]
pub struct NewsQuery {
    pub feeds: Option<String>,
}

impl NewsQuery {
    /// Build from raw query pairs. A repeated `feeds` parameter keeps its
    /// first value.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let feeds = pairs
            .into_iter()
            .find(|(name, _)| name == "feeds")
            .map(|(_, value)| value);
        Self { feeds }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewsResponse {
    pub items: Vec<NewsItem>,
}

#[derive(Debug, Serialize)]
pub struct FeedsResponse<'a> {
    pub feeds: &'a [FeedSource],
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/news", get(news))
        .route("/api/feeds", get(feeds))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Route handlers

/// Aggregated headlines. Always answers 200 with `{ "items": [...] }`;
/// failures only shrink the list.
pub async fn news(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(pairs)) => NewsQuery::from_pairs(pairs),
        Err(rejection) => {
            warn!(error = %rejection, "Rejected news query");
            return Json(NewsResponse { items: Vec::new() }).into_response();
        }
    };

    let outcome = AssertUnwindSafe(state.aggregator.aggregate(query.feeds.as_deref()))
        .catch_unwind()
        .await;

    match outcome {
        Ok(items) => (
            [(header::CACHE_CONTROL, NEWS_CACHE_CONTROL)],
            Json(NewsResponse { items }),
        )
            .into_response(),
        Err(_) => {
            error!("Aggregation panicked");
            Json(NewsResponse { items: Vec::new() }).into_response()
        }
    }
}

pub async fn feeds(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(FeedsResponse {
        feeds: state.aggregator.registry().list_feeds(),
    })
    .into_response()
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
