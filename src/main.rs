use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newtab_news::aggregator::Aggregator;
use newtab_news::config::Config;
use newtab_news::fetcher::Fetcher;
use newtab_news::registry::FeedRegistry;
use newtab_news::routes::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newtab_news=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path =
        std::env::var("NEWTAB_CONFIG").unwrap_or_else(|_| "feeds.toml".to_string());
    let config = Config::load_or_default(&config_path)?;
    let registry = Arc::new(FeedRegistry::from_config(&config.feeds)?);
    info!("Loaded {} feeds from configuration", registry.list_feeds().len());

    let fetcher = Fetcher::new(&config)?;
    let state = Arc::new(AppState {
        aggregator: Aggregator::new(registry, fetcher),
    });

    let app = routes::app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str()).await?;
    info!("Server starting on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
