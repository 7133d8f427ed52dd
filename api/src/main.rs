mod config;
mod constants;
mod domain;
mod routes;
mod services;

use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use services::apify::ApifyClient;
use services::token_cache::BearerTokenCache;
use services::twitter::TwitterClient;
use services::{ImagePostSource, SocialPostSource};

pub struct AppState {
    pub twitter: Arc<dyn SocialPostSource>,
    pub instagram: Arc<dyn ImagePostSource>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("search_proxy=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let x_http = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()
        .context("Failed to build X API HTTP client")?;
    let apify_http = reqwest::Client::builder()
        .timeout(config.orchestrator_timeout)
        .build()
        .context("Failed to build Apify HTTP client")?;

    let mut twitter = TwitterClient::new(
        &config.x_api_key,
        &config.x_api_secret,
        &config.x_api_base_url,
        x_http,
    );
    if let Some(token) = &config.x_bearer_token {
        info!("Using pre-provisioned X bearer token");
        twitter = twitter.with_token_cache(Arc::new(BearerTokenCache::with_token(token.clone())));
    }
    let instagram = ApifyClient::new(&config.apify_token, &config.apify_base_url, apify_http);

    let state = Arc::new(AppState {
        twitter: Arc::new(twitter),
        instagram: Arc::new(instagram),
    });

    let app = routes::app(state);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(
        %addr,
        upstream_timeout = ?config.upstream_timeout,
        orchestrator_timeout = ?config.orchestrator_timeout,
        "Search proxy listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    info!("Search proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
