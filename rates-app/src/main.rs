//! # Rates Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Build the upstream rate provider with retry and circuit breaking
//! - Create the currency service over an in-memory cache
//! - Start the HTTP server

mod config;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rates_hex::{
    CurrencyService,
    inbound::{HttpServer, JwtAuth, UserStore},
};
use rates_upstream::{HttpRateProvider, InMemoryRateCache, ResilientProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rates_app=debug,rates_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting rates server on port {}", config.port);
    tracing::info!("Using upstream provider: {}", config.upstream_url);

    // Build the upstream provider with resilience wrapping
    let http = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()?;
    let provider = ResilientProvider::new(HttpRateProvider::new(http, config.upstream_url));

    // Create the currency service
    let service = CurrencyService::new(provider, InMemoryRateCache::new());

    // Auth setup
    let jwt = JwtAuth::new(&config.jwt_secret, config.jwt_issuer, config.jwt_audience);
    let users = match &config.auth_users {
        Some(spec) => UserStore::parse(spec)?,
        None => {
            tracing::warn!("AUTH_USERS not set, using built-in development credentials");
            UserStore::with_defaults()
        }
    };

    // Create and run the HTTP server
    let server = HttpServer::with_rate_limit(service, jwt, users, config.rate_limit_per_minute);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    Ok(())
}
