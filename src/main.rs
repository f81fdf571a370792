mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod middleware;
mod models;
mod pages;
mod routes;
mod service;

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use config::{Config, DataSource};
use db::{memory::MemoryStore, DBClient, LeaderboardStore};
use dotenv::dotenv;
use routes::create_router;
use service::{airdrop::{AirdropClient, AIRDROP_KEY_HEADER}, mock_data::generate_mock_ambassadors};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<dyn LeaderboardStore>,
    pub airdrop: Option<AirdropClient>,
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn LeaderboardStore>> {
    match config.data_source {
        DataSource::Mock => {
            let ambassadors = generate_mock_ambassadors();
            tracing::info!("Serving {} mock ambassadors from memory", ambassadors.len());
            Ok(Arc::new(MemoryStore::new(ambassadors)))
        }
        DataSource::Database => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;

            let pool = PgPoolOptions::new()
                .max_connections(10)
                .acquire_timeout(Duration::from_secs(5))
                .connect(database_url)
                .await
                .context("Failed to connect to the database")?;
            tracing::info!("✅Connection to the database is successful!");

            if config.run_migrations {
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("Failed to run migrations")?;
                tracing::info!("Migrations applied");
            }

            Ok(Arc::new(DBClient::new(pool)))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = Config::init().context("Invalid configuration")?;

    let db_client = build_store(&config).await?;

    let airdrop = AirdropClient::from_config(&config).context("Failed to build airdrop client")?;
    if airdrop.is_none() {
        tracing::warn!("Airdrop service not configured; callbacks must carry a username");
    }

    let allowed_origins = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect::<Vec<_>>();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([ACCEPT, CONTENT_TYPE, HeaderName::from_static(AIRDROP_KEY_HEADER)])
        .allow_methods([Method::GET, Method::POST]);

    let app_state = AppState {
        env: config.clone(),
        db_client,
        airdrop,
    };

    let app = create_router(Arc::new(app_state)).layer(cors);

    tracing::info!("🚀 Server is running on {}", config.app_url);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    axum::serve(listener, app).await?;

    Ok(())
}
