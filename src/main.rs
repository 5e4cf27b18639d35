use std::sync::Arc;

use jbrief::{
    cache::{CacheStore, InMemoryCacheStore, Memoizer, RedisCacheStore, SystemClock},
    dashboard::{router, start_refresh_task, DashboardService},
    games::{GameQueryService, GameRepository, InMemoryGameRepository, PostgresGameRepository},
    AppConfig, AppState,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jbrief=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jbrief dashboard backend");

    let config = AppConfig::from_env();

    let repository: Arc<dyn GameRepository> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            info!("Connected to games database");
            Arc::new(PostgresGameRepository::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, serving an empty in-memory store");
            Arc::new(InMemoryGameRepository::new())
        }
    };

    let cache_store: Arc<dyn CacheStore> = match &config.redis_url {
        Some(redis_url) => {
            info!(redis_url = %redis_url, "Using shared redis cache");
            Arc::new(RedisCacheStore::new(redis_url, "jbrief")?)
        }
        None => {
            warn!("REDIS_URL not set, cache is local to this process");
            Arc::new(InMemoryCacheStore::new())
        }
    };

    let clock = Arc::new(SystemClock);
    let memoizer = Memoizer::new(cache_store, clock.clone(), config.cache_ttl)
        .with_date_format(config.date_format.clone());
    let queries = GameQueryService::new(repository, config.latest_games_limit);
    let dashboard = Arc::new(DashboardService::new(queries, memoizer, clock));

    tokio::spawn(start_refresh_task(
        dashboard.clone(),
        config.refresh_interval,
    ));

    let app_state = AppState::new(dashboard, config.date_format.clone());
    let app = router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(bind_addr = %config.bind_addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
