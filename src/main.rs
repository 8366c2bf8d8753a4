use std::sync::Arc;

use retailer_recs::{
    config::{CacheBackendKind, Config, StorageBackend},
    db::{
        create_pool, create_redis_client, run_migrations, Cache, CacheWriterHandle,
        InteractionStore, MemoryCache, MemoryStore, PgStore, RedisCache,
    },
    routes::{create_router, AppState},
    services::SimilarityRecommender,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn InteractionStore> = match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database_url, config.db_max_connections).await?;
            run_migrations(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };

    let (cache, cache_writer): (Cache, Option<CacheWriterHandle>) = match config.cache_backend {
        CacheBackendKind::Redis => {
            let client = create_redis_client(&config.redis_url)?;
            let (backend, handle) = RedisCache::spawn(client);
            (Cache::new(Arc::new(backend)), Some(handle))
        }
        CacheBackendKind::Memory => (Cache::new(Arc::new(MemoryCache::new())), None),
    };

    let recommender = SimilarityRecommender::new(config.recommender_options());
    tracing::info!(
        store = store.name(),
        cache = ?config.cache_backend,
        cache_ttl_secs = config.cache_ttl_secs,
        options = ?recommender.options(),
        "Application state initialized"
    );

    let state = Arc::new(AppState::new(
        store,
        cache,
        recommender,
        config.cache_ttl_secs,
    ));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
