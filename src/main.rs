use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_rec_api::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, create_redis_client, Cache, PostgresUserRepository},
    recommender::Recommender,
    services::providers::TmdbProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Both models are fitted before the listener binds
    let (movies_path, ratings_path) = (config.movies_path.clone(), config.ratings_path.clone());
    let recommender = tokio::task::spawn_blocking(move || {
        Recommender::from_csv_paths(&movies_path, &ratings_path)
    })
    .await
    .context("Recommender construction panicked")??;
    tracing::info!(movies = recommender.movies().len(), "Recommender ready");

    let pool = create_pool(&config.database_url)?;
    let users = Arc::new(PostgresUserRepository::new(pool));

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client);
    let movie_provider = Arc::new(TmdbProvider::new(&config, cache)?);

    let state = AppState::new(recommender, movie_provider, users);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
    tracing::info!(address = %config.bind_address(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_writer.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
