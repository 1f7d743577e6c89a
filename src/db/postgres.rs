use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Creates the PostgreSQL pool backing the user repository
///
/// Connections are opened lazily, so the service still starts (and serves the
/// recommender and TMDB routes) while the database is unreachable.
pub fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect_lazy(database_url)?;

    Ok(pool)
}
