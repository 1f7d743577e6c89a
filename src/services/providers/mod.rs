/// External movie metadata providers
///
/// The web layer only depends on [`MovieProvider`]; TMDB is the one implementation
/// today, and tests substitute a mock.
use crate::{error::AppResult, models::MovieSummary};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Most recommendations returned by [`MovieProvider::recommendations`]
pub const MAX_PROVIDER_RECOMMENDATIONS: usize = 10;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieProvider: Send + Sync {
    /// Movies whose title matches `title`, best match first
    async fn search_movies(&self, title: &str) -> AppResult<Vec<MovieSummary>>;

    /// Movies the provider recommends for `movie_id`, at most
    /// [`MAX_PROVIDER_RECOMMENDATIONS`]
    async fn recommendations(&self, movie_id: i64) -> AppResult<Vec<MovieSummary>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
