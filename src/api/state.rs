use std::sync::Arc;

use crate::db::UserRepository;
use crate::recommender::Recommender;
use crate::services::providers::MovieProvider;

/// Shared application state
///
/// Everything behind it is immutable after startup or synchronizes internally, so
/// handlers only ever clone the `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub movie_provider: Arc<dyn MovieProvider>,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    pub fn new(
        recommender: Recommender,
        movie_provider: Arc<dyn MovieProvider>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            recommender: Arc::new(recommender),
            movie_provider,
            users,
        }
    }
}
