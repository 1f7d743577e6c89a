use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        // Outermost, so the id exists before the trace span is created
        .layer(middleware::from_fn(request_id_middleware))
}

/// Routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        // TMDB proxy
        .route("/search", get(handlers::search_movie))
        .route("/recommend", get(handlers::recommend))
        // Local catalog
        .route("/recommendations/:user_id", get(handlers::user_recommendations))
        .route("/movies/search", get(handlers::search_catalog))
        .route("/movies/:movie_id/similar", get(handlers::similar_movies))
        // Accounts
        .route("/users", post(handlers::register_user))
        .route("/users/:username", get(handlers::get_user))
}
