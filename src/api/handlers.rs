use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::{MovieSummary, NewUser, UserProfile};
use crate::recommender::{ScoredMovie, DEFAULT_LIMIT};
use crate::services::accounts;

use super::extract::{JsonBody, Path, Query};
use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MovieIdQuery {
    #[serde(rename = "movieId")]
    pub movie_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub q: Option<String>,
    pub n: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct UserRecommendationsResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CatalogSearchResponse {
    pub query: String,
    pub results: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SimilarMoviesResponse<'a> {
    #[serde(rename = "movieId")]
    pub movie_id: i64,
    pub results: Vec<ScoredMovie<'a>>,
}

/// Returns the trimmed value of a required query parameter
fn required<'a>(value: &'a Option<String>, name: &str) -> AppResult<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("Missing {}", name)))
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Best TMDB match for a title
pub async fn search_movie(
    State(state): State<AppState>,
    Query(params): Query<TitleQuery>,
) -> AppResult<Json<MovieSummary>> {
    let title = required(&params.title, "title")?;

    let movies = state.movie_provider.search_movies(title).await?;
    tracing::debug!(
        provider = state.movie_provider.name(),
        results = movies.len(),
        "Title search finished"
    );

    movies
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Movie not found".to_string()))
}

/// TMDB recommendations for a TMDB movie id
pub async fn recommend(
    State(state): State<AppState>,
    Query(params): Query<MovieIdQuery>,
) -> AppResult<Json<Value>> {
    let raw = required(&params.movie_id, "movieId")?;
    let movie_id: i64 = raw
        .parse()
        .map_err(|_| AppError::InvalidInput("Invalid movieId".to_string()))?;

    let results = state.movie_provider.recommendations(movie_id).await?;

    Ok(Json(json!({ "results": results })))
}

/// Collaborative recommendations for a local user id
pub async fn user_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<LimitQuery>,
) -> Json<UserRecommendationsResponse> {
    let n = params.n.unwrap_or(DEFAULT_LIMIT);
    let recommendations = state.recommender.get_recommendations(&user_id, n);

    tracing::info!(
        user_id = %user_id,
        requested = n,
        returned = recommendations.len(),
        "Collaborative recommendations served"
    );

    Json(UserRecommendationsResponse {
        user_id,
        recommendations,
    })
}

/// Case-insensitive title search over the local catalog
pub async fn search_catalog(
    State(state): State<AppState>,
    Query(params): Query<CatalogQuery>,
) -> AppResult<Json<CatalogSearchResponse>> {
    let query = required(&params.q, "q")?;
    let results = state
        .recommender
        .search_movies(query, params.n.unwrap_or(DEFAULT_LIMIT));

    Ok(Json(CatalogSearchResponse {
        query: query.to_string(),
        results,
    }))
}

/// Movies whose metadata is closest to a local movie
pub async fn similar_movies(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<Value>> {
    let n = params.n.unwrap_or(DEFAULT_LIMIT);
    let results = state
        .recommender
        .get_content_based_recommendations(movie_id, n);

    // Serialized here since the scored rows borrow from the shared recommender
    let body = serde_json::to_value(SimilarMoviesResponse { movie_id, results })
        .map_err(|e| AppError::Internal(format!("Serialization error: {}", e)))?;

    Ok(Json(body))
}

/// Public profile of a registered user
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<UserProfile>> {
    let profile = accounts::profile(state.users.as_ref(), &username).await?;
    Ok(Json(profile))
}

/// Register a new account
pub async fn register_user(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<NewUser>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    let user = accounts::register(state.users.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(UserProfile::from(&user))))
}
