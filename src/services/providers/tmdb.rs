/// TMDB (The Movie Database) provider
///
/// API Flow:
/// 1. Search: /search/movie?query=... → ranked matches
/// 2. Recommendations: /movie/{id}/recommendations → related movies
///
/// Every request carries a fixed timeout and is retried with exponential backoff on
/// 502/503/504, connection failures and timeouts. Responses are cached in Redis.
use std::time::Duration;

use reqwest::{Client as HttpClient, StatusCode};

use crate::{
    cached,
    config::Config,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{MovieSummary, TmdbPage},
    services::providers::{MovieProvider, MAX_PROVIDER_RECOMMENDATIONS},
};

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const RECOMMENDATIONS_CACHE_TTL: u64 = 86400; // 1 day
const RETRY_STATUSES: [StatusCode; 3] = [
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// How failed requests are retried
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each one after
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(1u32 << attempt.min(16))
    }
}

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    image_base_url: String,
    retry: RetryPolicy,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(config: &Config, cache: Cache) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(config.tmdb_timeout())
            .build()?;

        let api_key = config.tmdb_api_key.clone().filter(|key| !key.is_empty());
        if api_key.is_none() {
            tracing::warn!("TMDB_API_KEY is not set; TMDB routes will fail until it is");
        }

        Ok(Self {
            http_client,
            api_key,
            api_url: config.tmdb_api_url.trim_end_matches('/').to_string(),
            image_base_url: config.tmdb_image_base_url.clone(),
            retry: RetryPolicy {
                max_retries: config.tmdb_max_retries,
                backoff: config.tmdb_backoff(),
            },
            cache,
        })
    }

    fn api_key(&self) -> AppResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            tracing::error!("TMDB API key is missing");
            AppError::Configuration("Missing TMDB API key".to_string())
        })
    }

    async fn fetch_search(&self, title: &str) -> AppResult<Vec<MovieSummary>> {
        let page = self
            .get_page(
                "/search/movie",
                &[
                    ("query", title),
                    ("language", "en-US"),
                    ("page", "1"),
                    ("include_adult", "false"),
                ],
            )
            .await?;

        let movies = self.summarize(page);
        tracing::info!(
            title = %title,
            results = movies.len(),
            provider = "tmdb",
            "Movie search completed"
        );

        Ok(movies)
    }

    async fn fetch_recommendations(&self, movie_id: i64) -> AppResult<Vec<MovieSummary>> {
        let path = format!("/movie/{}/recommendations", movie_id);
        let page = self
            .get_page(&path, &[("language", "en-US"), ("page", "1")])
            .await?;

        let mut movies = self.summarize(page);
        movies.truncate(MAX_PROVIDER_RECOMMENDATIONS);
        tracing::info!(
            movie_id,
            results = movies.len(),
            provider = "tmdb",
            "Recommendations fetched"
        );

        Ok(movies)
    }

    fn summarize(&self, page: TmdbPage) -> Vec<MovieSummary> {
        page.results
            .into_iter()
            .map(|movie| MovieSummary::from_tmdb(movie, &self.image_base_url))
            .collect()
    }

    /// GETs one page of results, retrying transient failures
    async fn get_page(&self, path: &str, params: &[(&str, &str)]) -> AppResult<TmdbPage> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", self.api_url, path);
        let mut attempt = 0;

        loop {
            let outcome = self
                .http_client
                .get(&url)
                .query(&[("api_key", api_key)])
                .query(params)
                .send()
                .await;

            let retryable = match &outcome {
                Ok(response) => RETRY_STATUSES.contains(&response.status()),
                Err(e) => e.is_connect() || e.is_timeout(),
            };

            if retryable && attempt < self.retry.max_retries {
                let delay = self.retry.delay(attempt);
                attempt += 1;
                tracing::warn!(
                    path = %path,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Transient TMDB failure, retrying"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            let response = outcome.map_err(transport_error)?;
            let status = response.status();
            tracing::info!(path = %path, status = status.as_u16(), "TMDB API response");

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(status_error(status, body));
            }

            return response.json::<TmdbPage>().await.map_err(transport_error);
        }
    }
}

/// Maps a non-success upstream status onto the error returned to the client
fn status_error(status: StatusCode, body: String) -> AppError {
    if status == StatusCode::SERVICE_UNAVAILABLE {
        tracing::error!("TMDB API service unavailable (503)");
        return AppError::UpstreamUnavailable("TMDB API service unavailable (503)".to_string());
    }

    tracing::error!(status = status.as_u16(), "TMDB API HTTP error");
    let details = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        body
    };

    AppError::UpstreamStatus {
        status: status.as_u16(),
        details,
    }
}

/// Maps a transport-level failure onto the error returned to the client
fn transport_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        tracing::error!(error = %e, "TMDB API request timed out");
        AppError::UpstreamTimeout("TMDB API request timed out".to_string())
    } else if e.is_connect() {
        tracing::error!(error = %e, "TMDB API connection error");
        AppError::UpstreamUnavailable("TMDB API connection error".to_string())
    } else {
        tracing::error!(error = %e, "TMDB API request failed");
        AppError::HttpClient(e)
    }
}

#[async_trait::async_trait]
impl MovieProvider for TmdbProvider {
    async fn search_movies(&self, title: &str) -> AppResult<Vec<MovieSummary>> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::InvalidInput("Missing title".to_string()));
        }
        self.api_key()?;

        cached!(
            self.cache,
            CacheKey::MovieSearch(title.to_string()),
            SEARCH_CACHE_TTL,
            self.fetch_search(title)
        )
    }

    async fn recommendations(&self, movie_id: i64) -> AppResult<Vec<MovieSummary>> {
        self.api_key()?;

        cached!(
            self.cache,
            CacheKey::MovieRecommendations(movie_id),
            RECOMMENDATIONS_CACHE_TTL,
            self.fetch_recommendations(movie_id)
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
