use serde::{Deserialize, Serialize};

pub mod movie;
pub mod user;

pub use movie::{Movie, Rating};
pub use user::{NewUser, User, UserProfile};

/// A movie as returned to the client from the TMDB proxy routes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    #[serde(rename = "movieId")]
    pub movie_id: i64,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    /// Absolute image URL, or `None` when TMDB has no poster
    pub poster_path: Option<String>,
}

impl MovieSummary {
    /// Converts a TMDB result, resolving its poster path against `image_base_url`
    pub fn from_tmdb(movie: TmdbMovie, image_base_url: &str) -> Self {
        let poster_path = movie
            .poster_path
            .filter(|path| !path.is_empty())
            .map(|path| format!("{}{}", image_base_url, path));

        Self {
            movie_id: movie.id,
            title: movie.title,
            overview: movie.overview,
            release_date: movie.release_date,
            poster_path,
        }
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// One page of results from /search/movie or /movie/{id}/recommendations
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

/// Raw movie entry from TMDB
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

    #[test]
    fn test_tmdb_page_parses_search_response() {
        let body = r#"{
            "page": 1,
            "results": [
                {
                    "id": 27205,
                    "title": "Inception",
                    "overview": "Cobb, a skilled thief...",
                    "release_date": "2010-07-15",
                    "poster_path": "/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg",
                    "vote_average": 8.4
                }
            ],
            "total_results": 1
        }"#;

        let page: TmdbPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].id, 27205);
        assert_eq!(page.results[0].title.as_deref(), Some("Inception"));
    }

    #[test]
    fn test_tmdb_page_without_results() {
        let page: TmdbPage = serde_json::from_str(r#"{"page": 1}"#).unwrap();
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_summary_resolves_poster_url() {
        let movie = TmdbMovie {
            id: 155,
            title: Some("The Dark Knight".to_string()),
            overview: None,
            release_date: Some("2008-07-16".to_string()),
            poster_path: Some("/qJ2tW6WMUDux911r6m7haRef0WH.jpg".to_string()),
        };

        let summary = MovieSummary::from_tmdb(movie, IMAGE_BASE);
        assert_eq!(
            summary.poster_path.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/qJ2tW6WMUDux911r6m7haRef0WH.jpg")
        );
        assert_eq!(summary.movie_id, 155);
    }

    #[test]
    fn test_summary_without_poster() {
        let movie = TmdbMovie {
            id: 1,
            title: Some("Obscure".to_string()),
            overview: None,
            release_date: None,
            poster_path: None,
        };

        let summary = MovieSummary::from_tmdb(movie, IMAGE_BASE);
        assert_eq!(summary.poster_path, None);

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["poster_path"].is_null());
        assert_eq!(json["movieId"], 1);
    }
}
