use serde::{Deserialize, Serialize};

/// A row of the local movie catalog
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Movie {
    #[serde(rename = "movieId")]
    pub movie_id: i64,
    pub title: Option<String>,
    pub genres: Option<String>,
    pub director: Option<String>,
    pub keywords: Option<String>,
    /// `genres director keywords`, absent fields read as empty
    #[serde(skip)]
    pub metadata: String,
}

impl Movie {
    /// Creates a catalog row and derives its metadata text
    pub fn new(
        movie_id: i64,
        title: Option<String>,
        genres: Option<String>,
        director: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let mut movie = Self {
            movie_id,
            title,
            genres,
            director,
            keywords,
            metadata: String::new(),
        };
        movie.metadata = movie.build_metadata();
        movie
    }

    fn build_metadata(&self) -> String {
        format!(
            "{} {} {}",
            self.genres.as_deref().unwrap_or(""),
            self.director.as_deref().unwrap_or(""),
            self.keywords.as_deref().unwrap_or("")
        )
    }
}

/// One user's rating of one movie
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "movieId")]
    pub movie_id: i64,
    pub rating: f64,
}

impl Rating {
    pub fn new(user_id: i64, movie_id: i64, rating: f64) -> Self {
        Self {
            user_id,
            movie_id,
            rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_joins_text_fields() {
        let movie = Movie::new(
            1,
            Some("Heat".to_string()),
            Some("Crime Thriller".to_string()),
            Some("Michael Mann".to_string()),
            Some("heist los angeles".to_string()),
        );
        assert_eq!(movie.metadata, "Crime Thriller Michael Mann heist los angeles");
    }

    #[test]
    fn test_metadata_substitutes_missing_fields() {
        let movie = Movie::new(2, None, None, Some("Nolan".to_string()), None);
        assert_eq!(movie.metadata, " Nolan ");
    }

    #[test]
    fn test_rating_serialization_uses_source_column_names() {
        let json = serde_json::to_value(Rating::new(7, 42, 4.5)).unwrap();
        assert_eq!(json["userId"], 7);
        assert_eq!(json["movieId"], 42);
        assert_eq!(json["rating"], 4.5);
    }
}
