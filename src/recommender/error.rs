use std::path::PathBuf;

/// Errors raised while building a [`Recommender`](super::Recommender)
///
/// Query operations never fail; every variant here is a construction failure and no
/// instance is produced when one is returned.
#[derive(thiserror::Error, Debug)]
pub enum RecommenderError {
    #[error("Failed to open {table} table at {path}: {source}")]
    Open {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed {table} table: {source}")]
    Malformed {
        table: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("The {table} table is missing required column '{column}'")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("Rating {rating} for user {user_id} / movie {movie_id} is outside [1, 5]")]
    RatingOutOfRange {
        user_id: i64,
        movie_id: i64,
        rating: f64,
    },

    #[error("Need at least 2 ratings to build a training split, got {0}")]
    InsufficientRatings(usize),

    #[error("Movie metadata produced an empty vocabulary")]
    EmptyVocabulary,
}

pub type RecommenderResult<T> = Result<T, RecommenderError>;
