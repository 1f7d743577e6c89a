//! Hybrid movie recommender
//!
//! Loads the movie catalog and the rating table once, fits a collaborative model
//! (matrix factorisation over a seeded training split) and a content model (TF-IDF over
//! each movie's genres, director and keywords), then answers read-only queries.
//!
//! Queries never fail. Unknown ids, unparsable user ids and empty matches all produce
//! an empty result.

pub mod dataset;
pub mod error;
pub mod stop_words;
pub mod svd;
pub mod tfidf;

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use crate::models::{Movie, Rating};

pub use error::{RecommenderError, RecommenderResult};
pub use svd::{SvdConfig, SvdModel};
pub use tfidf::{SparseVector, TfidfVectorizer};

/// Default number of results for every query
pub const DEFAULT_LIMIT: usize = 10;

/// A catalog movie paired with the score that ranked it
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredMovie<'a> {
    pub movie: &'a Movie,
    pub score: f64,
}

/// Pre-built collaborative and content models over an immutable catalog
#[derive(Debug)]
pub struct Recommender {
    movies: Vec<Movie>,
    rated_by_user: HashMap<i64, HashSet<i64>>,
    collaborative: SvdModel,
    content_vectors: Vec<SparseVector>,
    /// movieId -> first catalog position with that id
    movie_positions: HashMap<i64, usize>,
}

impl Recommender {
    /// Builds both models with the default parameters
    pub fn new(movies: Vec<Movie>, ratings: Vec<Rating>) -> RecommenderResult<Self> {
        Self::with_config(movies, ratings, &SvdConfig::default())
    }

    /// Builds both models; either all of construction succeeds or no instance exists
    pub fn with_config(
        movies: Vec<Movie>,
        ratings: Vec<Rating>,
        config: &SvdConfig,
    ) -> RecommenderResult<Self> {
        dataset::validate_ratings(&ratings)?;

        let collaborative = SvdModel::fit(&ratings, config)?;

        let documents: Vec<&str> = movies.iter().map(|m| m.metadata.as_str()).collect();
        let (_, content_vectors) = TfidfVectorizer::fit_transform(&documents)?;

        let mut movie_positions = HashMap::with_capacity(movies.len());
        for (position, movie) in movies.iter().enumerate() {
            movie_positions.entry(movie.movie_id).or_insert(position);
        }

        let mut rated_by_user: HashMap<i64, HashSet<i64>> = HashMap::new();
        for rating in &ratings {
            rated_by_user
                .entry(rating.user_id)
                .or_default()
                .insert(rating.movie_id);
        }

        Ok(Self {
            movies,
            rated_by_user,
            collaborative,
            content_vectors,
            movie_positions,
        })
    }

    /// Loads both tables from CSV files and builds the models
    pub fn from_csv_paths<P: AsRef<Path>, Q: AsRef<Path>>(
        movies_path: P,
        ratings_path: Q,
    ) -> RecommenderResult<Self> {
        let movies = dataset::load_movies_from_path(movies_path)?;
        let ratings = dataset::load_ratings_from_path(ratings_path)?;
        Self::new(movies, ratings)
    }

    /// Loads both tables from CSV readers and builds the models
    pub fn from_csv_readers<M: Read, R: Read>(movies: M, ratings: R) -> RecommenderResult<Self> {
        let movies = dataset::load_movies(movies)?;
        let ratings = dataset::load_ratings(ratings)?;
        Self::new(movies, ratings)
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn collaborative_model(&self) -> &SvdModel {
        &self.collaborative
    }

    /// First catalog row carrying `movie_id`
    pub fn movie(&self, movie_id: i64) -> Option<&Movie> {
        self.movie_positions
            .get(&movie_id)
            .map(|&position| &self.movies[position])
    }

    /// Highest predicted ratings among the movies `user_id` has not rated
    ///
    /// Scores are non-increasing; equal scores keep catalog order. A `user_id` that does
    /// not parse as an integer yields nothing. A user the model never saw still gets
    /// bias-only estimates.
    pub fn get_collaborative_recommendations(&self, user_id: &str, n: usize) -> Vec<ScoredMovie<'_>> {
        let Ok(user_id) = user_id.trim().parse::<i64>() else {
            return Vec::new();
        };

        let rated = self.rated_by_user.get(&user_id);
        let mut predictions: Vec<ScoredMovie<'_>> = self
            .movies
            .iter()
            .filter(|movie| rated.map_or(true, |seen| !seen.contains(&movie.movie_id)))
            .map(|movie| ScoredMovie {
                movie,
                score: self.collaborative.predict(user_id, movie.movie_id),
            })
            .collect();

        rank(&mut predictions, n);
        predictions
    }

    /// Movies whose metadata is most similar to `movie_id`'s, excluding that movie
    pub fn get_content_based_recommendations(&self, movie_id: i64, n: usize) -> Vec<ScoredMovie<'_>> {
        let Some(&position) = self.movie_positions.get(&movie_id) else {
            return Vec::new();
        };

        let similarities =
            tfidf::linear_kernel(&self.content_vectors[position], &self.content_vectors);

        let mut neighbours: Vec<ScoredMovie<'_>> = self
            .movies
            .iter()
            .zip(similarities)
            .filter(|(movie, _)| movie.movie_id != movie_id)
            .map(|(movie, score)| ScoredMovie { movie, score })
            .collect();

        rank(&mut neighbours, n);
        neighbours
    }

    /// Titles of [`get_collaborative_recommendations`](Self::get_collaborative_recommendations), in order
    pub fn get_recommendations(&self, user_id: &str, n: usize) -> Vec<String> {
        self.get_collaborative_recommendations(user_id, n)
            .into_iter()
            .filter_map(|scored| scored.movie.title.clone())
            .collect()
    }

    /// Titles containing `query` case-insensitively, in catalog order
    pub fn search_movies(&self, query: &str, n: usize) -> Vec<String> {
        let needle = query.to_lowercase();

        self.movies
            .iter()
            .filter_map(|movie| movie.title.as_deref())
            .filter(|title| title.to_lowercase().contains(&needle))
            .take(n)
            .map(str::to_string)
            .collect()
    }
}

/// Stable descending sort by score, truncated to `n`
fn rank(scored: &mut Vec<ScoredMovie<'_>>, n: usize) {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(n);
}
