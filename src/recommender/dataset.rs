//! CSV loading for the movie and rating tables
//!
//! Both tables are read fully into memory. Required columns are checked against the
//! header row before any record is parsed, so a table that is missing a column fails
//! with [`RecommenderError::MissingColumn`] rather than silently reading `None`.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::error::{RecommenderError, RecommenderResult};
use crate::models::{Movie, Rating};

pub const MOVIE_COLUMNS: [&str; 5] = ["movieId", "title", "genres", "director", "keywords"];
pub const RATING_COLUMNS: [&str; 3] = ["userId", "movieId", "rating"];

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Deserialize)]
struct MovieRow {
    #[serde(rename = "movieId")]
    movie_id: i64,
    title: Option<String>,
    genres: Option<String>,
    director: Option<String>,
    keywords: Option<String>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie::new(row.movie_id, row.title, row.genres, row.director, row.keywords)
    }
}

/// Loads the movie table from a CSV file
pub fn load_movies_from_path<P: AsRef<Path>>(path: P) -> RecommenderResult<Vec<Movie>> {
    let reader = open(path.as_ref(), "movies")?;
    read_movies(reader)
}

/// Loads the rating table from a CSV file
pub fn load_ratings_from_path<P: AsRef<Path>>(path: P) -> RecommenderResult<Vec<Rating>> {
    let reader = open(path.as_ref(), "ratings")?;
    read_ratings(reader)
}

/// Loads the movie table from any CSV source with a header row
pub fn load_movies<R: Read>(source: R) -> RecommenderResult<Vec<Movie>> {
    read_movies(csv::Reader::from_reader(source))
}

/// Loads the rating table from any CSV source with a header row
pub fn load_ratings<R: Read>(source: R) -> RecommenderResult<Vec<Rating>> {
    read_ratings(csv::Reader::from_reader(source))
}

fn open(path: &Path, table: &'static str) -> RecommenderResult<csv::Reader<std::fs::File>> {
    csv::Reader::from_path(path).map_err(|source| RecommenderError::Open {
        table,
        path: path.to_path_buf(),
        source,
    })
}

fn read_movies<R: Read>(mut reader: csv::Reader<R>) -> RecommenderResult<Vec<Movie>> {
    require_columns(&mut reader, "movies", &MOVIE_COLUMNS)?;

    reader
        .deserialize::<MovieRow>()
        .map(|row| {
            row.map(Movie::from)
                .map_err(|source| RecommenderError::Malformed {
                    table: "movies",
                    source,
                })
        })
        .collect()
}

fn read_ratings<R: Read>(mut reader: csv::Reader<R>) -> RecommenderResult<Vec<Rating>> {
    require_columns(&mut reader, "ratings", &RATING_COLUMNS)?;

    let mut ratings = Vec::new();
    for row in reader.deserialize::<Rating>() {
        let rating = row.map_err(|source| RecommenderError::Malformed {
            table: "ratings",
            source,
        })?;
        ratings.push(rating);
    }

    validate_ratings(&ratings)?;
    Ok(ratings)
}

fn require_columns<R: Read>(
    reader: &mut csv::Reader<R>,
    table: &'static str,
    columns: &[&'static str],
) -> RecommenderResult<()> {
    let headers = reader
        .headers()
        .map_err(|source| RecommenderError::Malformed { table, source })?;

    for &column in columns {
        if !headers.iter().any(|h| h.trim() == column) {
            return Err(RecommenderError::MissingColumn { table, column });
        }
    }

    Ok(())
}

/// Rejects ratings outside the closed [1, 5] scale
pub fn validate_ratings(ratings: &[Rating]) -> RecommenderResult<()> {
    match ratings
        .iter()
        .find(|r| !(MIN_RATING..=MAX_RATING).contains(&r.rating))
    {
        Some(r) => Err(RecommenderError::RatingOutOfRange {
            user_id: r.user_id,
            movie_id: r.movie_id,
            rating: r.rating,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_movies_fills_missing_text_fields() {
        let csv = "movieId,title,genres,director,keywords\n\
                   1,Alien,Horror Sci-Fi,Ridley Scott,space crew\n\
                   2,Untitled,,,\n";

        let movies = load_movies(csv.as_bytes()).unwrap();

        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].title.as_deref(), Some("Alien"));
        assert_eq!(movies[0].metadata, "Horror Sci-Fi Ridley Scott space crew");
        assert_eq!(movies[1].genres, None);
        assert_eq!(movies[1].metadata, "  ");
    }

    #[test]
    fn test_load_movies_ignores_extra_columns() {
        let csv = "movieId,title,year,genres,director,keywords\n\
                   3,Heat,1995,Crime,Michael Mann,heist\n";

        let movies = load_movies(csv.as_bytes()).unwrap();
        assert_eq!(movies[0].movie_id, 3);
        assert_eq!(movies[0].keywords.as_deref(), Some("heist"));
    }

    #[test]
    fn test_load_movies_missing_column() {
        let csv = "movieId,title,genres,keywords\n1,Alien,Horror,space\n";

        let err = load_movies(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            RecommenderError::MissingColumn {
                table: "movies",
                column: "director"
            }
        ));
    }

    #[test]
    fn test_load_movies_rejects_non_integer_id() {
        let csv = "movieId,title,genres,director,keywords\nabc,Alien,Horror,Scott,space\n";

        let err = load_movies(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, RecommenderError::Malformed { table: "movies", .. }));
    }

    #[test]
    fn test_load_ratings() {
        let csv = "userId,movieId,rating,timestamp\n1,10,4.0,964982703\n2,10,3.5,964982224\n";

        let ratings = load_ratings(csv.as_bytes()).unwrap();
        assert_eq!(ratings, vec![Rating::new(1, 10, 4.0), Rating::new(2, 10, 3.5)]);
    }

    #[test]
    fn test_load_ratings_missing_column() {
        let csv = "userId,movieId\n1,10\n";

        let err = load_ratings(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            RecommenderError::MissingColumn {
                table: "ratings",
                column: "rating"
            }
        ));
    }

    #[test]
    fn test_load_ratings_out_of_range() {
        let csv = "userId,movieId,rating\n1,10,4.0\n1,11,5.5\n";

        let err = load_ratings(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            RecommenderError::RatingOutOfRange {
                user_id: 1,
                movie_id: 11,
                ..
            }
        ));
    }

    #[test]
    fn test_load_from_missing_path() {
        let err = load_movies_from_path("/nonexistent/movies.csv").unwrap_err();
        assert!(matches!(err, RecommenderError::Open { table: "movies", .. }));
    }
}
