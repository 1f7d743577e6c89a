//! TF-IDF vectorisation of movie metadata
//!
//! Documents are lowercased and split into runs of two or more word characters,
//! English stop words are dropped, and each row is weighted by raw term count times
//! smoothed inverse document frequency before L2 normalisation. Because rows are unit
//! length, the linear kernel between two rows is their cosine similarity.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::OnceLock;

use regex::Regex;

use super::error::{RecommenderError, RecommenderResult};
use super::stop_words;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"))
}

/// Sparse row vector as `(term index, weight)` pairs sorted by index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Dot product by merging the two sorted index lists
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;

        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }

        sum
    }
}

/// Linear kernel of one row against every row of a matrix
pub fn linear_kernel(query: &SparseVector, rows: &[SparseVector]) -> Vec<f64> {
    rows.iter().map(|row| query.dot(row)).collect()
}

/// Vocabulary and idf weights fitted over a fixed corpus
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fits the vocabulary over `documents` and returns one vector per document
    pub fn fit_transform<S: AsRef<str>>(
        documents: &[S],
    ) -> RecommenderResult<(Self, Vec<SparseVector>)> {
        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| tokenize(doc.as_ref()))
            .collect();

        let terms: BTreeSet<&str> = tokenized
            .iter()
            .flat_map(|tokens| tokens.iter().map(String::as_str))
            .collect();

        if terms.is_empty() {
            return Err(RecommenderError::EmptyVocabulary);
        }

        let vocabulary: HashMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term.to_string(), idx))
            .collect();

        let mut document_frequency = vec![0usize; vocabulary.len()];
        for tokens in &tokenized {
            let unique: BTreeSet<usize> = tokens.iter().map(|t| vocabulary[t.as_str()]).collect();
            for idx in unique {
                document_frequency[idx] += 1;
            }
        }

        let n_documents = documents.len() as f64;
        let idf = document_frequency
            .iter()
            .map(|&df| ((1.0 + n_documents) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let vectorizer = Self { vocabulary, idf };
        let rows = tokenized
            .iter()
            .map(|tokens| vectorizer.weigh(tokens))
            .collect();

        Ok((vectorizer, rows))
    }

    /// Projects an unseen document into the fitted space; unknown terms are dropped
    #[cfg(test)]
    fn transform(&self, document: &str) -> SparseVector {
        self.weigh(&tokenize(document))
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    fn weigh(&self, tokens: &[String]) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokens {
            if let Some(&idx) = self.vocabulary.get(token.as_str()) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, count)| (idx, count * self.idf[idx]))
            .collect();

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut entries {
                *w /= norm;
            }
        }

        SparseVector { entries }
    }
}

fn tokenize(document: &str) -> Vec<String> {
    let lowered = document.to_lowercase();
    let stop = stop_words::english();

    token_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !stop.contains(token))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_tokenize_drops_stop_words_and_single_chars() {
        let tokens = tokenize("The Dark Knight a Batman film by Nolan");
        assert_eq!(tokens, vec!["dark", "knight", "batman", "film", "nolan"]);
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let docs = ["zombie apocalypse", "alien invasion"];
        let (vectorizer, _) = TfidfVectorizer::fit_transform(&docs).unwrap();

        assert_eq!(vectorizer.vocabulary_len(), 4);
        assert_eq!(vectorizer.term_index("alien"), Some(0));
        assert_eq!(vectorizer.term_index("apocalypse"), Some(1));
        assert_eq!(vectorizer.term_index("invasion"), Some(2));
        assert_eq!(vectorizer.term_index("zombie"), Some(3));
    }

    #[test]
    fn test_rows_are_unit_length() {
        let docs = ["crime thriller heist", "crime drama", "space opera space"];
        let (_, rows) = TfidfVectorizer::fit_transform(&docs).unwrap();

        for row in &rows {
            assert!(close(row.norm(), 1.0));
        }
    }

    #[test]
    fn test_smoothed_idf_weights() {
        // "crime" appears in both documents, "heist" in one
        let docs = ["crime heist", "crime"];
        let (vectorizer, rows) = TfidfVectorizer::fit_transform(&docs).unwrap();

        let idf_crime = 1.0;
        let idf_heist = (3.0f64 / 2.0).ln() + 1.0;
        let norm = (idf_crime * idf_crime + idf_heist * idf_heist).sqrt();

        let crime = vectorizer.term_index("crime").unwrap();
        let heist = vectorizer.term_index("heist").unwrap();
        let first = rows[0].entries();
        let weight = |idx: usize| first.iter().find(|(i, _)| *i == idx).unwrap().1;
        assert_eq!(first.len(), 2);
        assert!(close(weight(crime), idf_crime / norm));
        assert!(close(weight(heist), idf_heist / norm));
        assert!(close(rows[1].entries()[0].1, 1.0));
    }

    #[test]
    fn test_linear_kernel_is_cosine() {
        let docs = ["crime thriller", "crime thriller", "romantic comedy"];
        let (_, rows) = TfidfVectorizer::fit_transform(&docs).unwrap();

        let sims = linear_kernel(&rows[0], &rows);
        assert!(close(sims[0], 1.0));
        assert!(close(sims[1], 1.0));
        assert!(close(sims[2], 0.0));
    }

    #[test]
    fn test_empty_document_is_zero_vector() {
        let docs = ["crime thriller", "   "];
        let (_, rows) = TfidfVectorizer::fit_transform(&docs).unwrap();
        assert!(rows[1].is_empty());
        assert_eq!(rows[0].dot(&rows[1]), 0.0);
    }

    #[test]
    fn test_empty_vocabulary_is_an_error() {
        let docs = ["the and of", ""];
        let err = TfidfVectorizer::fit_transform(&docs).unwrap_err();
        assert!(matches!(err, RecommenderError::EmptyVocabulary));
    }

    #[test]
    fn test_transform_ignores_unknown_terms() {
        let docs = ["crime thriller", "space opera"];
        let (vectorizer, rows) = TfidfVectorizer::fit_transform(&docs).unwrap();

        let projected = vectorizer.transform("Crime THRILLER western");
        assert_eq!(projected, rows[0]);
    }
}
