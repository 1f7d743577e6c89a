//! Biased matrix factorisation (Funk SVD) for rating prediction
//!
//! Fits user/item biases and latent factors by stochastic gradient descent over the
//! observed ratings of a seeded training split. Predictions fall back to the biases
//! that are known when a user or item never appeared in training.

use std::collections::HashMap;

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use super::dataset::{MAX_RATING, MIN_RATING};
use super::error::{RecommenderError, RecommenderResult};
use crate::models::Rating;

/// SVD training parameters
#[derive(Debug, Clone)]
pub struct SvdConfig {
    /// Number of latent factors
    pub n_factors: usize,
    /// Passes of SGD over the training set
    pub n_epochs: usize,
    pub init_mean: f64,
    pub init_std: f64,
    pub learning_rate: f64,
    pub regularization: f64,
    /// Share of ratings held out of training
    pub test_fraction: f64,
    /// Seed for both the split permutation and the factor initialisation
    pub seed: u64,
}

impl Default for SvdConfig {
    fn default() -> Self {
        Self {
            n_factors: 100,
            n_epochs: 20,
            init_mean: 0.0,
            init_std: 0.1,
            learning_rate: 0.005,
            regularization: 0.02,
            test_fraction: 0.25,
            seed: 42,
        }
    }
}

/// Ratings partitioned into a training set and a held-out set
#[derive(Debug, Clone)]
pub struct RatingSplit {
    pub train: Vec<Rating>,
    pub held_out: Vec<Rating>,
}

/// Shuffles ratings with a seeded permutation and holds out `ceil(test_fraction * n)`
pub fn train_test_split(
    ratings: &[Rating],
    test_fraction: f64,
    seed: u64,
) -> RecommenderResult<RatingSplit> {
    let n = ratings.len();
    let n_test = (test_fraction * n as f64).ceil() as usize;
    if n < 2 || n_test >= n {
        return Err(RecommenderError::InsufficientRatings(n));
    }

    let mut permutation: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    permutation.shuffle(&mut rng);

    let held_out = permutation[..n_test].iter().map(|&i| ratings[i]).collect();
    let train = permutation[n_test..].iter().map(|&i| ratings[i]).collect();

    Ok(RatingSplit { train, held_out })
}

/// Fitted factorisation model
#[derive(Debug, Clone)]
pub struct SvdModel {
    global_mean: f64,
    user_index: HashMap<i64, usize>,
    item_index: HashMap<i64, usize>,
    user_bias: Array1<f64>,
    item_bias: Array1<f64>,
    user_factors: Array2<f64>,
    item_factors: Array2<f64>,
    held_out: Vec<Rating>,
}

impl SvdModel {
    /// Splits `ratings` and fits the model on the training part
    pub fn fit(ratings: &[Rating], config: &SvdConfig) -> RecommenderResult<Self> {
        let split = train_test_split(ratings, config.test_fraction, config.seed)?;
        let mut model = Self::fit_trainset(&split.train, config);
        model.held_out = split.held_out;
        Ok(model)
    }

    /// Fits directly on `train`, with no held-out ratings
    pub fn fit_trainset(train: &[Rating], config: &SvdConfig) -> Self {
        let mut user_index = HashMap::new();
        let mut item_index = HashMap::new();
        let samples: Vec<(usize, usize, f64)> = train
            .iter()
            .map(|r| {
                let next_user = user_index.len();
                let u = *user_index.entry(r.user_id).or_insert(next_user);
                let next_item = item_index.len();
                let i = *item_index.entry(r.movie_id).or_insert(next_item);
                (u, i, r.rating)
            })
            .collect();

        let global_mean = if samples.is_empty() {
            0.0
        } else {
            samples.iter().map(|&(_, _, r)| r).sum::<f64>() / samples.len() as f64
        };

        let k = config.n_factors;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut user_factors = Self::init_factors(user_index.len(), k, config, &mut rng);
        let mut item_factors = Self::init_factors(item_index.len(), k, config, &mut rng);
        let mut user_bias = Array1::<f64>::zeros(user_index.len());
        let mut item_bias = Array1::<f64>::zeros(item_index.len());

        let lr = config.learning_rate;
        let reg = config.regularization;

        for _ in 0..config.n_epochs {
            for &(u, i, rating) in &samples {
                let dot = user_factors.row(u).dot(&item_factors.row(i));
                let err = rating - (global_mean + user_bias[u] + item_bias[i] + dot);

                user_bias[u] += lr * (err - reg * user_bias[u]);
                item_bias[i] += lr * (err - reg * item_bias[i]);

                for f in 0..k {
                    let puf = user_factors[[u, f]];
                    let qif = item_factors[[i, f]];
                    user_factors[[u, f]] += lr * (err * qif - reg * puf);
                    item_factors[[i, f]] += lr * (err * puf - reg * qif);
                }
            }
        }

        Self {
            global_mean,
            user_index,
            item_index,
            user_bias,
            item_bias,
            user_factors,
            item_factors,
            held_out: Vec::new(),
        }
    }

    fn init_factors(rows: usize, k: usize, config: &SvdConfig, rng: &mut StdRng) -> Array2<f64> {
        match Normal::new(config.init_mean, config.init_std) {
            Ok(normal) => Array2::from_shape_simple_fn((rows, k), || normal.sample(&mut *rng)),
            // A non-finite or negative std leaves factors at the mean
            Err(_) => Array2::from_elem((rows, k), config.init_mean),
        }
    }

    /// Estimated rating for a (user, movie) pair, clipped to the rating scale
    pub fn predict(&self, user_id: i64, movie_id: i64) -> f64 {
        let user = self.user_index.get(&user_id).copied();
        let item = self.item_index.get(&movie_id).copied();

        let mut estimate = self.global_mean;
        if let Some(u) = user {
            estimate += self.user_bias[u];
        }
        if let Some(i) = item {
            estimate += self.item_bias[i];
        }
        if let (Some(u), Some(i)) = (user, item) {
            estimate += self.user_factors.row(u).dot(&self.item_factors.row(i));
        }

        estimate.clamp(MIN_RATING, MAX_RATING)
    }

    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    #[cfg(test)]
    fn knows_user(&self, user_id: i64) -> bool {
        self.user_index.contains_key(&user_id)
    }

    #[cfg(test)]
    fn knows_movie(&self, movie_id: i64) -> bool {
        self.item_index.contains_key(&movie_id)
    }

    /// Ratings kept out of training. Nothing evaluates against them yet.
    pub fn held_out(&self) -> &[Rating] {
        &self.held_out
    }
}
