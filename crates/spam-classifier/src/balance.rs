//! Class balancing for the training split.
//!
//! [`Smote`] oversamples the minority class by interpolating between a
//! sample and one of its nearest same-class neighbours until both classes
//! have the same count. [`ClassWeights`] adds inverse-frequency weights on
//! top for the model selector.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use spam_data_clean::{FeatureVector, Label};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BalanceError {
    #[error("{features} feature vectors but {labels} labels")]
    LengthMismatch { features: usize, labels: usize },
    #[error("no training samples to balance")]
    Empty,
    #[error("only `{0}` samples present; both classes are required")]
    SingleClass(Label),
    #[error(
        "expected at least {required} `{label}` samples to interpolate between neighbours, found {found}"
    )]
    TooFewMinority {
        label: Label,
        found: usize,
        required: usize,
    },
}

/// Training data after oversampling. Original rows come first, synthetic
/// rows are appended.
#[derive(Debug, Clone)]
pub struct Balanced {
    pub vectors: Vec<FeatureVector>,
    pub labels: Vec<Label>,
    pub synthesized: usize,
}

impl Balanced {
    pub fn count(&self, label: Label) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Smote {
    k_neighbors: usize,
    seed: u64,
}

impl Default for Smote {
    fn default() -> Self {
        Self::new(5, 42)
    }
}

impl Smote {
    pub fn new(k_neighbors: usize, seed: u64) -> Self {
        Self { k_neighbors, seed }
    }

    pub fn balance(
        &self,
        vectors: &[FeatureVector],
        labels: &[Label],
    ) -> Result<Balanced, BalanceError> {
        if vectors.len() != labels.len() {
            return Err(BalanceError::LengthMismatch {
                features: vectors.len(),
                labels: labels.len(),
            });
        }
        if labels.is_empty() {
            return Err(BalanceError::Empty);
        }

        let (ham, spam): (Vec<usize>, Vec<usize>) =
            (0..labels.len()).partition(|&i| labels[i] == Label::Ham);
        if spam.is_empty() {
            return Err(BalanceError::SingleClass(Label::Ham));
        }
        if ham.is_empty() {
            return Err(BalanceError::SingleClass(Label::Spam));
        }

        let (minority_label, minority, majority_len) = if ham.len() < spam.len() {
            (Label::Ham, ham, spam.len())
        } else {
            (Label::Spam, spam, ham.len())
        };
        let needed = majority_len - minority.len();

        let mut balanced = Balanced {
            vectors: vectors.to_vec(),
            labels: labels.to_vec(),
            synthesized: needed,
        };
        if needed == 0 {
            info!("Classes already balanced, nothing to synthesize");
            return Ok(balanced);
        }

        let required = self.k_neighbors + 1;
        if minority.len() < required {
            return Err(BalanceError::TooFewMinority {
                label: minority_label,
                found: minority.len(),
                required,
            });
        }

        let samples: Vec<&FeatureVector> = minority.iter().map(|&i| &vectors[i]).collect();
        let neighbours = nearest_neighbours(&samples, self.k_neighbors);

        let mut rng = StdRng::seed_from_u64(self.seed);
        for _ in 0..needed {
            let pick = rng.gen_range(0..samples.len() * self.k_neighbors);
            let (row, column) = (pick / self.k_neighbors, pick % self.k_neighbors);
            let step: f64 = rng.gen();
            let neighbour = samples[neighbours[row][column]];
            balanced
                .vectors
                .push(samples[row].interpolate(neighbour, step));
            balanced.labels.push(minority_label);
        }

        info!(
            synthesized = needed,
            minority = %minority_label,
            total = balanced.labels.len(),
            "SMOTE balancing applied successfully"
        );
        Ok(balanced)
    }
}

/// Indices of the `k` closest other samples for every sample, nearest
/// first. Equal distances keep index order.
fn nearest_neighbours(samples: &[&FeatureVector], k: usize) -> Vec<Vec<usize>> {
    samples
        .par_iter()
        .enumerate()
        .map(|(i, sample)| {
            let mut distances: Vec<(f64, usize)> = samples
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(j, other)| (sample.squared_distance(other), j))
                .collect();
            distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            distances.into_iter().take(k).map(|(_, j)| j).collect()
        })
        .collect()
}

/// Inverse-frequency class weights, `n / (2 * count)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassWeights {
    pub ham: f64,
    pub spam: f64,
}

impl ClassWeights {
    pub fn uniform() -> Self {
        Self {
            ham: 1.0,
            spam: 1.0,
        }
    }

    pub fn balanced(labels: &[Label]) -> Result<Self, BalanceError> {
        let n = labels.len() as f64;
        let weight = |label: Label| {
            let count = labels.iter().filter(|&&l| l == label).count();
            if count == 0 {
                let present = if label == Label::Ham {
                    Label::Spam
                } else {
                    Label::Ham
                };
                return Err(BalanceError::SingleClass(present));
            }
            Ok(n / (2.0 * count as f64))
        };
        if labels.is_empty() {
            return Err(BalanceError::Empty);
        }
        Ok(Self {
            ham: weight(Label::Ham)?,
            spam: weight(Label::Spam)?,
        })
    }

    pub fn weight(&self, label: Label) -> f64 {
        match label {
            Label::Ham => self.ham,
            Label::Spam => self.spam,
        }
    }

    /// How many times each row of `label` is repeated so the forest sees the
    /// weights: `round(weight / lightest weight)`, never below one.
    pub fn replication(&self, label: Label) -> usize {
        let lightest = self.ham.min(self.spam);
        ((self.weight(label) / lightest).round() as usize).max(1)
    }
}
