use std::path::PathBuf;

use crate::select::Candidate;
use crate::Error;

/// Hyperparameter values tried by the grid search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamGrid {
    pub n_trees: Vec<u16>,
    /// `None` grows trees until their leaves are pure.
    pub max_depth: Vec<Option<u16>>,
    pub min_samples_split: Vec<usize>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            n_trees: vec![50, 100, 200],
            max_depth: vec![None, Some(10), Some(20)],
            min_samples_split: vec![2, 5],
        }
    }
}

impl ParamGrid {
    /// Every combination, with the tree count varying fastest. Ties in the
    /// search go to the earliest candidate in this order.
    pub fn candidates(&self) -> Vec<Candidate> {
        let mut candidates = Vec::with_capacity(self.len());
        for &max_depth in &self.max_depth {
            for &min_samples_split in &self.min_samples_split {
                for &n_trees in &self.n_trees {
                    candidates.push(Candidate {
                        n_trees,
                        max_depth,
                        min_samples_split,
                    });
                }
            }
        }
        candidates
    }

    pub fn len(&self) -> usize {
        self.n_trees.len() * self.max_depth.len() * self.min_samples_split.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub dataset: PathBuf,
    /// Fraction of the corpus held out for evaluation.
    pub test_size: f64,
    pub seed: u64,
    /// Neighbours considered when synthesizing minority samples.
    pub k_neighbors: usize,
    pub cv_folds: usize,
    pub grid: ParamGrid,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("data/spam.csv"),
            test_size: 0.2,
            seed: 42,
            k_neighbors: 5,
            cv_folds: 3,
            grid: ParamGrid::default(),
        }
    }
}

impl TrainingConfig {
    pub fn with_dataset(mut self, dataset: impl Into<PathBuf>) -> Self {
        self.dataset = dataset.into();
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_k_neighbors(mut self, k_neighbors: usize) -> Self {
        self.k_neighbors = k_neighbors;
        self
    }

    pub fn with_cv_folds(mut self, cv_folds: usize) -> Self {
        self.cv_folds = cv_folds;
        self
    }

    pub fn with_grid(mut self, grid: ParamGrid) -> Self {
        self.grid = grid;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(Error::Config(format!(
                "test_size must lie strictly between 0 and 1, got {}",
                self.test_size
            )));
        }
        if self.cv_folds < 2 {
            return Err(Error::Config(format!(
                "cv_folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        if self.k_neighbors == 0 {
            return Err(Error::Config("k_neighbors must be positive".into()));
        }
        if self.grid.is_empty() {
            return Err(Error::Config("parameter grid has an empty axis".into()));
        }
        if self.grid.n_trees.contains(&0) || self.grid.min_samples_split.iter().any(|&s| s < 2) {
            return Err(Error::Config(
                "trees must be positive and min_samples_split at least 2".into(),
            ));
        }
        Ok(())
    }
}
