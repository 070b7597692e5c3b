//! Grid search over random-forest hyperparameters.
//!
//! Every candidate is scored by stratified k-fold cross-validation. The
//! candidates run as independent rayon tasks; their mean accuracies are
//! collected in grid order and the best one is refit on all training rows.

use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::metrics::accuracy::Accuracy;
use smartcore::metrics::Metrics;
use spam_data_clean::{to_dense_matrix, FeatureVector, Label};
use thiserror::Error;
use tracing::{debug, info};

use crate::balance::ClassWeights;
use crate::config::ParamGrid;

type Forest = RandomForestClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>;

#[derive(Error, Debug)]
pub enum SelectError {
    #[error("fitting {candidate} failed: {reason}")]
    Fit { candidate: Candidate, reason: String },
    #[error("prediction failed: {0}")]
    Predict(String),
    #[error("model produced unknown class code {0}")]
    UnknownClass(u32),
    #[error("{features} feature vectors but {labels} labels")]
    LengthMismatch { features: usize, labels: usize },
    #[error("{samples} samples cannot be split into {folds} folds")]
    TooFewSamples { samples: usize, folds: usize },
    #[error("parameter grid is empty")]
    EmptyGrid,
    #[error(transparent)]
    Data(#[from] spam_data_clean::Error),
}

/// One point of the parameter grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub n_trees: u16,
    pub max_depth: Option<u16>,
    pub min_samples_split: usize,
}

impl Candidate {
    fn parameters(&self, seed: u64) -> RandomForestClassifierParameters {
        RandomForestClassifierParameters {
            n_trees: self.n_trees,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            seed,
            ..Default::default()
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let depth = match self.max_depth {
            Some(depth) => depth.to_string(),
            None => "None".to_string(),
        };
        write!(
            f,
            "{{n_estimators: {}, max_depth: {}, min_samples_split: {}}}",
            self.n_trees, depth, self.min_samples_split
        )
    }
}

/// The forest chosen by [`select`]. Never modified after fitting.
pub struct TrainedModel {
    forest: Forest,
    params: Candidate,
    cv_score: f64,
}

impl fmt::Debug for TrainedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainedModel")
            .field("params", &self.params)
            .field("cv_score", &self.cv_score)
            .finish_non_exhaustive()
    }
}

impl TrainedModel {
    /// Fits a forest on every row, repeating rows according to `weights`.
    pub fn fit(
        vectors: &[FeatureVector],
        labels: &[Label],
        candidate: Candidate,
        weights: &ClassWeights,
        seed: u64,
    ) -> Result<Self, SelectError> {
        check_lengths(vectors, labels)?;
        let forest = fit_forest(vectors, labels, 0..vectors.len(), candidate, weights, seed)?;
        Ok(Self {
            forest,
            params: candidate,
            cv_score: f64::NAN,
        })
    }

    pub fn params(&self) -> Candidate {
        self.params
    }

    /// Mean cross-validated accuracy that won the search, or NaN when the
    /// model was fit directly.
    pub fn cv_score(&self) -> f64 {
        self.cv_score
    }

    pub fn predict(&self, vectors: &[FeatureVector]) -> Result<Vec<Label>, SelectError> {
        let codes = self.predict_codes(vectors)?;
        codes
            .into_iter()
            .map(|code| Label::from_code(code).ok_or(SelectError::UnknownClass(code)))
            .collect()
    }

    fn predict_codes(&self, vectors: &[FeatureVector]) -> Result<Vec<u32>, SelectError> {
        let x = to_dense_matrix(vectors)?;
        self.forest
            .predict(&x)
            .map_err(|err| SelectError::Predict(err.to_string()))
    }
}

/// Scores every grid candidate and returns the best one refit on all rows.
/// Ties go to the candidate enumerated first.
pub fn select(
    vectors: &[FeatureVector],
    labels: &[Label],
    weights: &ClassWeights,
    grid: &ParamGrid,
    folds: usize,
    seed: u64,
) -> Result<TrainedModel, SelectError> {
    check_lengths(vectors, labels)?;
    let candidates = grid.candidates();
    if candidates.is_empty() {
        return Err(SelectError::EmptyGrid);
    }
    if folds < 2 || vectors.len() < folds {
        return Err(SelectError::TooFewSamples {
            samples: vectors.len(),
            folds,
        });
    }

    let splits = stratified_folds(labels, folds);
    let scores = candidates
        .par_iter()
        .map(|&candidate| {
            let score = cross_validate(vectors, labels, &splits, candidate, weights, seed)?;
            debug!(%candidate, score, "cross-validated candidate");
            Ok(score)
        })
        .collect::<Result<Vec<f64>, SelectError>>()?;

    let (best, best_score) = scores
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, score)| {
            if score > best.1 {
                (i, score)
            } else {
                best
            }
        });
    let candidate = candidates[best];
    info!(
        params = %candidate,
        score = best_score,
        candidates = candidates.len(),
        "Grid search finished"
    );

    let mut model = TrainedModel::fit(vectors, labels, candidate, weights, seed)?;
    model.cv_score = best_score;
    info!("Model training completed successfully");
    Ok(model)
}

fn cross_validate(
    vectors: &[FeatureVector],
    labels: &[Label],
    splits: &[(Vec<usize>, Vec<usize>)],
    candidate: Candidate,
    weights: &ClassWeights,
    seed: u64,
) -> Result<f64, SelectError> {
    let mut total = 0.0;
    for (train, test) in splits {
        let forest = fit_forest(vectors, labels, train.iter().copied(), candidate, weights, seed)?;
        let x_test: Vec<FeatureVector> = test.iter().map(|&i| vectors[i].clone()).collect();
        let y_test: Vec<u32> = test.iter().map(|&i| labels[i].code()).collect();
        let y_pred = forest
            .predict(&to_dense_matrix(&x_test)?)
            .map_err(|err| SelectError::Predict(err.to_string()))?;
        total += Accuracy::<u32>::new().get_score(&y_test, &y_pred);
    }
    Ok(total / splits.len() as f64)
}

fn fit_forest(
    vectors: &[FeatureVector],
    labels: &[Label],
    rows: impl Iterator<Item = usize>,
    candidate: Candidate,
    weights: &ClassWeights,
    seed: u64,
) -> Result<Forest, SelectError> {
    let mut x_rows = Vec::new();
    let mut y = Vec::new();
    for i in rows {
        for _ in 0..weights.replication(labels[i]) {
            x_rows.push(vectors[i].clone());
            y.push(labels[i].code());
        }
    }
    let x = to_dense_matrix(&x_rows)?;
    RandomForestClassifier::fit(&x, &y, candidate.parameters(seed)).map_err(|err| {
        SelectError::Fit {
            candidate,
            reason: err.to_string(),
        }
    })
}

/// Splits row indices into `n_folds` (train, test) pairs. Each class is cut
/// into contiguous chunks, the first chunks one row larger when the class
/// does not divide evenly.
fn stratified_folds(labels: &[Label], n_folds: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
    let mut folds: Vec<Vec<usize>> = vec![Vec::new(); n_folds];
    for class in Label::ALL {
        let members: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == class).collect();
        let (size, remainder) = (members.len() / n_folds, members.len() % n_folds);
        let mut start = 0;
        for (f, fold) in folds.iter_mut().enumerate() {
            let end = start + size + usize::from(f < remainder);
            fold.extend_from_slice(&members[start..end]);
            start = end;
        }
    }

    (0..n_folds)
        .map(|f| {
            let mut test = folds[f].clone();
            test.sort_unstable();
            let mut train: Vec<usize> = folds
                .iter()
                .enumerate()
                .filter(|&(g, _)| g != f)
                .flat_map(|(_, fold)| fold.iter().copied())
                .collect();
            train.sort_unstable();
            (train, test)
        })
        .collect()
}

fn check_lengths(vectors: &[FeatureVector], labels: &[Label]) -> Result<(), SelectError> {
    if vectors.len() != labels.len() {
        return Err(SelectError::LengthMismatch {
            features: vectors.len(),
            labels: labels.len(),
        });
    }
    Ok(())
}
