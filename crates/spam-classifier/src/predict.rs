use std::slice;

use spam_data_clean::{FittedVectorizer, Label, Normalizer};
use thiserror::Error;
use tracing::debug;

use crate::select::{SelectError, TrainedModel};

/// Failures of a single prediction. They never affect other requests.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("No message provided")]
    EmptyMessage,
    #[error("model returned no prediction")]
    NoPrediction,
    #[error(transparent)]
    Model(#[from] SelectError),
}

impl PredictError {
    /// Whether the caller, rather than the service, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PredictError::EmptyMessage)
    }
}

/// Normalizer, fitted vectorizer and model, composed into one
/// message-to-label function. Immutable once built.
pub struct Predictor {
    normalizer: Normalizer,
    vectorizer: FittedVectorizer,
    model: TrainedModel,
}

impl Predictor {
    pub fn new(normalizer: Normalizer, vectorizer: FittedVectorizer, model: TrainedModel) -> Self {
        Self {
            normalizer,
            vectorizer,
            model,
        }
    }

    pub fn predict(&self, message: &str) -> Result<Label, PredictError> {
        if message.is_empty() {
            return Err(PredictError::EmptyMessage);
        }
        let processed = self.normalizer.normalize(message);
        debug!(processed = %processed, "normalized message");
        let vector = self.vectorizer.transform_one(&processed);
        self.model
            .predict(slice::from_ref(&vector))?
            .into_iter()
            .next()
            .ok_or(PredictError::NoPrediction)
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    pub fn vectorizer(&self) -> &FittedVectorizer {
        &self.vectorizer
    }
}
