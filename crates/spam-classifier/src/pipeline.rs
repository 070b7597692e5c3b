use std::fmt::Display;

use spam_data_clean::{Normalizer, RawDataset, TfidfVectorizer};
use tracing::{error, info};

use crate::balance::{ClassWeights, Smote};
use crate::config::TrainingConfig;
use crate::evaluate::{evaluate, Metrics};
use crate::predict::Predictor;
use crate::select::select;
use crate::Error;

/// Output of a successful training run.
pub struct Trained {
    pub predictor: Predictor,
    pub metrics: Metrics,
}

/// Logs a failed setup stage before it propagates.
fn logged<E: Display>(stage: &'static str) -> impl FnOnce(E) -> E {
    move |err| {
        error!("{stage} failed: {err}");
        err
    }
}

/// Loads `config.dataset` and trains on it.
pub fn train(config: &TrainingConfig) -> Result<Trained, Error> {
    config.validate()?;
    let dataset = RawDataset::from_file(&config.dataset).map_err(logged("Loading dataset"))?;
    train_on(dataset, config)
}

/// Split, normalize, vectorize, balance, select and evaluate.
pub fn train_on(dataset: RawDataset, config: &TrainingConfig) -> Result<Trained, Error> {
    config.validate()?;
    let (train, test) = dataset
        .split(config.test_size, config.seed)
        .map_err(logged("Splitting dataset"))?;
    info!(train = train.len(), test = test.len(), "Split dataset");

    let normalizer = Normalizer::english()?;
    let (x_train, y_train) = train.normalize(&normalizer).into_parts();
    let (x_test, y_test) = test.normalize(&normalizer).into_parts();

    let vectorizer = TfidfVectorizer::english()?
        .fit(&x_train)
        .map_err(logged("Vectorization"))?;
    let train_vectors = vectorizer.transform(&x_train);
    let test_vectors = vectorizer.transform(&x_test);

    let balanced = Smote::new(config.k_neighbors, config.seed)
        .balance(&train_vectors, &y_train)
        .map_err(logged("SMOTE"))?;
    let weights = ClassWeights::balanced(&balanced.labels)?;
    info!(ham = weights.ham, spam = weights.spam, "Computed class weights");

    let model = select(
        &balanced.vectors,
        &balanced.labels,
        &weights,
        &config.grid,
        config.cv_folds,
        config.seed,
    )
    .map_err(logged("Model training"))?;

    let metrics = evaluate(&model, &test_vectors, &y_test).map_err(logged("Model evaluation"))?;

    Ok(Trained {
        predictor: Predictor::new(normalizer, vectorizer, model),
        metrics,
    })
}
