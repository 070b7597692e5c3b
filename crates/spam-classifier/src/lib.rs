//! Training and inference for the spam classifier.
//!
//! [`train`] runs the whole setup sequence once: load, split, normalize,
//! vectorize, balance, grid search and evaluation. The [`Predictor`] it
//! returns is immutable and can be shared between threads.

pub mod balance;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod pipeline;
pub mod predict;
pub mod select;

pub use balance::{BalanceError, Balanced, ClassWeights, Smote};
pub use config::{ParamGrid, TrainingConfig};
pub use error::Error;
pub use evaluate::{ClassificationReport, Metrics};
pub use pipeline::{train, train_on, Trained};
pub use predict::{PredictError, Predictor};
pub use select::{select, Candidate, SelectError, TrainedModel};
pub use spam_data_clean::Label;
