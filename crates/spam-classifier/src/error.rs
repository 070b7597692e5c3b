use thiserror::Error;

use crate::balance::BalanceError;
use crate::select::SelectError;

/// Setup failures. Any of these aborts training, and no partially built
/// pipeline is handed out.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Data(#[from] spam_data_clean::Error),
    #[error("SMOTE failed: {0}")]
    Balance(#[from] BalanceError),
    #[error("Model training failed: {0}")]
    Select(#[from] SelectError),
    #[error("Model evaluation failed: {0}")]
    Evaluate(#[source] SelectError),
    #[error("invalid configuration: {0}")]
    Config(String),
}
