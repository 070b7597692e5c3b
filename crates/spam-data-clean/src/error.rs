use thiserror::Error;

/// Failures while loading or featurizing the corpus. All of them abort
/// training.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataset has no `{0}` column")]
    MissingColumn(&'static str),
    #[error("dataset too small to split: {usable} usable records")]
    TooSmall { usable: usize },
    #[error("test size must lie strictly between 0 and 1, got {0}")]
    InvalidTestSize(f64),
    #[error("{0} stopword list is unavailable")]
    Stopwords(&'static str),
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("empty vocabulary; perhaps the documents only contain stop words")]
    EmptyVocabulary,
    #[error("cannot build a feature matrix from zero rows")]
    EmptyMatrix,
}
