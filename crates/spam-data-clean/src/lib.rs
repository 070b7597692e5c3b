use std::fmt;
use std::io::Read;
use std::{path::Path, str::FromStr};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{info, warn};

pub mod error;
pub mod lemmatize;
pub mod normalize;
pub mod synthetic;
pub mod vectorize;

pub use error::Error;
pub use lemmatize::{LemmaError, Lemmatize, MorphyLemmatizer};
pub use normalize::{NormalizeError, Normalizer};
pub use vectorize::{to_dense_matrix, FeatureVector, FittedVectorizer, TfidfVectorizer};

/// Header of the column holding the `ham`/`spam` token.
pub const LABEL_COLUMN: &str = "v1";
/// Header of the column holding the message text.
pub const TEXT_COLUMN: &str = "v2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Label {
    #[serde(rename = "safe")]
    Ham,
    #[serde(rename = "spam")]
    Spam,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Ham, Label::Spam];

    /// Numeric class code used by the model: 0 for ham, 1 for spam.
    pub fn code(self) -> u32 {
        match self {
            Label::Ham => 0,
            Label::Spam => 1,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Label::Ham),
            1 => Some(Label::Spam),
            _ => None,
        }
    }

    /// The word reported to callers of the classifier.
    pub fn verdict(self) -> &'static str {
        match self {
            Label::Ham => "safe",
            Label::Spam => "spam",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verdict())
    }
}

impl FromStr for Label {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ham" => Ok(Label::Ham),
            "spam" => Ok(Label::Spam),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RawData {
    pub label: Label,
    pub sms: String,
}

#[derive(Debug, Clone)]
pub struct RawDataset {
    pub data: Vec<RawData>,
}

impl RawDataset {
    pub fn from_file<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let file_data = std::fs::read(path)?;
        Self::from_bytes(file_data)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, Error> {
        let mut file_data = Vec::new();
        reader.read_to_end(&mut file_data)?;
        Self::from_bytes(file_data)
    }

    /// Parses a `v1,v2` CSV corpus. Rows whose label is not `ham`/`spam` or
    /// whose text is empty are dropped.
    fn from_bytes(file_data: Vec<u8>) -> Result<Self, Error> {
        let text = decode(file_data);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or(Error::MissingColumn(name))
        };
        let label_index = column(LABEL_COLUMN)?;
        let text_index = column(TEXT_COLUMN)?;

        let mut data = Vec::new();
        let mut dropped = 0usize;
        for record in reader.records() {
            let record = record?;
            let label = record
                .get(label_index)
                .and_then(|label| Label::from_str(label).ok());
            let sms = record.get(text_index).filter(|sms| !sms.is_empty());
            match (label, sms) {
                (Some(label), Some(sms)) => data.push(RawData {
                    label,
                    sms: sms.to_string(),
                }),
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(dropped, "Dropped rows with a missing label or text");
        }
        if data.len() < 2 {
            return Err(Error::TooSmall { usable: data.len() });
        }
        info!("Dataset loaded with {} entries", data.len());
        Ok(Self { data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, label: Label) -> usize {
        self.data.iter().filter(|row| row.label == label).count()
    }

    /// Shuffles with `seed` and moves `ceil(test_size * len)` records into
    /// the second (test) dataset.
    pub fn split(mut self, test_size: f64, seed: u64) -> Result<(Self, Self), Error> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(Error::InvalidTestSize(test_size));
        }
        let n_samples = self.len();
        let n_test = (test_size * n_samples as f64).ceil() as usize;
        if n_test == 0 || n_test >= n_samples {
            return Err(Error::TooSmall { usable: n_samples });
        }

        let mut rng = StdRng::seed_from_u64(seed);
        self.data.shuffle(&mut rng);
        let test = self.data.split_off(n_samples - n_test);
        Ok((self, Self { data: test }))
    }

    pub fn normalize(self, normalizer: &Normalizer) -> Self {
        Self {
            data: self
                .data
                .into_iter()
                .map(|row| RawData {
                    label: row.label,
                    sms: normalizer.normalize(&row.sms),
                })
                .collect(),
        }
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Label>) {
        self.data.into_iter().map(|row| (row.sms, row.label)).unzip()
    }
}

/// UTF-8 when valid, otherwise Latin-1 (every byte maps to the code point of
/// the same value).
fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    }
}
