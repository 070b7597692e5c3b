//! TF-IDF features over unigrams and bigrams.
//!
//! Fitting happens once on the training split; the resulting
//! [`FittedVectorizer`] is the only type able to `transform`, so every
//! vector it produces shares one vocabulary.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use regex::Regex;
use smartcore::linalg::basic::matrix::DenseMatrix;
use stopwords::{Language, SkLearn, Stopwords};
use tracing::{debug, info};

use crate::Error;

/// Sparse feature vector with a fixed dimension.
///
/// Entries are kept sorted by index and never hold an explicit zero.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            entries: Vec::new(),
        }
    }

    /// Builds a vector from `(index, weight)` pairs. Duplicate indices are
    /// summed; indices outside `dim` are ignored.
    pub fn from_entries(dim: usize, entries: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut merged = BTreeMap::new();
        for (index, weight) in entries.into_iter().filter(|&(index, _)| index < dim) {
            *merged.entry(index).or_insert(0.0) += weight;
        }
        Self {
            dim,
            entries: merged.into_iter().filter(|&(_, w)| w != 0.0).collect(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |&(i, _)| i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for &(index, weight) in &self.entries {
            dense[index] = weight;
        }
        dense
    }

    pub fn squared_distance(&self, other: &FeatureVector) -> f64 {
        self.zip_with(other, |a, b| (a - b) * (a - b))
            .map(|(_, d)| d)
            .sum()
    }

    /// The point `step` of the way from `self` towards `other`.
    pub fn interpolate(&self, other: &FeatureVector, step: f64) -> FeatureVector {
        debug_assert_eq!(self.dim, other.dim);
        Self {
            dim: self.dim,
            entries: self
                .zip_with(other, |a, b| a + step * (b - a))
                .filter(|&(_, w)| w != 0.0)
                .collect(),
        }
    }

    /// Walks the union of both index sets in order, applying `f` to the pair
    /// of weights (missing ones read as zero).
    fn zip_with<'a, F>(
        &'a self,
        other: &'a FeatureVector,
        f: F,
    ) -> impl Iterator<Item = (usize, f64)> + 'a
    where
        F: Fn(f64, f64) -> f64 + 'a,
    {
        let mut left = self.entries.iter().peekable();
        let mut right = other.entries.iter().peekable();
        std::iter::from_fn(move || {
            let next = (left.peek().copied().copied(), right.peek().copied().copied());
            let (index, a, b) = match next {
                (Some((i, a)), Some((j, b))) => match i.cmp(&j) {
                    Ordering::Less => {
                        left.next();
                        (i, a, 0.0)
                    }
                    Ordering::Greater => {
                        right.next();
                        (j, 0.0, b)
                    }
                    Ordering::Equal => {
                        left.next();
                        right.next();
                        (i, a, b)
                    }
                },
                (Some((i, a)), None) => {
                    left.next();
                    (i, a, 0.0)
                }
                (None, Some((j, b))) => {
                    right.next();
                    (j, 0.0, b)
                }
                (None, None) => return None,
            };
            Some((index, f(a, b)))
        })
    }
}

#[derive(Debug, Clone)]
struct Analyzer {
    token_pattern: Regex,
    stop_words: HashSet<&'static str>,
    ngram_range: (usize, usize),
}

impl Analyzer {
    fn terms(&self, document: &str) -> Vec<String> {
        let lowered = document.to_lowercase();
        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| !self.stop_words.contains(token))
            .collect();

        let mut terms = Vec::new();
        for n in self.ngram_range.0..=self.ngram_range.1 {
            for ngram in tokens.windows(n) {
                terms.push(ngram.join(" "));
            }
        }
        terms
    }
}

/// Unfitted TF-IDF configuration.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    analyzer: Analyzer,
}

impl TfidfVectorizer {
    /// Words of two or more characters, scikit-learn's English stop words,
    /// unigrams and bigrams.
    pub fn english() -> Result<Self, Error> {
        let stop_words = SkLearn::stopwords(Language::English)
            .ok_or(Error::Stopwords("scikit-learn English"))?;
        Ok(Self {
            analyzer: Analyzer {
                token_pattern: Regex::new(r"\b\w\w+\b")?,
                stop_words: stop_words.iter().copied().collect(),
                ngram_range: (1, 2),
            },
        })
    }

    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        let min_n = min_n.max(1);
        self.analyzer.ngram_range = (min_n, max_n.max(min_n));
        self
    }

    /// Learns the vocabulary and smoothed idf weights of `documents`.
    pub fn fit<S: AsRef<str>>(&self, documents: &[S]) -> Result<FittedVectorizer, Error> {
        let analyzed: Vec<Vec<String>> = documents
            .iter()
            .map(|document| self.analyzer.terms(document.as_ref()))
            .collect();

        // BTreeMap keeps the vocabulary in lexicographic order.
        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for terms in &analyzed {
            let unique: HashSet<&str> = terms.iter().map(String::as_str).collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }
        if document_frequency.is_empty() {
            return Err(Error::EmptyVocabulary);
        }

        let n_documents = documents.len() as f64;
        let (terms, idf): (Vec<String>, Vec<f64>) = document_frequency
            .into_iter()
            .map(|(term, df)| {
                let idf = ((1.0 + n_documents) / (1.0 + df as f64)).ln() + 1.0;
                (term.to_string(), idf)
            })
            .unzip();
        let vocabulary = terms
            .iter()
            .enumerate()
            .map(|(index, term)| (term.clone(), index))
            .collect();

        info!(
            terms = terms.len(),
            documents = documents.len(),
            "Vectorization completed successfully"
        );
        Ok(FittedVectorizer {
            analyzer: self.analyzer.clone(),
            vocabulary,
            terms,
            idf,
        })
    }

    pub fn fit_transform<S: AsRef<str>>(
        &self,
        documents: &[S],
    ) -> Result<(FittedVectorizer, Vec<FeatureVector>), Error> {
        let fitted = self.fit(documents)?;
        let vectors = fitted.transform(documents);
        Ok((fitted, vectors))
    }
}

/// Vocabulary and idf weights learned by [`TfidfVectorizer::fit`].
#[derive(Debug, Clone)]
pub struct FittedVectorizer {
    analyzer: Analyzer,
    vocabulary: HashMap<String, usize>,
    terms: Vec<String>,
    idf: Vec<f64>,
}

impl FittedVectorizer {
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Vec<FeatureVector> {
        documents
            .iter()
            .map(|document| self.transform_one(document.as_ref()))
            .collect()
    }

    /// L2-normalized tf-idf weights; unknown terms contribute nothing.
    pub fn transform_one(&self, document: &str) -> FeatureVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in self.analyzer.terms(document) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut weights: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();
        let norm = weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in &mut weights {
                *weight /= norm;
            }
        }
        debug!(nnz = weights.len(), "transformed document");
        FeatureVector::from_entries(self.terms.len(), weights)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.index_of(term).map(|index| self.idf[index])
    }
}

/// Row-major dense copy of `vectors`, ready for smartcore estimators.
pub fn to_dense_matrix(vectors: &[FeatureVector]) -> Result<DenseMatrix<f64>, Error> {
    if vectors.is_empty() {
        return Err(Error::EmptyMatrix);
    }
    let rows: Vec<Vec<f64>> = vectors.iter().map(FeatureVector::to_dense).collect();
    Ok(DenseMatrix::from_2d_vec(&rows))
}

#[cfg(test)]
mod tests {
    use smartcore::linalg::basic::arrays::Array;

    use super::*;

    fn fitted(documents: &[&str]) -> FittedVectorizer {
        TfidfVectorizer::english()
            .expect("stopwords available")
            .fit(documents)
            .expect("fit failed")
    }

    #[test]
    fn vocabulary_has_sorted_unigrams_and_bigrams() {
        let vectorizer = fitted(&["free prize money", "meeting moved tomorrow"]);
        assert_eq!(vectorizer.len(), 10);
        assert_eq!(vectorizer.term(0), Some("free"));
        assert_eq!(vectorizer.term(1), Some("free prize"));
        assert!(vectorizer.index_of("prize money").is_some());
        assert!(vectorizer.index_of("money meeting").is_none());
    }

    #[test]
    fn stop_words_and_short_tokens_are_skipped() {
        let vectorizer = fitted(&["the prize is a x for you!!!"]);
        assert_eq!(vectorizer.len(), 1);
        assert_eq!(vectorizer.term(0), Some("prize"));
    }

    #[test]
    fn smoothed_idf() {
        let vectorizer = fitted(&["free cash", "free lunch", "team lunch"]);
        let free = vectorizer.idf("free").unwrap();
        let cash = vectorizer.idf("cash").unwrap();
        assert!((free - ((4.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
        assert!((cash - (2.0f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn rows_are_unit_length() {
        let vectorizer = fitted(&["free cash free", "team lunch"]);
        let vector = vectorizer.transform_one("free cash now");
        let norm: f64 = vector.iter().map(|(_, w)| w * w).sum();
        assert!((norm - 1.0).abs() < 1e-12);
        assert!(vector.get(vectorizer.index_of("free").unwrap()) > 0.0);
    }

    #[test]
    fn unseen_text_is_all_zero() {
        let vectorizer = fitted(&["free prize money", "meeting moved tomorrow"]);
        let vector = vectorizer.transform_one("zebra quantum xylophone");
        assert!(vector.is_zero());
        assert_eq!(vector.dim(), vectorizer.len());
        assert!(vectorizer.transform_one("").is_zero());
    }

    #[test]
    fn empty_vocabulary_is_an_error() {
        let err = TfidfVectorizer::english()
            .unwrap()
            .fit(&["the a of", "!!! $$$"])
            .unwrap_err();
        assert!(matches!(err, Error::EmptyVocabulary));
    }

    #[test]
    fn sparse_arithmetic() {
        let a = FeatureVector::from_entries(5, [(0, 1.0), (3, 2.0), (9, 4.0)]);
        let b = FeatureVector::from_entries(5, [(1, 1.0), (3, 4.0)]);
        assert_eq!(a.nnz(), 2);
        assert_eq!(a.squared_distance(&b), 1.0 + 1.0 + 4.0);

        let mid = a.interpolate(&b, 0.5);
        assert_eq!(mid.to_dense(), vec![0.5, 0.5, 0.0, 3.0, 0.0]);
        assert_eq!(a.interpolate(&b, 0.0), a);
    }

    #[test]
    fn dense_matrix_shape() {
        let vectorizer = fitted(&["free prize money", "meeting moved tomorrow"]);
        let vectors = vectorizer.transform(&["free money", "tomorrow"]);
        let matrix = to_dense_matrix(&vectors).unwrap();
        assert_eq!(matrix.shape(), (2, vectorizer.len()));
        assert!(matches!(to_dense_matrix(&[]), Err(Error::EmptyMatrix)));
    }
}
