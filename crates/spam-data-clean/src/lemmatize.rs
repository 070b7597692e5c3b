//! Noun lemmatization without a dictionary.
//!
//! [`MorphyLemmatizer`] applies WordNet's noun detachment rules (`-ies` to
//! `-y`, `-ches` to `-ch`, plain `-s`, ...) together with a table of
//! irregular plurals. With no lexicon to confirm a candidate, a few guards
//! keep obviously singular words such as `glass`, `bonus` or `news` intact.
//! Plurals outside the table that need more than a detachment (`houses`
//! works, `campuses` becomes `campuse`) are not recognised.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

/// Tokens longer than this are refused rather than lemmatized.
pub const MAX_TOKEN_LEN: usize = 48;

const DETACHMENTS: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("xes", "x"),
    ("ies", "y"),
    ("s", ""),
];

/// Plurals the detachment rules get wrong: vowel changes, `-ves` for
/// `-f`/`-fe`, and `-uses` for `-us`.
const IRREGULAR: &[(&str, &str)] = &[
    ("bonuses", "bonus"),
    ("buses", "bus"),
    ("calves", "calf"),
    ("children", "child"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("gentlemen", "gentleman"),
    ("halves", "half"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("lives", "life"),
    ("loaves", "loaf"),
    ("men", "man"),
    ("mice", "mouse"),
    ("selves", "self"),
    ("shelves", "shelf"),
    ("statuses", "status"),
    ("teeth", "tooth"),
    ("thieves", "thief"),
    ("viruses", "virus"),
    ("wives", "wife"),
    ("wolves", "wolf"),
    ("women", "woman"),
];

const INVARIANT: &[&str] = &[
    "always", "alias", "atlas", "bias", "canvas", "chaos", "christmas", "economics", "gas",
    "lens", "means", "news", "perhaps", "physics", "politics", "series", "species", "thanks",
    "whereas",
];

/// Singular endings that look like plurals.
const SINGULAR_ENDINGS: &[&str] = &["ss", "us", "is"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LemmaError {
    /// Affects one token only; callers keep the token as it was.
    #[error("token of {len} characters exceeds the limit of {max}")]
    TokenTooLong { len: usize, max: usize },
    /// The lemmatizer cannot serve any token.
    #[error("lemmatizer unavailable: {0}")]
    Unavailable(String),
}

impl LemmaError {
    pub fn is_per_token(&self) -> bool {
        !matches!(self, LemmaError::Unavailable(_))
    }
}

/// Reduces a single token to its dictionary base form.
pub trait Lemmatize: Send + Sync {
    fn lemmatize(&self, token: &str) -> Result<String, LemmaError>;
}

#[derive(Debug, Clone)]
pub struct MorphyLemmatizer {
    irregular: HashMap<&'static str, &'static str>,
    invariant: HashSet<&'static str>,
}

impl Default for MorphyLemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MorphyLemmatizer {
    pub fn new() -> Self {
        Self {
            irregular: IRREGULAR.iter().copied().collect(),
            invariant: INVARIANT.iter().copied().collect(),
        }
    }

    /// One detachment step, or `None` when `word` is already a base form.
    fn reduce(&self, word: &str) -> Option<String> {
        if let Some(base) = self.irregular.get(word) {
            return Some(base.to_string());
        }
        if word.chars().count() < 4
            || self.invariant.contains(word)
            || SINGULAR_ENDINGS.iter().any(|ending| word.ends_with(ending))
        {
            return None;
        }

        DETACHMENTS.iter().find_map(|(suffix, replacement)| {
            let stem = word.strip_suffix(suffix)?;
            let base = format!("{stem}{replacement}");
            (base.chars().count() >= 3).then_some(base)
        })
    }
}

impl Lemmatize for MorphyLemmatizer {
    fn lemmatize(&self, token: &str) -> Result<String, LemmaError> {
        let len = token.chars().count();
        if len > MAX_TOKEN_LEN {
            return Err(LemmaError::TokenTooLong {
                len,
                max: MAX_TOKEN_LEN,
            });
        }
        if !token.chars().all(char::is_alphabetic) {
            return Ok(token.to_string());
        }

        // Only accept a candidate that is itself a base form, so that
        // lemmatizing twice changes nothing.
        match self.reduce(token) {
            Some(base) if self.reduce(&base).is_none() => Ok(base),
            _ => Ok(token.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lemma(word: &str) -> String {
        MorphyLemmatizer::new().lemmatize(word).unwrap()
    }

    #[test]
    fn regular_plurals() {
        assert_eq!(lemma("documents"), "document");
        assert_eq!(lemma("cities"), "city");
        assert_eq!(lemma("beaches"), "beach");
        assert_eq!(lemma("wishes"), "wish");
        assert_eq!(lemma("boxes"), "box");
        assert_eq!(lemma("glasses"), "glass");
        assert_eq!(lemma("prizes"), "prize");
    }

    #[test]
    fn singular_forms_untouched() {
        for word in ["glass", "bonus", "analysis", "news", "free", "gas", "ties"] {
            let expected = if word == "ties" { "tie" } else { word };
            assert_eq!(lemma(word), expected);
        }
    }

    #[test]
    fn irregular_plurals() {
        assert_eq!(lemma("children"), "child");
        assert_eq!(lemma("women"), "woman");
        assert_eq!(lemma("buses"), "bus");
        assert_eq!(lemma("bonuses"), "bonus");
        assert_eq!(lemma("wives"), "wife");
        assert_eq!(lemma("knives"), "knife");
        assert_eq!(lemma("shelves"), "shelf");
        assert_eq!(lemma("leaves"), "leaf");
    }

    #[test]
    fn irregular_bases_are_fixed_points() {
        for (_, base) in IRREGULAR {
            assert_eq!(lemma(base), *base);
        }
    }

    #[test]
    fn punctuated_tokens_pass_through() {
        assert_eq!(lemma("iphones!!!"), "iphones!!!");
        assert_eq!(lemma("$$$"), "$$$");
    }

    #[test]
    fn lemmas_are_fixed_points() {
        let lemmatizer = MorphyLemmatizer::new();
        for word in ["messages", "addresses", "replies", "taxes", "mens", "ases", "dollars"] {
            let once = lemmatizer.lemmatize(word).unwrap();
            assert_eq!(lemmatizer.lemmatize(&once).unwrap(), once, "{word}");
        }
    }

    #[test]
    fn overlong_token_is_a_per_token_error() {
        let word = "a".repeat(MAX_TOKEN_LEN + 1);
        let err = MorphyLemmatizer::new().lemmatize(&word).unwrap_err();
        assert!(err.is_per_token());
        assert_eq!(
            err,
            LemmaError::TokenTooLong {
                len: MAX_TOKEN_LEN + 1,
                max: MAX_TOKEN_LEN
            }
        );
    }
}
