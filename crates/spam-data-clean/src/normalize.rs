//! Message clean-up ahead of vectorization.
//!
//! Punctuation is kept on purpose: runs such as `!!!` or `$$$` are some of
//! the strongest spam markers in the corpus.

use std::borrow::Cow;
use std::collections::HashSet;

use regex::Regex;
use stopwords::{Language, Stopwords, NLTK};
use thiserror::Error;
use tracing::{error, warn};

use crate::lemmatize::{LemmaError, Lemmatize, MorphyLemmatizer};

/// Words dropped on top of the NLTK English list.
pub const DOMAIN_STOPWORDS: [&str; 4] = ["subject", "http", "www", "com"];

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("lemmatization failed: {0}")]
    Lemmatizer(#[source] LemmaError),
}

pub struct Normalizer {
    stopwords: HashSet<String>,
    digits: Regex,
    links: Regex,
    lemmatizer: Box<dyn Lemmatize>,
}

impl Normalizer {
    pub fn english() -> Result<Self, crate::Error> {
        Self::with_lemmatizer(MorphyLemmatizer::new())
    }

    pub fn with_lemmatizer<L>(lemmatizer: L) -> Result<Self, crate::Error>
    where
        L: Lemmatize + 'static,
    {
        let english =
            NLTK::stopwords(Language::English).ok_or(crate::Error::Stopwords("NLTK English"))?;
        let stopwords = english
            .iter()
            .chain(DOMAIN_STOPWORDS.iter())
            .map(|word| word.to_string())
            .collect();

        Ok(Self {
            stopwords,
            digits: Regex::new(r"\d+")?,
            links: Regex::new(r"http\S+|www\S+|@\S+")?,
            lemmatizer: Box::new(lemmatizer),
        })
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Normalizes `raw`, or hands it back untouched when normalization as a
    /// whole fails.
    pub fn normalize(&self, raw: &str) -> String {
        match self.try_normalize(raw) {
            Ok(normalized) => normalized,
            Err(err) => {
                error!("Error preprocessing message: {err}");
                raw.to_string()
            }
        }
    }

    pub fn try_normalize(&self, raw: &str) -> Result<String, NormalizeError> {
        let message = raw.to_lowercase();
        // Links go before and after the digit pass. Before, so a mention
        // made of digits ("@2024") leaves no bare `@`. After, because
        // dropping digits may glue a link back together ("ht1tp://...").
        let message = self.links.replace_all(message.trim(), "");
        let message = self.digits.replace_all(&message, "");
        let message = self.links.replace_all(&message, "");

        let mut processed = Vec::new();
        for word in message
            .split_whitespace()
            .filter(|word| !self.is_stopword(word))
        {
            processed.push(self.lemma_or_word(word)?);
        }
        Ok(processed.join(" "))
    }

    fn lemma_or_word<'a>(&self, word: &'a str) -> Result<Cow<'a, str>, NormalizeError> {
        match self.lemmatizer.lemmatize(word) {
            // A lemma that lands on a stop word would vanish on the next pass.
            Ok(lemma) if lemma != word && self.is_stopword(&lemma) => Ok(Cow::Borrowed(word)),
            Ok(lemma) => Ok(Cow::Owned(lemma)),
            Err(err) if err.is_per_token() => {
                warn!("Failed to lemmatize word '{word}': {err}");
                Ok(Cow::Borrowed(word))
            }
            Err(err) => Err(NormalizeError::Lemmatizer(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lemmatize::MAX_TOKEN_LEN;

    struct Offline;

    impl Lemmatize for Offline {
        fn lemmatize(&self, _token: &str) -> Result<String, LemmaError> {
            Err(LemmaError::Unavailable("lexicon not loaded".into()))
        }
    }

    fn normalizer() -> Normalizer {
        Normalizer::english().expect("stopwords available")
    }

    #[test]
    fn links_mentions_and_digits_vanish() {
        let normalizer = normalizer();
        for raw in [
            "http://spam.example/win @someone 2024",
            "  www.win.biz 555 1234 @x  ",
            "HTTPS://EXAMPLE.COM/PATH",
            "12 34 56",
            "@2024",
            "@12 @34",
            "",
        ] {
            assert_eq!(normalizer.normalize(raw), "", "{raw:?}");
        }
    }

    #[test]
    fn keeps_punctuation() {
        let normalizer = normalizer();
        let normalized =
            normalizer.normalize("URGENT!!! You have WON a FREE iPhone!!! Click HERE NOW!!!");
        let tokens: Vec<_> = normalized.split(' ').collect();
        for kept in ["urgent!!!", "free", "iphone!!!", "click", "now!!!"] {
            assert!(tokens.contains(&kept), "{kept} missing from {normalized:?}");
        }
        for dropped in ["you", "have", "a", "here"] {
            assert!(!tokens.contains(&dropped), "{dropped} kept in {normalized:?}");
        }
        assert_eq!(
            normalizer.normalize("$$$ MAKE MONEY FAST $$$"),
            "$$$ make money fast $$$"
        );
    }

    #[test]
    fn drops_stopwords_and_lemmatizes() {
        let normalizer = normalizer();
        assert_eq!(
            normalizer.normalize("Subject: Please review the attached documents"),
            "subject: please review attached document"
        );
        assert_eq!(normalizer.normalize("the subject of the messages"), "message");
    }

    #[test]
    fn idempotent() {
        let normalizer = normalizer();
        for raw in [
            "URGENT!!! You have WON a FREE iPhone!!! Click HERE NOW!!!",
            "Can we schedule a call for tomorrow?",
            "ht1tp://sneaky.link and w2ww.other.biz are links",
            "a@1b mentions @ people",
            "@2024 winners ht1tp://sneaky.link @12",
            "Subjects glasses cities ases mens",
            "  Mixed   CASE\twhitespace\nlines  ",
        ] {
            let once = normalizer.normalize(raw);
            assert_eq!(normalizer.normalize(&once), once, "{raw:?}");
        }
    }

    #[test]
    fn lemma_that_is_a_stopword_is_not_used() {
        assert_eq!(normalizer().normalize("subjects"), "subjects");
    }

    #[test]
    fn bad_token_falls_back_to_itself() {
        let long = format!("{}s", "x".repeat(MAX_TOKEN_LEN));
        let raw = format!("prizes {long}");
        assert_eq!(normalizer().normalize(&raw), format!("prize {long}"));
    }

    #[test]
    fn unexpected_failure_returns_raw_message() {
        let normalizer = Normalizer::with_lemmatizer(Offline).expect("stopwords available");
        assert!(normalizer.try_normalize("Hello Friends").is_err());
        assert_eq!(normalizer.normalize("Hello Friends"), "Hello Friends");
    }
}
