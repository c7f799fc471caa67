//! Query normalization
//!
//! Pure and infallible: any input, including garbage, yields a
//! [`NormalizedQuery`]. Code detection ignores punctuation, so "0206.10",
//! "(0206 10)" and "0206-10;" all become the digit string "020610".
//!
//! Free text is folded to lowercase words, paperwork phrases ("тн вэд",
//! "сертификат соответствия") are dropped and tokens are mapped onto their
//! base form ("томаты" -> "помидор"). Descriptions go through the same
//! folding so query and catalog tokens meet in the middle.

use crate::NormalizedQuery;
use crate::lexicon::Lexicon;
use crate::stopwords;
use std::sync::Arc;
use tariftriever_common::Language;
use tariftriever_config::ResolverConfig;

#[derive(Debug, Clone)]
pub struct Normalizer {
    min_code_digits: usize,
    max_code_digits: usize,
    lexicon: Arc<Lexicon>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::from_config(&ResolverConfig::default())
    }
}

impl Normalizer {
    /// Normalizer with no vocabulary tables
    pub fn new(min_code_digits: usize, max_code_digits: usize) -> Self {
        Self {
            min_code_digits,
            max_code_digits,
            lexicon: Arc::new(Lexicon::default()),
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self {
            min_code_digits: config.min_code_digits,
            max_code_digits: config.max_code_digits,
            lexicon: Arc::new(Lexicon::new(
                &config.word_variations,
                &config.administrative_terms,
                fold,
            )),
        }
    }

    pub fn normalize(&self, raw_text: &str, language: &Language) -> NormalizedQuery {
        let cleaned = strip_invisible(raw_text);
        let trimmed = cleaned.trim();

        if let Some(digits) = self.code_digits(trimmed) {
            return NormalizedQuery {
                tokens: vec![digits.clone()],
                text: digits,
                looks_like_code: true,
            };
        }

        let text = self.strip_paperwork(&fold(trimmed));
        let tokens = self.content_tokens(&text, |token| stopwords::is_stopword(language, token));

        NormalizedQuery {
            text,
            looks_like_code: false,
            tokens,
        }
    }

    /// Tokenize a catalog description with the same folding rules as queries.
    ///
    /// Descriptions have no language tag, so stopwords of every language are
    /// removed.
    pub fn description_tokens(&self, description: &str) -> Vec<String> {
        let text = fold(strip_invisible(description).trim());
        self.content_tokens(&text, stopwords::is_stopword_any)
    }

    /// Digit string of a code-like input, if it is one.
    ///
    /// Any letter makes the input free text; everything else that is not an
    /// ASCII digit is treated as punctuation and dropped.
    fn code_digits(&self, text: &str) -> Option<String> {
        let mut digits = String::new();
        for c in text.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
            } else if c.is_alphanumeric() {
                return None;
            }
        }

        let count = digits.len();
        (count > 0 && (self.min_code_digits..=self.max_code_digits).contains(&count))
            .then_some(digits)
    }

    /// Drop administrative phrases, unless nothing else would be left
    fn strip_paperwork(&self, folded: &str) -> String {
        let words: Vec<&str> = folded.split_whitespace().collect();
        let kept = self.lexicon.strip_phrases(&words);
        if kept.is_empty() {
            folded.to_string()
        } else {
            kept.join(" ")
        }
    }

    fn content_tokens(&self, text: &str, is_stopword: impl Fn(&str) -> bool) -> Vec<String> {
        text.split_whitespace()
            .filter(|token| token.chars().count() > 1 && !is_stopword(token))
            .map(|token| self.lexicon.base_form(token).to_string())
            .collect()
    }
}

/// Replace non-breaking spaces, drop zero-width and directional marks
fn strip_invisible(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| match c {
            '\u{00A0}' | '\u{2007}' | '\u{202F}' => Some(' '),
            '\u{200B}'..='\u{200F}' | '\u{FEFF}' => None,
            other => Some(other),
        })
        .collect()
}

/// Lowercase, turn punctuation into spaces, collapse whitespace
fn fold(text: &str) -> String {
    let spaced: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
