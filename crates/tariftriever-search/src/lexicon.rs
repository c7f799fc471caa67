//! Word folding and paperwork stripping tables, compiled from config

use std::collections::{BTreeMap, HashMap};

/// Lookup form of the configured vocabulary.
///
/// Entries are stored already folded, so they compare directly against
/// normalized tokens.
#[derive(Debug, Default)]
pub struct Lexicon {
    bases: HashMap<String, String>,
    /// Token sequences, longest first so "код тн вэд" wins over "тн вэд"
    phrases: Vec<Vec<String>>,
}

impl Lexicon {
    pub fn new(
        word_variations: &BTreeMap<String, Vec<String>>,
        administrative_terms: &[String],
        fold: impl Fn(&str) -> String,
    ) -> Self {
        let mut bases = HashMap::new();
        for (base, variants) in word_variations {
            let base = fold(base);
            for variant in variants {
                bases.insert(fold(variant), base.clone());
            }
        }

        let mut phrases: Vec<Vec<String>> = administrative_terms
            .iter()
            .map(|term| fold(term).split_whitespace().map(str::to_string).collect())
            .filter(|phrase: &Vec<String>| !phrase.is_empty())
            .collect();
        phrases.sort_by(|a, b| b.len().cmp(&a.len()));

        Self { bases, phrases }
    }

    /// Base form of `token`, or the token itself when it has none
    pub fn base_form<'a>(&'a self, token: &'a str) -> &'a str {
        self.bases.get(token).map_or(token, String::as_str)
    }

    /// `words` with every administrative phrase removed
    pub fn strip_phrases<'a>(&self, words: &[&'a str]) -> Vec<&'a str> {
        let mut kept = Vec::with_capacity(words.len());
        let mut rest = words;
        while let Some((first, tail)) = rest.split_first() {
            let skip = self
                .phrases
                .iter()
                .find(|phrase| {
                    phrase.len() <= rest.len()
                        && phrase.iter().zip(rest).all(|(expected, word)| expected == word)
                })
                .map(Vec::len);

            match skip {
                Some(len) => rest = rest.get(len..).unwrap_or_default(),
                None => {
                    kept.push(*first);
                    rest = tail;
                }
            }
        }
        kept
    }
}
