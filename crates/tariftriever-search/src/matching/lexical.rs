//! Token overlap matching over catalog descriptions

use crate::{Method, NormalizedQuery, Normalizer, SearchResult, rank};
use std::sync::{Arc, Mutex};
use tariftriever_catalog::Catalog;
use tariftriever_config::ResolverConfig;

/// Tokenized descriptions of one catalog snapshot, indexed by position
#[derive(Debug)]
pub struct LexicalIndex {
    generation: u64,
    documents: Vec<Vec<String>>,
}

impl LexicalIndex {
    pub fn build(catalog: &Catalog, normalizer: &Normalizer) -> Self {
        let documents = catalog
            .iter()
            .map(|(_, entry)| normalizer.description_tokens(&entry.description))
            .collect();
        Self {
            generation: catalog.generation(),
            documents,
        }
    }

    fn covers(&self, catalog: &Catalog) -> bool {
        self.generation == catalog.generation() && self.documents.len() == catalog.len()
    }
}

/// Scores descriptions by the share of query tokens they contain.
///
/// A query token matches when it is a substring of some description token,
/// so a stem like "яблок" finds "яблоки". Long descriptions are discounted
/// past `length_pivot` tokens since they tend to be catch-all headings.
#[derive(Debug)]
pub struct LexicalMatcher {
    min_overlap: f32,
    length_pivot: usize,
    max_candidates: usize,
    normalizer: Normalizer,
    index: Mutex<Option<Arc<LexicalIndex>>>,
}

impl LexicalMatcher {
    /// `normalizer` must be the one queries go through, so descriptions
    /// fold to the same base forms
    pub const fn new(
        min_overlap: f32,
        length_pivot: usize,
        max_candidates: usize,
        normalizer: Normalizer,
    ) -> Self {
        Self {
            min_overlap,
            length_pivot,
            max_candidates,
            normalizer,
            index: Mutex::new(None),
        }
    }

    pub const fn from_config(config: &ResolverConfig, normalizer: Normalizer) -> Self {
        Self::new(
            config.lexical_min_overlap,
            config.lexical_length_pivot,
            config.lexical_max_candidates,
            normalizer,
        )
    }

    pub fn match_lexical(&self, query: &NormalizedQuery, catalog: &Catalog) -> Vec<SearchResult> {
        if query.tokens.is_empty() {
            return Vec::new();
        }

        let index = self.index_for(catalog);
        let mut results: Vec<SearchResult> = catalog
            .iter()
            .zip(index.documents.iter())
            .filter_map(|((position, entry), document)| {
                self.score(&query.tokens, document).map(|score| {
                    SearchResult::new(Arc::clone(entry), score, Method::Lexical, position)
                })
            })
            .collect();

        rank(&mut results);
        results.truncate(self.max_candidates);
        results
    }

    /// Index for `catalog`, rebuilt whenever a new snapshot shows up
    fn index_for(&self, catalog: &Catalog) -> Arc<LexicalIndex> {
        if let Ok(guard) = self.index.lock()
            && let Some(index) = guard.as_ref()
            && index.covers(catalog)
        {
            return Arc::clone(index);
        }

        let index = Arc::new(LexicalIndex::build(catalog, &self.normalizer));
        tracing::debug!(
            generation = catalog.generation(),
            documents = index.documents.len(),
            "Built lexical index"
        );
        if let Ok(mut guard) = self.index.lock() {
            *guard = Some(Arc::clone(&index));
        }
        index
    }

    fn score(&self, query_tokens: &[String], document: &[String]) -> Option<f32> {
        if document.is_empty() {
            return None;
        }

        let matched = query_tokens
            .iter()
            .filter(|token| document.iter().any(|word| word.contains(token.as_str())))
            .count();
        if matched == 0 {
            return None;
        }

        let overlap = matched as f32 / query_tokens.len() as f32;
        if overlap < self.min_overlap {
            return None;
        }

        Some(overlap * self.length_weight(document.len()))
    }

    fn length_weight(&self, document_len: usize) -> f32 {
        if self.length_pivot == 0 || document_len <= self.length_pivot {
            return 1.0;
        }
        let ratio = document_len as f32 / self.length_pivot as f32;
        1.0 / (1.0 + ratio.ln())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixture_catalog;
    use tariftriever_catalog::CatalogEntry;
    use tariftriever_common::Language;

    fn query(raw: &str) -> NormalizedQuery {
        Normalizer::default().normalize(raw, &Language::Ru)
    }

    fn matcher() -> LexicalMatcher {
        LexicalMatcher::from_config(&ResolverConfig::default(), Normalizer::default())
    }

    #[test]
    fn test_full_overlap_on_short_descriptions() {
        let catalog = fixture_catalog();
        let results = matcher().match_lexical(&query("яблоки свежие"), &catalog);

        // "свежее" in the meat heading folds onto the same base as "свежие"
        let codes: Vec<&str> = results.iter().map(SearchResult::code).collect();
        assert_eq!(codes, vec!["0808", "080810", "0201", "020610"]);
        assert!((results[0].score - 1.0).abs() < 1e-6);
        assert!((results[1].score - 1.0).abs() < 1e-6);
        assert!((results[2].score - 0.5).abs() < 1e-6);
        assert!(results.iter().all(|r| r.method == Method::Lexical));
    }

    #[test]
    fn test_stems_match_inflected_forms() {
        let catalog = fixture_catalog();
        let results = matcher().match_lexical(&query("яблок"), &catalog);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].code(), "0808");
    }

    #[test]
    fn test_synonyms_meet_in_base_form() {
        let (catalog, _) = Catalog::from_entries(
            vec![CatalogEntry::new("0702", "Томаты свежие или охлажденные")],
            "test",
            1,
        );
        let results = matcher().match_lexical(&query("помидоры"), &catalog);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code(), "0702");
    }

    #[test]
    fn test_paperwork_does_not_dilute_overlap() {
        let catalog = fixture_catalog();
        let results = matcher().match_lexical(&query("яблоки сертификат происхождения"), &catalog);
        assert_eq!(results[0].code(), "0808");
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_overlap_below_minimum_is_dropped() {
        let catalog = fixture_catalog();
        let results = matcher().match_lexical(&query("свежие яблоки груши"), &catalog);

        let codes: Vec<&str> = results.iter().map(SearchResult::code).collect();
        assert_eq!(codes, vec!["0808", "080810"]);
        assert!((results[1].score - 2.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_long_descriptions_are_discounted() {
        let catalog = fixture_catalog();
        let results = matcher().match_lexical(&query("чай"), &catalog);

        assert_eq!(results[0].code(), "090210");
        assert!((results[0].score - 1.0).abs() < 1e-6);

        let long = results.iter().find(|r| r.code() == "0902").unwrap();
        let expected = 1.0 / (1.0 + (14.0_f32 / 8.0).ln());
        assert!((long.score - expected).abs() < 1e-5);
    }

    #[test]
    fn test_no_tokens_no_results() {
        let catalog = fixture_catalog();
        assert!(matcher().match_lexical(&query("и в на"), &catalog).is_empty());
        assert!(matcher().match_lexical(&query("xyzzyqwerty"), &catalog).is_empty());
    }

    #[test]
    fn test_candidates_are_capped() {
        let catalog = fixture_catalog();
        let results = LexicalMatcher::new(0.5, 8, 1, Normalizer::default()).match_lexical(&query("скота"), &catalog);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code(), "0201");
    }

    #[test]
    fn test_index_follows_catalog_generation() {
        let matcher = matcher();
        let (first, _) = Catalog::from_entries(
            vec![CatalogEntry::new("0808", "Яблоки свежие")],
            "test",
            1,
        );
        let (second, _) = Catalog::from_entries(
            vec![CatalogEntry::new("0808", "Груши свежие")],
            "test",
            2,
        );

        assert_eq!(matcher.match_lexical(&query("яблоки"), &first).len(), 1);
        assert!(matcher.match_lexical(&query("яблоки"), &second).is_empty());
        assert_eq!(matcher.match_lexical(&query("груши"), &second).len(), 1);
    }
}
