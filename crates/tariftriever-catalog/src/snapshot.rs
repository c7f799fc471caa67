//! Immutable catalog snapshot

use crate::entry::{CatalogEntry, is_valid_code};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

/// What happened to the raw provider rows while building a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub accepted: usize,
    pub invalid_codes: usize,
    pub duplicate_codes: usize,
    pub empty_descriptions: usize,
    /// Entries kept without their vector because it was malformed
    pub dropped_embeddings: usize,
}

/// A read-only view of the whole catalog.
///
/// Entries keep the provider's order; that position is the final tie-breaker
/// when ranking results.
#[derive(Debug)]
pub struct Catalog {
    entries: Vec<Arc<CatalogEntry>>,
    by_code: BTreeMap<String, usize>,
    generation: u64,
    loaded_at: DateTime<Utc>,
    source_name: String,
    embedding_dimension: Option<usize>,
}

impl Catalog {
    /// Build a snapshot, skipping rows that would break catalog invariants.
    ///
    /// First occurrence of a code wins. The first embedding seen fixes the
    /// vector dimension; vectors of another length or with non-finite values
    /// are dropped so the semantic tier never sees them.
    pub fn from_entries(
        entries: impl IntoIterator<Item = CatalogEntry>,
        source_name: impl Into<String>,
        generation: u64,
    ) -> (Self, LoadReport) {
        let source_name = source_name.into();
        let mut report = LoadReport::default();
        let mut kept: Vec<Arc<CatalogEntry>> = Vec::new();
        let mut by_code = BTreeMap::new();
        let mut embedding_dimension: Option<usize> = None;

        for mut entry in entries {
            entry.code = entry.code.trim().to_string();
            entry.description = entry.description.trim().to_string();

            if !is_valid_code(&entry.code) {
                tracing::debug!(code = %entry.code, source = %source_name, "Skipping invalid tariff code");
                report.invalid_codes = report.invalid_codes.saturating_add(1);
                continue;
            }
            if entry.description.is_empty() {
                report.empty_descriptions = report.empty_descriptions.saturating_add(1);
                continue;
            }

            let Entry::Vacant(slot) = by_code.entry(entry.code.clone()) else {
                tracing::debug!(code = %entry.code, source = %source_name, "Skipping duplicate tariff code");
                report.duplicate_codes = report.duplicate_codes.saturating_add(1);
                continue;
            };

            if let Some(vector) = entry.embedding.as_ref() {
                let finite = vector.iter().all(|v| v.is_finite());
                let dimension_ok = match embedding_dimension {
                    Some(dim) => vector.len() == dim,
                    None => !vector.is_empty(),
                };
                if finite && dimension_ok {
                    embedding_dimension.get_or_insert(vector.len());
                } else {
                    entry.embedding = None;
                    report.dropped_embeddings = report.dropped_embeddings.saturating_add(1);
                }
            }

            slot.insert(kept.len());
            kept.push(Arc::new(entry));
        }

        report.accepted = kept.len();

        let catalog = Self {
            entries: kept,
            by_code,
            generation,
            loaded_at: Utc::now(),
            source_name,
            embedding_dimension,
        };
        (catalog, report)
    }

    /// Exact code lookup; returns the entry's insertion position too
    pub fn get(&self, code: &str) -> Option<(usize, &Arc<CatalogEntry>)> {
        let position = *self.by_code.get(code)?;
        self.entries.get(position).map(|entry| (position, entry))
    }

    /// Every entry whose code starts with `prefix`, in code order
    pub fn with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (usize, &'a Arc<CatalogEntry>)> + 'a {
        self.by_code
            .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
            .take_while(move |(code, _)| code.starts_with(prefix))
            .filter_map(move |(_, &position)| self.entries.get(position).map(|e| (position, e)))
    }

    /// Entries in insertion order with their position
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Arc<CatalogEntry>)> {
        self.entries.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub const fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Dimension of the precomputed vectors, if any entry has one
    pub const fn embedding_dimension(&self) -> Option<usize> {
        self.embedding_dimension
    }

    pub fn embedded_count(&self) -> usize {
        self.entries.iter().filter(|e| e.embedding.is_some()).count()
    }
}
