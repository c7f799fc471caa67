//! Aggregate miss statistics

use crate::MissRecord;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Most common queries are only reported once they repeat
const TOP_QUERY_MIN_COUNT: u64 = 2;
const TOP_QUERY_LIMIT: usize = 10;
const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageCount {
    pub language: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryCount {
    pub query: String,
    pub count: u64,
}

/// Everything the `/stats` report shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissStats {
    pub total: u64,
    /// Sorted by count, descending
    pub by_language: Vec<LanguageCount>,
    /// Repeated queries (count > 1), most frequent first, at most ten
    pub top_queries: Vec<QueryCount>,
    pub last_7_days: u64,
    /// Newest first
    pub recent: Vec<MissRecord>,
}

impl MissStats {
    /// Start of the "last 7 days" window relative to `now`
    pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(Duration::days(RECENT_WINDOW_DAYS))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Compute statistics over an in-memory record list
    pub fn from_records(records: &[MissRecord], recent_limit: usize, now: DateTime<Utc>) -> Self {
        let since = Self::window_start(now);

        let mut by_language: HashMap<&str, u64> = HashMap::new();
        let mut by_query: HashMap<&str, u64> = HashMap::new();
        let mut last_7_days = 0_u64;

        for record in records {
            let lang = by_language.entry(record.language.code()).or_default();
            *lang = lang.saturating_add(1);
            let query = by_query.entry(record.query_text.as_str()).or_default();
            *query = query.saturating_add(1);
            if record.timestamp >= since {
                last_7_days = last_7_days.saturating_add(1);
            }
        }

        let mut by_language: Vec<LanguageCount> = by_language
            .into_iter()
            .map(|(language, count)| LanguageCount {
                language: language.to_string(),
                count,
            })
            .collect();
        by_language.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.language.cmp(&b.language)));

        let mut top_queries: Vec<QueryCount> = by_query
            .into_iter()
            .filter(|(_, count)| *count >= TOP_QUERY_MIN_COUNT)
            .map(|(query, count)| QueryCount {
                query: query.to_string(),
                count,
            })
            .collect();
        top_queries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.query.cmp(&b.query)));
        top_queries.truncate(TOP_QUERY_LIMIT);

        let mut recent: Vec<MissRecord> = records.to_vec();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(recent_limit);

        Self {
            total: records.len() as u64,
            by_language,
            top_queries,
            last_7_days,
            recent,
        }
    }
}
