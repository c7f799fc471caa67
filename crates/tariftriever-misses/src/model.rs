use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tariftriever_common::Language;

/// One query that resolved to nothing. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissRecord {
    /// The query exactly as the user typed it
    pub query_text: String,
    pub language: Language,
    /// Opaque caller identifier (chat user id for the bot)
    pub user_id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    /// Which surface the query came through ("api", "cli", "bot", ...)
    pub source: String,
}

impl MissRecord {
    pub fn new(
        query_text: impl Into<String>,
        language: Language,
        user_id: Option<i64>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            query_text: query_text.into(),
            language,
            user_id,
            timestamp: Utc::now(),
            source: source.into(),
        }
    }
}
