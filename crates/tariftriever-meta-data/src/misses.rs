//! `PostgreSQL` backed miss log

use crate::{DatabaseErrorExt, DatabaseOperation, DatabaseResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tariftriever_common::Language;
use tariftriever_misses::{
    LanguageCount, MissError, MissRecord, MissResult, MissSink, MissStats, MissStatsSource,
    QueryCount,
};

/// Appends misses to `not_found_queries` and reports over it
#[derive(Clone)]
pub struct PgMissSink {
    pool: PgPool,
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

impl PgMissSink {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one record
    ///
    /// # Errors
    /// Returns `DatabaseError` if the insert fails
    pub async fn insert(&self, record: &MissRecord) -> DatabaseResult<()> {
        let operation = DatabaseOperation::AppendMiss {
            language: record.language.code().to_string(),
            source: record.source.clone(),
        };

        sqlx::query(
            "INSERT INTO not_found_queries (user_id, query, language, search_timestamp, search_source)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(record.user_id)
        .bind(&record.query_text)
        .bind(record.language.code())
        .bind(record.timestamp)
        .bind(&record.source)
        .execute(&self.pool)
        .await
        .map_db_err(operation)?;

        Ok(())
    }

    /// Aggregate statistics straight from SQL
    ///
    /// # Errors
    /// Returns `DatabaseError` if any of the report queries fail
    pub async fn load_stats(&self, recent_limit: usize) -> DatabaseResult<MissStats> {
        let operation = || DatabaseOperation::MissStats { recent_limit };

        let total: i64 = sqlx::query("SELECT COUNT(*) AS count FROM not_found_queries")
            .fetch_one(&self.pool)
            .await
            .and_then(|row| row.try_get("count"))
            .map_db_err(operation())?;

        let by_language = sqlx::query(
            "SELECT language, COUNT(*) AS count FROM not_found_queries
             GROUP BY language ORDER BY count DESC, language",
        )
        .fetch_all(&self.pool)
        .await
        .map_db_err(operation())?
        .iter()
        .map(|row| {
            Ok(LanguageCount {
                language: row.try_get("language")?,
                count: to_count(row.try_get("count")?),
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()
        .map_db_err(operation())?;

        let top_queries = sqlx::query(
            "SELECT query, COUNT(*) AS count FROM not_found_queries
             GROUP BY query HAVING COUNT(*) > 1
             ORDER BY count DESC, query LIMIT 10",
        )
        .fetch_all(&self.pool)
        .await
        .map_db_err(operation())?
        .iter()
        .map(|row| {
            Ok(QueryCount {
                query: row.try_get("query")?,
                count: to_count(row.try_get("count")?),
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()
        .map_db_err(operation())?;

        let last_7_days: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM not_found_queries WHERE search_timestamp >= $1",
        )
        .bind(MissStats::window_start(Utc::now()))
        .fetch_one(&self.pool)
        .await
        .and_then(|row| row.try_get("count"))
        .map_db_err(operation())?;

        let recent = sqlx::query(
            "SELECT user_id, query, language, search_timestamp, search_source
             FROM not_found_queries ORDER BY search_timestamp DESC, id DESC LIMIT $1",
        )
        .bind(i64::try_from(recent_limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_db_err(operation())?
        .iter()
        .map(|row| {
            let language: String = row.try_get("language")?;
            let timestamp: DateTime<Utc> = row.try_get("search_timestamp")?;
            Ok(MissRecord {
                query_text: row.try_get("query")?,
                language: Language::try_from(language)
                    .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
                user_id: row.try_get("user_id")?,
                timestamp,
                source: row.try_get("search_source")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()
        .map_db_err(operation())?;

        Ok(MissStats {
            total: to_count(total),
            by_language,
            top_queries,
            last_7_days: to_count(last_7_days),
            recent,
        })
    }
}

#[async_trait]
impl MissSink for PgMissSink {
    async fn append(&self, record: &MissRecord) -> MissResult<()> {
        self.insert(record)
            .await
            .map_err(MissError::recording_failed)
    }

    fn name(&self) -> &str {
        "postgres:not_found_queries"
    }
}

#[async_trait]
impl MissStatsSource for PgMissSink {
    async fn stats(&self, recent_limit: usize) -> MissResult<MissStats> {
        self.load_stats(recent_limit)
            .await
            .map_err(MissError::storage)
    }
}
