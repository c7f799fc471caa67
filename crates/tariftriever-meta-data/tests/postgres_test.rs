//! Integration tests against a real PostgreSQL server
//!
//! Skipped unless `TARIFTRIEVER_TEST_DATABASE_URL` is set. Every test migrates
//! into a schema of its own, so tests can run in parallel against one server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{Duration, Utc};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tariftriever_catalog::CatalogProvider;
use tariftriever_common::{CorrelationId, Language};
use tariftriever_meta_data::{PgCatalogProvider, PgMissSink, run_migrations};
use tariftriever_misses::{MissRecord, MissSink, MissStatsSource};

const DATABASE_URL_VAR: &str = "TARIFTRIEVER_TEST_DATABASE_URL";

struct TestDatabase {
    pool: PgPool,
    admin: PgPool,
    schema: String,
}

impl TestDatabase {
    /// `None` when no test server is configured
    async fn create() -> Option<Self> {
        let Ok(url) = std::env::var(DATABASE_URL_VAR) else {
            println!("Skipping test - {DATABASE_URL_VAR} not set");
            return None;
        };
        let schema = format!("test_{}", CorrelationId::new().to_string().replace('-', "_"));

        let admin = PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .expect("Failed to connect to test database");
        sqlx::query(&format!("CREATE SCHEMA {schema}"))
            .execute(&admin)
            .await
            .expect("Failed to create test schema");

        let options: PgConnectOptions = url.parse().expect("Invalid test database URL");
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(options.options([("search_path", schema.as_str())]))
            .await
            .expect("Failed to connect with test schema");
        run_migrations(&pool).await.expect("Migrations failed");

        Some(Self {
            pool,
            admin,
            schema,
        })
    }

    async fn drop_schema(self) {
        self.pool.close().await;
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin)
            .await
            .expect("Failed to drop test schema");
    }
}

async fn insert_code(pool: &PgPool, code: &str, description: &str, embedding: Option<Vec<f32>>) {
    sqlx::query("INSERT INTO tariff_codes (code, description, embedding) VALUES ($1, $2, $3)")
        .bind(code)
        .bind(description)
        .bind(embedding)
        .execute(pool)
        .await
        .expect("Failed to insert tariff code");
}

#[tokio::test]
async fn test_catalog_loads_in_insertion_order() {
    let Some(db) = TestDatabase::create().await else {
        return;
    };

    insert_code(&db.pool, "8703", "Автомобили легковые", None).await;
    insert_code(&db.pool, "0206", "Пищевые субпродукты", Some(vec![0.0, 1.0, 0.0])).await;
    insert_code(&db.pool, "0808", "Яблоки, груши и айва, свежие", None).await;

    let provider = PgCatalogProvider::new(db.pool.clone());
    let entries = provider.load().await.unwrap();

    let codes: Vec<&str> = entries.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(codes, vec!["8703", "0206", "0808"]);
    assert_eq!(entries[1].embedding, Some(vec![0.0, 1.0, 0.0]));
    assert!(entries[0].embedding.is_none());
    assert_eq!(provider.count().await.unwrap(), 3);

    db.drop_schema().await;
}

#[tokio::test]
async fn test_miss_round_trip_and_aggregates() {
    let Some(db) = TestDatabase::create().await else {
        return;
    };
    let sink = PgMissSink::new(db.pool.clone());

    let mut old = MissRecord::new("старый запрос", Language::Ru, None, "bot");
    old.timestamp = Utc::now() - Duration::days(10);
    sink.append(&old).await.unwrap();
    sink.append(&MissRecord::new("кирпич", Language::Ru, Some(7), "api"))
        .await
        .unwrap();
    sink.append(&MissRecord::new("кирпич", Language::Ru, Some(8), "api"))
        .await
        .unwrap();
    sink.append(&MissRecord::new("qwertyuiop", Language::Uz, None, "cli"))
        .await
        .unwrap();

    let stats = sink.stats(2).await.unwrap();

    assert_eq!(stats.total, 4);
    // The ten day old record falls outside the window
    assert_eq!(stats.last_7_days, 3);

    assert_eq!(stats.by_language.len(), 2);
    assert_eq!(stats.by_language[0].language, "ru");
    assert_eq!(stats.by_language[0].count, 3);
    assert_eq!(stats.by_language[1].language, "uz");

    // Only queries seen more than once are listed
    assert_eq!(stats.top_queries.len(), 1);
    assert_eq!(stats.top_queries[0].query, "кирпич");
    assert_eq!(stats.top_queries[0].count, 2);

    assert_eq!(stats.recent.len(), 2);
    assert_eq!(stats.recent[0].query_text, "qwertyuiop");
    assert_eq!(stats.recent[0].language, Language::Uz);
    assert_eq!(stats.recent[0].source, "cli");
    assert_eq!(stats.recent[1].user_id, Some(8));

    db.drop_schema().await;
}

#[tokio::test]
async fn test_other_language_codes_are_stored() {
    let Some(db) = TestDatabase::create().await else {
        return;
    };
    let sink = PgMissSink::new(db.pool.clone());

    sink.append(&MissRecord::new("шай", Language::Other("kaz".to_string()), None, "api"))
        .await
        .unwrap();

    let stats = sink.stats(5).await.unwrap();
    assert_eq!(stats.recent[0].language, Language::Other("kaz".to_string()));

    db.drop_schema().await;
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let Some(db) = TestDatabase::create().await else {
        return;
    };

    run_migrations(&db.pool).await.unwrap();
    let stats = PgMissSink::new(db.pool.clone()).stats(5).await.unwrap();
    assert_eq!(stats.total, 0);

    db.drop_schema().await;
}
