// src/core/database.rs
//! SQLite persistence: the key-value store and the generation history

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::types::{GenerationKind, GenerationRecord, JobApplication};

/// Storage key for the saved form-field record.
pub const FORM_DATA_KEY: &str = "jobmatch-form-data";
/// Storage key for the generation API key.
pub const API_KEY_STORAGE_KEY: &str = "jobmatch-gemini-api-key";

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database and run migrations.
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() {
                crate::utils::ensure_directory(parent).await?;
            }
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!(
            "Database connection established: {}",
            database_path.display()
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS generations (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                title TEXT NOT NULL,
                company_name TEXT NOT NULL,
                position_title TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_generations_created_at ON generations(created_at);",
        )
        .execute(&self.pool)
        .await?;

        info!("Database migrations completed");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn storage(&self) -> StorageRepository {
        StorageRepository::new(&self.pool)
    }

    pub fn generations(&self) -> GenerationRepository {
        GenerationRepository::new(&self.pool)
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

/// Flat string-to-string records, overwritten or removed only by direct
/// user action.
pub struct StorageRepository {
    pool: SqlitePool,
}

impl StorageRepository {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO storage (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write storage key: {}", key))?;
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM storage WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Failed to read storage key: {}", key))?;
        Ok(value)
    }

    pub async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.map_or(false, |v| !v.is_empty()))
    }

    /// Remove a key, reporting whether anything was stored under it.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM storage WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to remove storage key: {}", key))?;
        Ok(result.rows_affected() > 0)
    }
}

/// Insert/read access to the generation history.
pub struct GenerationRepository {
    pool: SqlitePool,
}

impl GenerationRepository {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn record(
        &self,
        kind: GenerationKind,
        application: &JobApplication,
        content: &str,
    ) -> Result<GenerationRecord> {
        let record = GenerationRecord {
            id: Uuid::new_v4().to_string(),
            kind: kind.as_str().to_string(),
            title: application.title_for(kind),
            company_name: application.company_name.clone(),
            position_title: application.position_title.clone(),
            content: content.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO generations
                (id, kind, title, company_name, position_title, content, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.kind)
        .bind(&record.title)
        .bind(&record.company_name)
        .bind(&record.position_title)
        .bind(&record.content)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to record generation")?;

        Ok(record)
    }

    /// Newest-first listing.
    pub async fn list(&self, limit: u32) -> Result<Vec<GenerationRecord>> {
        let records = sqlx::query_as::<_, GenerationRecord>(
            "SELECT * FROM generations ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list generations")?;
        Ok(records)
    }

    pub async fn get(&self, id: &str) -> Result<Option<GenerationRecord>> {
        let record = sqlx::query_as::<_, GenerationRecord>(
            "SELECT * FROM generations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to read generation: {}", id))?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_database() -> Database {
        let path = std::env::temp_dir().join(format!("jobmatch-test-{}.db", Uuid::new_v4()));
        Database::new(&path).await.unwrap()
    }

    fn application() -> JobApplication {
        JobApplication {
            cv_content: "cv".to_string(),
            company_name: "Acme".to_string(),
            position_title: "Developer".to_string(),
            job_requirements: String::new(),
            job_description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_storage_round_trip() {
        let db = test_database().await;
        let storage = db.storage();

        assert_eq!(storage.get(API_KEY_STORAGE_KEY).await.unwrap(), None);
        assert!(!storage.contains(API_KEY_STORAGE_KEY).await.unwrap());

        storage.set(API_KEY_STORAGE_KEY, "secret").await.unwrap();
        assert_eq!(
            storage.get(API_KEY_STORAGE_KEY).await.unwrap().as_deref(),
            Some("secret")
        );

        // Overwrite, then remove
        storage.set(API_KEY_STORAGE_KEY, "rotated").await.unwrap();
        assert_eq!(
            storage.get(API_KEY_STORAGE_KEY).await.unwrap().as_deref(),
            Some("rotated")
        );
        assert!(storage.remove(API_KEY_STORAGE_KEY).await.unwrap());
        assert!(!storage.remove(API_KEY_STORAGE_KEY).await.unwrap());
    }

    #[tokio::test]
    async fn test_generation_history() {
        let db = test_database().await;
        let generations = db.generations();

        let record = generations
            .record(GenerationKind::CoverLetter, &application(), "Dear Acme,")
            .await
            .unwrap();
        assert_eq!(record.kind, "cover_letter");
        assert_eq!(record.title, "Cover letter for Acme: Developer");

        let listed = generations.list(10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].content, "Dear Acme,");

        let fetched = generations.get(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, record.id);
        assert!(generations.get("missing").await.unwrap().is_none());
    }
}
