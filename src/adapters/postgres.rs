//! PostgreSQL embedding store and schema migrations (runtime queries).

use crate::config::toml_config::DatabaseConfig;
use crate::domain::model::{Embedding, EmbeddingRecord};
use crate::domain::ports::EmbeddingStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use sqlx::migrate::{Migrate, Migrator};
use sqlx::{postgres::PgPoolOptions, PgPool};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct PgEmbeddingStore {
    pool: PgPool,
}

impl PgEmbeddingStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections())
            .acquire_timeout(config.connect_timeout())
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Versions of applied migrations, oldest first.
    pub async fn applied_versions(&self) -> Result<Vec<i64>> {
        let mut conn = self.pool.acquire().await?;
        conn.ensure_migrations_table().await?;
        let mut versions: Vec<i64> = conn
            .list_applied_migrations()
            .await?
            .into_iter()
            .map(|m| m.version)
            .collect();
        versions.sort_unstable();
        Ok(versions)
    }

    /// 套用所有尚未執行的 migration
    pub async fn upgrade(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    /// 回滾到指定版本；未指定時只回滾最新一筆
    pub async fn downgrade(&self, target: Option<i64>) -> Result<i64> {
        let target = match target {
            Some(target) => target,
            None => downgrade_target(&self.applied_versions().await?),
        };

        MIGRATOR.undo(&self.pool, target).await?;
        Ok(target)
    }
}

/// Version to revert to so that only the latest applied migration is undone.
pub fn downgrade_target(applied: &[i64]) -> i64 {
    match applied {
        [.., previous, _latest] => *previous,
        _ => 0,
    }
}

const COLUMNS: &str = "id, user_id, embedding, created_at, updated_at";

#[async_trait]
impl EmbeddingStore for PgEmbeddingStore {
    async fn insert(&self, user_id: i32, embedding: &Embedding) -> Result<EmbeddingRecord> {
        let query = format!(
            "INSERT INTO embeddings (user_id, embedding) VALUES ($1, $2) RETURNING {}",
            COLUMNS
        );
        let record = sqlx::query_as::<_, EmbeddingRecord>(&query)
            .bind(user_id)
            .bind(embedding.as_slice())
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    async fn all(&self) -> Result<Vec<EmbeddingRecord>> {
        let query = format!("SELECT {} FROM embeddings ORDER BY id", COLUMNS);
        let records = sqlx::query_as::<_, EmbeddingRecord>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    async fn for_user(&self, user_id: i32) -> Result<Vec<EmbeddingRecord>> {
        let query = format!(
            "SELECT {} FROM embeddings WHERE user_id = $1 ORDER BY id",
            COLUMNS
        );
        let records = sqlx::query_as::<_, EmbeddingRecord>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    async fn delete_for_user(&self, user_id: i32) -> Result<u64> {
        let result = sqlx::query("DELETE FROM embeddings WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
