use crate::database::connection::DbPool;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Application-level key/value configuration (provider connection state,
/// feature switches). Writes go through a single-statement upsert so
/// concurrent writers never interleave a read-then-write race.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AppConfig {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

impl AppConfig {
    pub async fn get(pool: &DbPool, key: &str) -> Result<Option<String>, sqlx::Error> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM app_config WHERE key = $1")
                .bind(key)
                .fetch_optional(pool)
                .await?;

        Ok(value)
    }

    pub async fn set(pool: &DbPool, key: &str, value: &str) -> Result<Self, sqlx::Error> {
        let config = sqlx::query_as::<_, AppConfig>(
            "INSERT INTO app_config (key, value, updated_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
             RETURNING *",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(config)
    }
}
