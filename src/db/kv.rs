use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use sqlx::SqlitePool;

use crate::error::AppError;

pub async fn read_raw(db: &SqlitePool, key: &str) -> Result<Option<String>, AppError> {
    let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;
    Ok(value)
}

/// Last value written under `key`, or `default` when nothing was written yet.
pub async fn read<T: DeserializeOwned>(db: &SqlitePool, key: &str, default: T) -> Result<T, AppError> {
    match read_raw(db, key).await? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(default),
    }
}

pub async fn write<T: Serialize + ?Sized>(db: &SqlitePool, key: &str, value: &T) -> Result<(), AppError> {
    let raw = serde_json::to_string(value)?;
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO kv_store (key, value, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(raw)
    .bind(now)
    .execute(db)
    .await?;

    Ok(())
}
