use async_trait::async_trait;
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, Row};

use super::validate_title;
use crate::{
    comments::{Commentable, KeyScheme, OwnerKey},
    error::{AppError, AppResult},
    infrastructure::Database,
};

/// Integer-keyed owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sentinel {
    pub id: i64,
    pub title: String,
}

impl Sentinel {
    fn from_row(row: &SqliteRow) -> AppResult<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
        })
    }

    pub async fn create(db: &Database, title: &str) -> AppResult<Self> {
        validate_title(title)?;
        let result = sqlx::query("INSERT INTO sentinels (title) VALUES (?)")
            .bind(title)
            .execute(db.pool())
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create sentinel: {}", e)))?;

        let sentinel = Self {
            id: result.last_insert_rowid(),
            title: title.to_string(),
        };
        tracing::info!("Created sentinel {} ({})", sentinel.id, sentinel.title);
        Ok(sentinel)
    }

    pub async fn gen_nullable(db: &Database, id: i64) -> AppResult<Option<Self>> {
        let row = sqlx::query("SELECT id, title FROM sentinels WHERE id = ?")
            .bind(id)
            .fetch_optional(db.pool())
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get sentinel {}: {}", id, e)))?;

        row.as_ref().map(Self::from_row).transpose()
    }

    pub async fn gen_enforce(db: &Database, id: i64) -> AppResult<Self> {
        Self::gen_nullable(db, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Sentinel {} not found", id)))
    }

    pub async fn gen_all(db: &Database, limit: i64) -> AppResult<Vec<Self>> {
        let rows = sqlx::query("SELECT id, title FROM sentinels ORDER BY id LIMIT ?")
            .bind(limit)
            .fetch_all(db.pool())
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list sentinels: {}", e)))?;

        rows.iter().map(Self::from_row).collect()
    }

    /// Comments attached to the sentinel are left in place.
    pub async fn delete(db: &Database, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM sentinels WHERE id = ?")
            .bind(id)
            .execute(db.pool())
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to delete sentinel {}: {}", id, e))
            })?;
        Ok(result.rows_affected() > 0)
    }

    pub fn absolute_url(&self) -> String {
        format!("/sentinels/detail/sentinel/{}", self.id)
    }
}

#[async_trait]
impl Commentable for Sentinel {
    const OWNER_TYPE: &'static str = "Sentinel";
    const KEY_SCHEME: KeyScheme = KeyScheme::Integer;

    fn natural_key(&self) -> OwnerKey {
        OwnerKey::Integer(self.id)
    }

    fn title(&self) -> &str {
        &self.title
    }

    async fn find_by_key(db: &Database, key: &OwnerKey) -> AppResult<Option<Self>> {
        match key {
            OwnerKey::Integer(id) => Self::gen_nullable(db, *id).await,
            OwnerKey::Slug(_) => Ok(None),
        }
    }
}
