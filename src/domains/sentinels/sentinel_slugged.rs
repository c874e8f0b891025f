use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use super::validate_title;
use crate::{
    comments::{Commentable, KeyScheme, OwnerKey},
    error::{AppError, AppResult},
    infrastructure::Database,
};

static NON_SLUG_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

const FALLBACK_SLUG: &str = "untitled";

/// Lowercase the title and collapse everything outside `[a-z0-9]` into single dashes.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let slug = NON_SLUG_CHARS.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// Slug-keyed owner with a UUID primary key. Comments address it by slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentinelSlugged {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
}

impl SentinelSlugged {
    fn from_row(row: &SqliteRow) -> AppResult<Self> {
        let id: String = row.try_get("id")?;
        Ok(Self {
            id: Uuid::parse_str(&id)
                .map_err(|e| {
                    AppError::DatabaseError(format!("Invalid sentinel id '{}': {}", id, e))
                })?,
            slug: row.try_get("slug")?,
            title: row.try_get("title")?,
        })
    }

    async fn slug_taken(db: &Database, slug: &str) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM sentinels_slugged WHERE slug = ?")
            .bind(slug)
            .fetch_optional(db.pool())
            .await?;
        Ok(row.is_some())
    }

    async fn unique_slug(db: &Database, title: &str) -> AppResult<String> {
        let base = slugify(title);
        let mut candidate = base.clone();
        let mut suffix = 2;
        while Self::slug_taken(db, &candidate).await? {
            candidate = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        Ok(candidate)
    }

    pub async fn create(db: &Database, title: &str) -> AppResult<Self> {
        validate_title(title)?;
        let sentinel = Self {
            id: Uuid::new_v4(),
            slug: Self::unique_slug(db, title).await?,
            title: title.to_string(),
        };

        sqlx::query("INSERT INTO sentinels_slugged (id, slug, title) VALUES (?, ?, ?)")
            .bind(sentinel.id.to_string())
            .bind(&sentinel.slug)
            .bind(&sentinel.title)
            .execute(db.pool())
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to create slugged sentinel: {}", e))
            })?;

        tracing::info!("Created slugged sentinel '{}' ({})", sentinel.slug, sentinel.id);
        Ok(sentinel)
    }

    pub async fn gen_by_slug(db: &Database, slug: &str) -> AppResult<Option<Self>> {
        let row = sqlx::query("SELECT id, slug, title FROM sentinels_slugged WHERE slug = ?")
            .bind(slug)
            .fetch_optional(db.pool())
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to get sentinel '{}': {}", slug, e))
            })?;

        row.as_ref().map(Self::from_row).transpose()
    }

    pub async fn gen_all(db: &Database, limit: i64) -> AppResult<Vec<Self>> {
        let rows =
            sqlx::query("SELECT id, slug, title FROM sentinels_slugged ORDER BY slug LIMIT ?")
            .bind(limit)
            .fetch_all(db.pool())
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to list slugged sentinels: {}", e))
            })?;

        rows.iter().map(Self::from_row).collect()
    }

    pub async fn delete(db: &Database, slug: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM sentinels_slugged WHERE slug = ?")
            .bind(slug)
            .execute(db.pool())
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to delete sentinel '{}': {}", slug, e))
            })?;
        Ok(result.rows_affected() > 0)
    }

    pub fn absolute_url(&self) -> String {
        format!("/sentinels/detail/sentinel_slugged/{}", self.slug)
    }
}

#[async_trait]
impl Commentable for SentinelSlugged {
    const OWNER_TYPE: &'static str = "SentinelSlugged";
    const KEY_SCHEME: KeyScheme = KeyScheme::Slug;

    fn natural_key(&self) -> OwnerKey {
        OwnerKey::Slug(self.slug.clone())
    }

    fn title(&self) -> &str {
        &self.title
    }

    async fn find_by_key(db: &Database, key: &OwnerKey) -> AppResult<Option<Self>> {
        match key {
            OwnerKey::Slug(slug) => Self::gen_by_slug(db, slug).await,
            OwnerKey::Integer(_) => Ok(None),
        }
    }
}
