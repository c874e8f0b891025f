use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::comments::model::{Comment, OwnerRef};
use crate::core::{CommentId, Timestamp, UserId};
use crate::error::{AppError, AppResult};
use crate::infrastructure::Database;

const COMMENT_COLUMNS: &str =
    "id, content, is_public, author_id, owner_type, owner_key, created_at, updated_at";

/// Fields bound at creation; none of them change afterwards except
/// `content` and `is_public`.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub is_public: bool,
    pub author: UserId,
    pub owner: OwnerRef,
}

/// Persistence seam for comments.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: NewComment) -> AppResult<Comment>;
    async fn get(&self, id: CommentId) -> AppResult<Option<Comment>>;
    /// Writes `is_public` (and `updated_at`) only.
    async fn update_visibility(&self, id: CommentId, is_public: bool) -> AppResult<Comment>;
    /// Writes `content`, `is_public` (and `updated_at`) only.
    async fn update_content(
        &self,
        id: CommentId,
        content: &str,
        is_public: bool,
    ) -> AppResult<Comment>;
    async fn delete(&self, id: CommentId) -> AppResult<bool>;
    /// Public comments on `owner` plus the viewer's own, most recently updated first.
    async fn list_visible(
        &self,
        owner: &OwnerRef,
        viewer: Option<UserId>,
    ) -> AppResult<Vec<Comment>>;
}

pub struct SqliteCommentRepository {
    db: Database,
}

impl SqliteCommentRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn fetch(&self, id: CommentId) -> AppResult<Comment> {
        self.get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", id)))
    }
}

fn comment_from_row(row: &SqliteRow) -> AppResult<Comment> {
    let raw_id: String = row.try_get("id")?;
    let id = Uuid::parse_str(&raw_id)
        .map(CommentId)
        .map_err(|e| AppError::DatabaseError(format!("Corrupt comment id '{}': {}", raw_id, e)))?;

    Ok(Comment {
        id,
        content: row.try_get("content")?,
        is_public: row.try_get("is_public")?,
        author: UserId(row.try_get("author_id")?),
        owner_type: row.try_get("owner_type")?,
        owner_key: row.try_get("owner_key")?,
        created_at: Timestamp(row.try_get("created_at")?).to_datetime()?,
        updated_at: Timestamp(row.try_get("updated_at")?).to_datetime()?,
    })
}

#[async_trait]
impl CommentRepository for SqliteCommentRepository {
    async fn insert(&self, comment: NewComment) -> AppResult<Comment> {
        let id = CommentId::new();
        let now = Timestamp::now();

        sqlx::query(
            "INSERT INTO comments \
             (id, content, is_public, author_id, owner_type, owner_key, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&comment.content)
        .bind(comment.is_public)
        .bind(comment.author.value())
        .bind(&comment.owner.owner_type)
        .bind(comment.owner.key.encode())
        .bind(now.value())
        .bind(now.value())
        .execute(self.db.pool())
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert comment: {}", e)))?;

        tracing::info!(
            "Comment {} created by user {} on {}:{}",
            id,
            comment.author,
            comment.owner.owner_type,
            comment.owner.key
        );
        self.fetch(id).await
    }

    async fn get(&self, id: CommentId) -> AppResult<Option<Comment>> {
        let row = sqlx::query(&format!("SELECT {} FROM comments WHERE id = ?", COMMENT_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get comment {}: {}", id, e)))?;

        row.as_ref().map(comment_from_row).transpose()
    }

    async fn update_visibility(&self, id: CommentId, is_public: bool) -> AppResult<Comment> {
        let result = sqlx::query("UPDATE comments SET is_public = ?, updated_at = ? WHERE id = ?")
            .bind(is_public)
            .bind(Timestamp::now().value())
            .bind(id.to_string())
            .execute(self.db.pool())
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to update comment {}: {}", id, e))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Comment {} not found", id)));
        }
        self.fetch(id).await
    }

    async fn update_content(
        &self,
        id: CommentId,
        content: &str,
        is_public: bool,
    ) -> AppResult<Comment> {
        let result = sqlx::query(
            "UPDATE comments SET content = ?, is_public = ?, updated_at = ? WHERE id = ?",
        )
        .bind(content)
        .bind(is_public)
        .bind(Timestamp::now().value())
        .bind(id.to_string())
        .execute(self.db.pool())
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update comment {}: {}", id, e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Comment {} not found", id)));
        }
        self.fetch(id).await
    }

    async fn delete(&self, id: CommentId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id.to_string())
            .execute(self.db.pool())
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to delete comment {}: {}", id, e))
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_visible(
        &self,
        owner: &OwnerRef,
        viewer: Option<UserId>,
    ) -> AppResult<Vec<Comment>> {
        // `author_id = NULL` never matches, so anonymous viewers only see public rows.
        let rows = sqlx::query(&format!(
            "SELECT {} FROM comments \
             WHERE owner_type = ? AND owner_key = ? AND (is_public = 1 OR author_id = ?) \
             ORDER BY updated_at DESC, created_at DESC, rowid DESC",
            COMMENT_COLUMNS
        ))
        .bind(&owner.owner_type)
        .bind(owner.key.encode())
        .bind(viewer.map(UserId::value))
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!(
                "Failed to list comments for {}:{}: {}",
                owner.owner_type, owner.key, e
            ))
        })?;

        rows.iter().map(comment_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::identifier::OwnerKey;
    use std::time::Duration;

    fn sentinel(id: i64) -> OwnerRef {
        OwnerRef {
            owner_type: "sentinel".into(),
            key: OwnerKey::Integer(id),
        }
    }

    fn new_comment(content: &str, is_public: bool, author: i64, owner: OwnerRef) -> NewComment {
        NewComment {
            content: content.into(),
            is_public,
            author: UserId(author),
            owner,
        }
    }

    async fn repo() -> SqliteCommentRepository {
        SqliteCommentRepository::new(Database::new_in_memory().await.unwrap())
    }

    async fn visible_ids(repo: &SqliteCommentRepository, owner: &OwnerRef) -> Vec<CommentId> {
        repo.list_visible(owner, None)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect()
    }

    /// Public comment on sentinel 1 with explicit timestamps.
    async fn insert_at(
        repo: &SqliteCommentRepository,
        created_at: i64,
        updated_at: i64,
    ) -> CommentId {
        let id = CommentId::new();
        sqlx::query(
            "INSERT INTO comments \
             (id, content, is_public, author_id, owner_type, owner_key, created_at, updated_at) \
             VALUES (?, 'x', 1, 1, 'sentinel', '1', ?, ?)",
        )
        .bind(id.to_string())
        .bind(created_at)
        .bind(updated_at)
        .execute(repo.db.pool())
        .await
        .unwrap();
        id
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = repo().await;
        let created = repo
            .insert(new_comment("Lorem ipsum", false, 1, sentinel(1)))
            .await
            .unwrap();

        let loaded = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.owner_type, "sentinel");
        assert_eq!(loaded.owner_key, "1");
        assert!(!loaded.is_public);
        assert_eq!(loaded.created_at, loaded.updated_at);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let repo = repo().await;
        assert!(repo.get(CommentId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_visible_filters_private_comments_of_others() {
        let repo = repo().await;
        let owner = sentinel(1);
        let mine_private = repo.insert(new_comment("mine", false, 1, owner.clone())).await.unwrap();
        let theirs_public = repo
            .insert(new_comment("public", true, 2, owner.clone()))
            .await
            .unwrap();
        let theirs_private = repo
            .insert(new_comment("hidden", false, 2, owner.clone()))
            .await
            .unwrap();
        repo.insert(new_comment("elsewhere", true, 1, sentinel(2))).await.unwrap();

        let anonymous: Vec<CommentId> = repo
            .list_visible(&owner, None)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(anonymous, vec![theirs_public.id]);

        let as_one: Vec<CommentId> = repo
            .list_visible(&owner, Some(UserId(1)))
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(as_one, vec![theirs_public.id, mine_private.id]);

        let as_two = repo.list_visible(&owner, Some(UserId(2))).await.unwrap();
        assert_eq!(as_two.len(), 2);
        assert!(as_two.iter().any(|c| c.id == theirs_private.id));
    }

    #[tokio::test]
    async fn test_list_orders_by_most_recently_updated() {
        let repo = repo().await;
        let owner = sentinel(1);
        let first = repo.insert(new_comment("first", true, 1, owner.clone())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        let second = repo.insert(new_comment("second", true, 1, owner.clone())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        let third = repo.insert(new_comment("third", true, 1, owner.clone())).await.unwrap();

        assert_eq!(visible_ids(&repo, &owner).await, vec![third.id, second.id, first.id]);

        tokio::time::sleep(Duration::from_millis(2)).await;
        repo.update_content(first.id, "first, edited", true).await.unwrap();

        assert_eq!(visible_ids(&repo, &owner).await, vec![first.id, third.id, second.id]);
    }

    #[tokio::test]
    async fn test_equal_updates_fall_back_to_most_recently_created() {
        let repo = repo().await;
        let updated_at = 5_000_000;
        let oldest = insert_at(&repo, 1_000_000, updated_at).await;
        let newest = insert_at(&repo, 3_000_000, updated_at).await;
        let middle = insert_at(&repo, 2_000_000, updated_at).await;
        let newest_again = insert_at(&repo, 3_000_000, updated_at).await;
        let touched_later = insert_at(&repo, 500_000, updated_at + 1).await;

        assert_eq!(
            visible_ids(&repo, &sentinel(1)).await,
            vec![touched_later, newest_again, newest, middle, oldest]
        );
    }

    #[tokio::test]
    async fn test_slug_and_integer_owners_do_not_collide() {
        let repo = repo().await;
        let numeric_slug = OwnerRef {
            owner_type: "sentinel_slugged".into(),
            key: OwnerKey::Slug("1".into()),
        };
        repo.insert(new_comment("on slug", true, 1, numeric_slug.clone())).await.unwrap();

        assert!(repo.list_visible(&sentinel(1), None).await.unwrap().is_empty());
        assert_eq!(repo.list_visible(&numeric_slug, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_partial_updates() {
        let repo = repo().await;
        let created = repo.insert(new_comment("original", false, 1, sentinel(1))).await.unwrap();

        tokio::time::sleep(Duration::from_millis(2)).await;
        let toggled = repo.update_visibility(created.id, true).await.unwrap();
        assert!(toggled.is_public);
        assert_eq!(toggled.content, "original");
        assert!(toggled.updated_at > created.updated_at);
        assert_eq!(toggled.created_at, created.created_at);

        let edited = repo.update_content(created.id, "changed", false).await.unwrap();
        assert_eq!(edited.content, "changed");
        assert!(!edited.is_public);
        assert_eq!(edited.author, created.author);
        assert_eq!(edited.owner_key, created.owner_key);

        assert!(matches!(
            repo.update_visibility(CommentId::new(), true).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        let created = repo.insert(new_comment("bye", true, 1, sentinel(1))).await.unwrap();
        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.get(created.id).await.unwrap().is_none());
    }
}
