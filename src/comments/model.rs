// Comment - generic association to any registered owner type
// The owner is referenced by (owner_type, owner_key) rather than a typed foreign key,
// so owner modules depend on comments and never the other way around.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::comments::identifier::OwnerKey;
use crate::comments::registry::CommentableRegistry;
use crate::core::{CommentId, UserId};
use crate::error::AppResult;
use crate::infrastructure::Database;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub is_public: bool,
    #[serde(rename = "author_id")]
    pub author: UserId,
    pub owner_type: String,
    pub owner_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_authored_by(&self, user: Option<UserId>) -> bool {
        user == Some(self.author)
    }

    /// Resolve the owner on demand. Nothing is cached, so an owner deleted
    /// since the comment was written surfaces as an error here.
    pub async fn owner(
        &self,
        registry: &CommentableRegistry,
        db: &Database,
    ) -> AppResult<ResolvedOwner> {
        registry.resolve(db, &self.owner_type, &self.owner_key).await
    }

    pub fn absolute_url(&self) -> String {
        view_url(self.id)
    }
}

/// Typed reference to an owner, after the tag's key scheme has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OwnerRef {
    pub owner_type: String,
    pub key: OwnerKey,
}

/// A live owner, type-erased to what the comment handlers need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedOwner {
    pub owner: OwnerRef,
    pub title: String,
    pub submission_url: String,
}

pub const COMMENTS_PREFIX: &str = "/comments";

pub fn view_url(id: CommentId) -> String {
    format!("{}/view/{}", COMMENTS_PREFIX, id)
}

pub fn edit_url(id: CommentId) -> String {
    format!("{}/edit/{}", COMMENTS_PREFIX, id)
}

pub fn toggle_url(id: CommentId) -> String {
    format!("{}/toggle/{}", COMMENTS_PREFIX, id)
}

pub fn delete_url(id: CommentId) -> String {
    format!("{}/delete/{}", COMMENTS_PREFIX, id)
}
