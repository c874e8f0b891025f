// Identifier Resolver - key schemes, path tokens and owner lookup by natural key
// Stored keys always decode through the scheme registered for their owner tag,
// so a slug such as "1" stays a slug.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::comments::capability::Commentable;
use crate::error::{AppError, AppResult};
use crate::infrastructure::Database;

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid slug regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyScheme {
    /// Non-negative integer surrogate key.
    Integer,
    /// URL slug (`[-a-zA-Z0-9_]+`), typically paired with a UUID primary key.
    Slug,
}

impl KeyScheme {
    /// Path capture for this scheme, in axum route syntax.
    pub fn path_token(self) -> &'static str {
        match self {
            KeyScheme::Integer => "{id}",
            KeyScheme::Slug => "{slug}",
        }
    }

    /// Validate a raw segment against the scheme. `None` means the segment
    /// cannot name an owner of this kind.
    pub fn parse(self, raw: &str) -> Option<OwnerKey> {
        match self {
            KeyScheme::Integer => {
                if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                raw.parse::<i64>().ok().map(OwnerKey::Integer)
            }
            KeyScheme::Slug => SLUG_PATTERN
                .is_match(raw)
                .then(|| OwnerKey::Slug(raw.to_string())),
        }
    }

    /// Decode a value read back from the `owner_key` column.
    pub fn decode(self, stored: &str) -> AppResult<OwnerKey> {
        self.parse(stored).ok_or_else(|| {
            AppError::DatabaseError(format!(
                "Stored owner key '{}' is not a valid {:?} key",
                stored, self
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum OwnerKey {
    Integer(i64),
    Slug(String),
}

impl OwnerKey {
    pub fn scheme(&self) -> KeyScheme {
        match self {
            OwnerKey::Integer(_) => KeyScheme::Integer,
            OwnerKey::Slug(_) => KeyScheme::Slug,
        }
    }

    /// Column representation; decimal for integers, verbatim for slugs.
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerKey::Integer(id) => write!(f, "{}", id),
            OwnerKey::Slug(slug) => f.write_str(slug),
        }
    }
}

/// Resolve a captured path segment to a concrete owner of type `T`.
pub async fn resolve_owner<T: Commentable>(db: &Database, raw: &str) -> AppResult<T> {
    let key = T::KEY_SCHEME.parse(raw).ok_or_else(|| {
        AppError::NotFound(format!("'{}' is not a valid {} key", raw, T::OWNER_TYPE))
    })?;

    tracing::debug!("Resolving {} with key {}", T::OWNER_TYPE, key);
    T::find_by_key(db, &key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No {} matches key '{}'", T::OWNER_TYPE, key)))
}
