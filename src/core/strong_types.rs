// Strong Types - newtypes for the identifiers that cross module boundaries
// Keeps comment ids, principals and timestamps from being mixed up with raw integers/strings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Opaque comment identifier, generated once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub Uuid);

impl CommentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a path segment. Anything that is not a UUID simply does not
    /// name a comment.
    pub fn parse(raw: &str) -> AppResult<Self> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| AppError::NotFound(format!("No comment matches id '{}'", raw)))
    }
}

impl Default for CommentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Identifier of an authenticated principal, as asserted by the upstream auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Storage timestamp: microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_micros())
    }

    pub fn value(self) -> i64 {
        self.0
    }

    pub fn to_datetime(self) -> AppResult<DateTime<Utc>> {
        DateTime::from_timestamp_micros(self.0)
            .ok_or_else(|| AppError::DatabaseError(format!("Timestamp {} out of range", self.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_id_parse() {
        let id = CommentId::new();
        assert_eq!(CommentId::parse(&id.to_string()).unwrap(), id);
        assert!(matches!(CommentId::parse("not-a-uuid"), Err(AppError::NotFound(_))));
        assert!(matches!(CommentId::parse("42"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_timestamp_roundtrip_to_datetime() {
        let now = Timestamp::now();
        let dt = now.to_datetime().unwrap();
        assert_eq!(dt.timestamp_micros(), now.value());
    }
}
