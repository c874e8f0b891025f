// Sentinels - the two owner kinds that accept comments, one per key scheme

pub mod routes;
pub mod sentinel;
pub mod sentinel_slugged;

pub use routes::sentinel_routes;
pub use sentinel::Sentinel;
pub use sentinel_slugged::{slugify, SentinelSlugged};

use std::sync::Arc;

use crate::{
    comments::{CommentCapability, CommentableRegistryBuilder},
    error::{AppError, AppResult},
};

pub const MAX_TITLE_LENGTH: usize = 50;

pub(crate) fn validate_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(AppError::Validation(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

/// Capabilities handed out by the registry for both sentinel kinds.
#[derive(Debug, Clone)]
pub struct SentinelCapabilities {
    pub sentinel: Arc<CommentCapability<Sentinel>>,
    pub slugged: Arc<CommentCapability<SentinelSlugged>>,
}

pub fn register(builder: &mut CommentableRegistryBuilder) -> AppResult<SentinelCapabilities> {
    Ok(SentinelCapabilities {
        sentinel: builder.register::<Sentinel>()?,
        slugged: builder.register::<SentinelSlugged>()?,
    })
}
