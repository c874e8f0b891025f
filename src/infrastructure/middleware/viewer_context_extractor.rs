// ViewerContext Extractor - hands the request-scoped viewer to handlers

use crate::{error::AppError, infrastructure::viewer::viewer::ViewerContext};
use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

/// Cheap-to-clone handle on the request's `ViewerContext`.
///
/// ```rust,ignore
/// async fn handler(vc: Vc) -> AppResult<CardView> {
///     let principal = vc.require_principal()?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Vc(Arc<ViewerContext>);

impl Vc {
    pub fn new(vc: Arc<ViewerContext>) -> Self {
        Self(vc)
    }

    /// Get the inner Arc<ViewerContext> (rarely needed)
    pub fn arc(self) -> Arc<ViewerContext> {
        self.0
    }
}

impl std::ops::Deref for Vc {
    type Target = ViewerContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<ViewerContext> for Vc {
    fn as_ref(&self) -> &ViewerContext {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Vc
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<ViewerContext>>()
            .map(|vc| Vc(vc.clone()))
            .ok_or_else(|| {
                AppError::Internal(
                    "ViewerContext missing - viewer_context_middleware is not installed"
                        .to_string(),
                )
            })
    }
}
