// ViewerContext Middleware - builds the request-scoped viewer from upstream auth headers
// and injects it into request extensions for handlers

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    core::UserId,
    infrastructure::viewer::viewer::{Principal, ViewerContext},
};

/// Authentication information extracted from request
#[derive(Debug, Clone)]
pub struct AuthInfo {
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub is_authenticated: bool,
}

/// Trait for application state that knows how principals are forwarded
pub trait HasAuthConfig {
    fn auth_config(&self) -> &AuthConfig;
}

/// ViewerContext middleware that creates request-scoped viewer context
pub async fn viewer_context_middleware<T>(
    State(app_state): State<T>,
    mut request: Request,
    next: Next,
) -> Response
where
    T: HasAuthConfig + Clone + Send + Sync + 'static,
{
    let auth = app_state.auth_config();
    let auth_info = extract_auth_from_request(request.headers(), auth);

    let request_path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let viewer_context = create_viewer_context(auth_info, request_path, auth.login_url.clone());
    request.extensions_mut().insert(viewer_context);

    next.run(request).await
}

/// Read the principal forwarded by the upstream authentication layer.
/// A missing or malformed header means the request is anonymous.
fn extract_auth_from_request(headers: &HeaderMap, auth: &AuthConfig) -> AuthInfo {
    let user_id = headers
        .get(auth.user_header.as_str())
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| match raw.trim().parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!("Ignoring malformed principal header value '{}'", raw);
                None
            }
        });

    let username = user_id.and_then(|_| {
        headers
            .get(auth.username_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    });

    AuthInfo {
        user_id,
        username,
        is_authenticated: user_id.is_some(),
    }
}

fn create_viewer_context(
    auth_info: AuthInfo,
    request_path: String,
    login_url: String,
) -> Arc<ViewerContext> {
    let request_id = format!("req-{}", Uuid::new_v4());

    let viewer_context = match (auth_info.is_authenticated, auth_info.user_id) {
        (true, Some(id)) => ViewerContext::authenticated(
            Principal {
                id: UserId(id),
                username: auth_info.username,
            },
            request_id,
            request_path,
            login_url,
        ),
        _ => ViewerContext::anonymous(request_id, request_path, login_url),
    };

    Arc::new(viewer_context)
}
