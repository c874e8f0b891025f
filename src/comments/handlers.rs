// HTTP handlers for the per-comment routes, mounted under /comments

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Router,
};

use crate::{
    app_state::AppState,
    comments::{
        forms::FormRequest,
        views::{self, CardView},
    },
    error::AppResult,
    infrastructure::middleware::Vc,
};

pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route("/view/{id}", get(view_comment))
        .route("/edit/{id}", get(edit_comment).post(edit_comment))
        .route("/toggle/{id}", get(toggle_comment).post(toggle_comment))
        .route("/delete/{id}", delete(delete_comment).fallback(delete_wrong_method))
}

async fn view_comment(
    State(state): State<AppState>,
    vc: Vc,
    Path(id): Path<String>,
) -> AppResult<CardView> {
    state.comments.view(&vc, &id).await
}

async fn toggle_comment(
    State(state): State<AppState>,
    vc: Vc,
    Path(id): Path<String>,
) -> AppResult<CardView> {
    state.comments.toggle_visibility(&vc, &id).await
}

async fn edit_comment(
    State(state): State<AppState>,
    vc: Vc,
    Path(id): Path<String>,
    request: FormRequest,
) -> AppResult<CardView> {
    state.comments.edit(&vc, &id, &request).await
}

async fn delete_comment(
    State(state): State<AppState>,
    vc: Vc,
    Path(id): Path<String>,
) -> AppResult<Response> {
    state.comments.delete(&vc, &id).await?;
    Ok(views::deleted_response())
}

/// Login is checked before the verb, so anonymous callers are sent to log in.
async fn delete_wrong_method(vc: Vc) -> AppResult<Response> {
    vc.require_principal()?;
    Ok((StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "DELETE")]).into_response())
}
