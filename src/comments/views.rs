// View-models handed to the presentation layer, serialized as JSON

use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::comments::forms::{CommentForm, FieldErrors};
use crate::comments::model::{self, Comment, ResolvedOwner};
use crate::core::UserId;

/// Header a client-side script watches to drop a deleted comment from the page.
pub const DELETE_TRIGGER_HEADER: &str = "hx-trigger";
pub const COMMENT_DELETED_EVENT: &str = "commentDeleted";

#[derive(Debug, Clone, Serialize)]
pub struct CommentUrls {
    pub view: String,
    pub edit: String,
    pub toggle: String,
    pub delete: String,
}

impl CommentUrls {
    pub fn for_comment(comment: &Comment) -> Self {
        Self {
            view: comment.absolute_url(),
            edit: model::edit_url(comment.id),
            toggle: model::toggle_url(comment.id),
            delete: model::delete_url(comment.id),
        }
    }
}

/// Submission form echo. `revert_url` is only set while editing.
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub content: String,
    pub is_public: bool,
    pub submit_url: String,
    pub revert_url: Option<String>,
    pub errors: FieldErrors,
}

impl FormView {
    pub fn empty(submit_url: String) -> Self {
        Self {
            content: String::new(),
            is_public: false,
            submit_url,
            revert_url: None,
            errors: FieldErrors::new(),
        }
    }

    pub fn prefilled(comment: &Comment) -> Self {
        Self {
            content: comment.content.clone(),
            is_public: comment.is_public,
            submit_url: model::edit_url(comment.id),
            revert_url: Some(comment.absolute_url()),
            errors: FieldErrors::new(),
        }
    }

    pub fn rejected(
        form: &CommentForm,
        submit_url: String,
        revert_url: Option<String>,
        errors: FieldErrors,
    ) -> Self {
        Self {
            content: form.content.clone().unwrap_or_default(),
            is_public: form.is_public_checked(),
            submit_url,
            revert_url,
            errors,
        }
    }
}

/// Single-comment render, optionally in edit mode.
#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub comment: Comment,
    pub is_author: bool,
    pub urls: CommentUrls,
    pub form: Option<FormView>,
}

impl CardView {
    pub fn new(comment: Comment, viewer: Option<UserId>) -> Self {
        Self {
            is_author: comment.is_authored_by(viewer),
            urls: CommentUrls::for_comment(&comment),
            comment,
            form: None,
        }
    }

    pub fn with_form(mut self, form: FormView) -> Self {
        self.form = Some(form);
        self
    }
}

/// Comments attached to one owner, as seen by one viewer.
#[derive(Debug, Clone, Serialize)]
pub struct ListView {
    pub head: Option<String>,
    pub comments: Vec<CardView>,
    pub submission_url: String,
}

impl ListView {
    pub fn new(owner: &ResolvedOwner, comments: Vec<Comment>, viewer: Option<UserId>) -> Self {
        Self {
            head: Some(format!("Comments on {}", owner.title)),
            comments: comments.into_iter().map(|c| CardView::new(c, viewer)).collect(),
            submission_url: owner.submission_url.clone(),
        }
    }
}

/// Freshly created comment plus where the next one goes.
#[derive(Debug, Clone, Serialize)]
pub struct InserterView {
    pub inserted: CardView,
    pub form_url: String,
}

/// Result of the create operation: either the (re)displayed form or the insert.
#[derive(Debug, Clone)]
pub enum CreateOutcome {
    Form(FormView),
    Inserted(InserterView),
}

impl IntoResponse for CardView {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

impl IntoResponse for ListView {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

impl IntoResponse for FormView {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

impl IntoResponse for InserterView {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

impl IntoResponse for CreateOutcome {
    fn into_response(self) -> Response {
        match self {
            CreateOutcome::Form(form) => form.into_response(),
            CreateOutcome::Inserted(inserted) => inserted.into_response(),
        }
    }
}

/// Empty 200 carrying the out-of-band deletion signal.
pub fn deleted_response() -> Response {
    (
        StatusCode::OK,
        [(
            HeaderName::from_static(DELETE_TRIGGER_HEADER),
            HeaderValue::from_static(COMMENT_DELETED_EVENT),
        )],
    )
        .into_response()
}
