use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::Method,
    response::{IntoResponse, Response},
};
use std::collections::BTreeMap;

/// Field name → messages. `__all__` holds errors not tied to one field.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

const REQUIRED: &str = "This field is required.";

/// Raw method + body of a form endpoint. GET renders, POST submits.
#[derive(Debug, Clone)]
pub struct FormRequest {
    pub method: Method,
    pub body: Bytes,
}

impl FormRequest {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            body: Bytes::new(),
        }
    }

    pub fn post(body: impl Into<Bytes>) -> Self {
        Self {
            method: Method::POST,
            body: body.into(),
        }
    }

    pub fn is_submission(&self) -> bool {
        self.method == Method::POST
    }
}

impl<S> FromRequest<S> for FormRequest
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let method = req.method().clone();
        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        Ok(Self { method, body })
    }
}

/// Submitted comment fields, before validation.
#[derive(Debug, Clone, Default)]
pub struct CommentForm {
    pub content: Option<String>,
    pub is_public: Option<String>,
}

/// Validated comment fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentInput {
    pub content: String,
    pub is_public: bool,
}

impl CommentForm {
    /// Repeated keys keep their last value; unknown keys are ignored.
    pub fn from_urlencoded(body: &[u8]) -> Result<Self, FieldErrors> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body).map_err(|e| {
            let mut errors = FieldErrors::new();
            errors.insert("__all__".into(), vec![format!("Malformed submission: {}", e)]);
            errors
        })?;

        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "content" => form.content = Some(value),
                "is_public" => form.is_public = Some(value),
                _ => {}
            }
        }
        Ok(form)
    }

    pub fn validate(&self) -> Result<CommentInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let content = match &self.content {
            Some(content) => content.clone(),
            None => {
                errors.insert("content".into(), vec![REQUIRED.to_string()]);
                String::new()
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CommentInput {
            content,
            is_public: checkbox_value(self.is_public.as_deref()),
        })
    }

    pub fn is_public_checked(&self) -> bool {
        checkbox_value(self.is_public.as_deref())
    }
}

/// HTML checkbox semantics: absent means unchecked.
fn checkbox_value(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("on" | "true" | "1" | "yes")
    )
}

/// Parse and validate a POST body in one go; the parsed form (possibly
/// empty) is returned with the errors so it can be echoed back.
pub fn bind(body: &[u8]) -> (CommentForm, Result<CommentInput, FieldErrors>) {
    match CommentForm::from_urlencoded(body) {
        Ok(form) => {
            let result = form.validate();
            (form, result)
        }
        Err(errors) => (CommentForm::default(), Err(errors)),
    }
}
