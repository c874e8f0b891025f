// Commentable Capability - what an owner type gains by implementing Commentable
// and registering once at startup. Label, route, URL and owner lookup derive
// from the type's name and key scheme; comment behavior lives in CommentService
// and is shared by every owner type.

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    routing::{get, MethodRouter},
    Router,
};
use heck::ToSnakeCase;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{marker::PhantomData, sync::Arc};

use crate::{
    app_state::AppState,
    comments::{
        forms::FormRequest,
        identifier::{self, KeyScheme, OwnerKey},
        model::{OwnerRef, ResolvedOwner},
        views::{CreateOutcome, ListView},
    },
    error::{AppError, AppResult},
    infrastructure::{middleware::Vc, Database, ViewerContext},
};

static OWNER_TYPE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").expect("valid owner type regex"));

/// Contract an owner entity fulfils to accept comments.
#[async_trait]
pub trait Commentable: Send + Sync + Sized + 'static {
    /// CamelCase type name; the owner tag, label and route derive from it.
    const OWNER_TYPE: &'static str;
    const KEY_SCHEME: KeyScheme;

    fn natural_key(&self) -> OwnerKey;

    fn title(&self) -> &str;

    async fn find_by_key(db: &Database, key: &OwnerKey) -> AppResult<Option<Self>>;
}

/// `Sentinel` → `sentinel`, `SentinelSlugged` → `sentinel_slugged`.
pub fn owner_tag_for(type_name: &str) -> AppResult<String> {
    if !OWNER_TYPE_NAME.is_match(type_name) {
        return Err(AppError::ConfigurationError(format!(
            "Owner type name '{}' must be a non-empty CamelCase identifier",
            type_name
        )));
    }
    Ok(type_name.to_snake_case())
}

pub fn submission_label_for(owner_tag: &str) -> String {
    format!("add_comment_to_{}", owner_tag)
}

/// Route descriptor for one owner type's submission endpoint. The caller
/// installs it into the application router.
pub struct SubmissionRoute {
    pub name: String,
    pub path: String,
    method_router: MethodRouter<AppState>,
}

impl SubmissionRoute {
    pub fn install(self, router: Router<AppState>) -> Router<AppState> {
        tracing::info!("Installing route '{}' at {}", self.name, self.path);
        router.route(&self.path, self.method_router)
    }
}

/// Per-type commenting behavior, computed once and shared by all instances.
pub struct CommentCapability<T: Commentable> {
    owner_tag: String,
    submission_label: String,
    _owner: PhantomData<fn() -> T>,
}

impl<T: Commentable> std::fmt::Debug for CommentCapability<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentCapability")
            .field("owner_type", &T::OWNER_TYPE)
            .field("owner_tag", &self.owner_tag)
            .field("submission_label", &self.submission_label)
            .finish()
    }
}

impl<T: Commentable> CommentCapability<T> {
    /// Only the registry builds capabilities, so every one of them is
    /// known to be collision-free.
    pub(crate) fn new() -> AppResult<Self> {
        let owner_tag = owner_tag_for(T::OWNER_TYPE)?;
        let submission_label = submission_label_for(&owner_tag);
        Ok(Self {
            owner_tag,
            submission_label,
            _owner: PhantomData,
        })
    }

    pub fn owner_tag(&self) -> &str {
        &self.owner_tag
    }

    pub fn submission_label(&self) -> &str {
        &self.submission_label
    }

    pub fn route_path(&self, path_token: &str) -> String {
        format!("/{}/add_comment/{}", self.owner_tag, path_token)
    }

    pub fn submission_url_for_key(&self, key: &OwnerKey) -> String {
        self.route_path(&key.to_string())
    }

    pub fn submission_url(&self, owner: &T) -> String {
        self.submission_url_for_key(&owner.natural_key())
    }

    pub fn owner_ref(&self, owner: &T) -> OwnerRef {
        OwnerRef {
            owner_type: self.owner_tag.clone(),
            key: owner.natural_key(),
        }
    }

    /// Erase the concrete owner type for the shared comment operations.
    pub fn bind(&self, owner: &T) -> ResolvedOwner {
        ResolvedOwner {
            owner: self.owner_ref(owner),
            title: owner.title().to_string(),
            submission_url: self.submission_url(owner),
        }
    }

    pub fn register_submission_route(
        &self,
        path_token: &str,
        handler: MethodRouter<AppState>,
    ) -> SubmissionRoute {
        SubmissionRoute {
            name: self.submission_label.clone(),
            path: self.route_path(path_token),
            method_router: handler,
        }
    }

    /// The standard submission route: GET renders the empty form, POST creates.
    pub fn submission_route(self: &Arc<Self>) -> SubmissionRoute {
        let capability = Arc::clone(self);
        let handler = move |State(state): State<AppState>,
                            vc: Vc,
                            Path(key): Path<String>,
                            request: FormRequest| {
            let capability = Arc::clone(&capability);
            async move { capability.dispatch_submission(&state, &vc, &request, &key).await }
        };
        self.register_submission_route(
            T::KEY_SCHEME.path_token(),
            get(handler.clone()).post(handler),
        )
    }

    /// Resolve the owner from the captured key, then hand over to the shared
    /// create operation with that owner bound.
    pub async fn dispatch_submission(
        &self,
        state: &AppState,
        vc: &ViewerContext,
        request: &FormRequest,
        raw_key: &str,
    ) -> AppResult<CreateOutcome> {
        let owner = identifier::resolve_owner::<T>(&state.db, raw_key).await?;
        let bound = self.bind(&owner);
        state.comments.create(vc, &bound, request).await
    }

    /// The owner's comment collection as seen by `vc`.
    pub async fn list_comments(
        &self,
        state: &AppState,
        owner: &T,
        vc: &ViewerContext,
    ) -> AppResult<ListView> {
        state.comments.list(&self.bind(owner), vc).await
    }
}
