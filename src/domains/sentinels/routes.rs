// HTTP surface for sentinels: index, detail pages with their comment lists,
// and the per-kind comment submission routes.

use axum::{
    extract::{Path, State},
    routing::{get, MethodRouter},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use super::{Sentinel, SentinelCapabilities, SentinelSlugged};
use crate::{
    app_state::AppState,
    comments::{identifier, views::ListView, CommentCapability, Commentable},
    error::AppResult,
    infrastructure::{middleware::Vc, ViewerContext},
};

const INDEX_LIMIT: i64 = 100;

#[derive(Debug, Serialize)]
pub struct SentinelSummary {
    pub title: String,
    pub url: String,
    pub submission_url: String,
}

#[derive(Debug, Serialize)]
pub struct SentinelIndex {
    pub sentinels: Vec<SentinelSummary>,
    pub slugged: Vec<SentinelSummary>,
}

/// Owner page with the viewer's comment list embedded.
#[derive(Debug, Serialize)]
pub struct DetailView<T: Serialize> {
    pub object: T,
    pub url: String,
    pub comments: ListView,
}

pub fn sentinel_routes(caps: &SentinelCapabilities) -> Router<AppState> {
    let router = Router::new();
    let router = caps.sentinel.submission_route().install(router);
    let router = caps.slugged.submission_route().install(router);

    let index_caps = caps.clone();
    let index = get(move |State(state): State<AppState>| {
        let caps = index_caps.clone();
        async move { sentinel_index(&state, &caps).await }
    });

    router
        .route("/sentinels", index.clone())
        .route("/sentinels/", index)
        .route(
            "/sentinels/detail/sentinel/{id}",
            detail_route(Arc::clone(&caps.sentinel), Sentinel::absolute_url),
        )
        .route(
            "/sentinels/detail/sentinel_slugged/{slug}",
            detail_route(Arc::clone(&caps.slugged), SentinelSlugged::absolute_url),
        )
}

fn detail_route<T>(
    capability: Arc<CommentCapability<T>>,
    url: fn(&T) -> String,
) -> MethodRouter<AppState>
where
    T: Commentable + Serialize,
{
    get(move |State(state): State<AppState>, vc: Vc, Path(key): Path<String>| {
        let capability = Arc::clone(&capability);
        async move { owner_detail(&state, &vc, &capability, &key, url).await }
    })
}

async fn owner_detail<T>(
    state: &AppState,
    vc: &ViewerContext,
    capability: &CommentCapability<T>,
    raw_key: &str,
    url: fn(&T) -> String,
) -> AppResult<Json<DetailView<T>>>
where
    T: Commentable + Serialize,
{
    let owner = identifier::resolve_owner::<T>(&state.db, raw_key).await?;
    let comments = capability.list_comments(state, &owner, vc).await?;
    Ok(Json(DetailView {
        url: url(&owner),
        object: owner,
        comments,
    }))
}

async fn sentinel_index(
    state: &AppState,
    caps: &SentinelCapabilities,
) -> AppResult<Json<SentinelIndex>> {
    let sentinels = Sentinel::gen_all(&state.db, INDEX_LIMIT)
        .await?
        .into_iter()
        .map(|s| SentinelSummary {
            url: s.absolute_url(),
            submission_url: caps.sentinel.submission_url(&s),
            title: s.title,
        })
        .collect();

    let slugged = SentinelSlugged::gen_all(&state.db, INDEX_LIMIT)
        .await?
        .into_iter()
        .map(|s| SentinelSummary {
            url: s.absolute_url(),
            submission_url: caps.slugged.submission_url(&s),
            title: s.title,
        })
        .collect();

    Ok(Json(SentinelIndex { sentinels, slugged }))
}
