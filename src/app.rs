// Application assembly: storage, owner registration, shared state and routes

use axum::{middleware, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    app_state::AppState,
    comments::{handlers::comment_routes, model::COMMENTS_PREFIX, CommentableRegistryBuilder},
    config::Config,
    data_seeder,
    domains::sentinels::{self, SentinelCapabilities},
    error::AppResult,
    infrastructure::{middleware::viewer_context_middleware, Database},
};

pub struct Application {
    pub state: AppState,
    pub sentinels: SentinelCapabilities,
    pub router: Router,
}

pub async fn build_application(config: Config) -> AppResult<Application> {
    let db = Database::connect(&config.database).await?;
    db.initialize().await?;

    if config.seed_sample_data {
        data_seeder::seed_sample_data(&db).await?;
    }

    // Every owner type registers before the first request is served.
    let mut builder = CommentableRegistryBuilder::new();
    let sentinels = sentinels::register(&mut builder)?;
    let registry = builder.build();

    let state = AppState::new(db, registry, config);
    let router = create_router(state.clone(), &sentinels);

    Ok(Application {
        state,
        sentinels,
        router,
    })
}

pub fn create_router(state: AppState, sentinels: &SentinelCapabilities) -> Router {
    Router::new()
        .nest(COMMENTS_PREFIX, comment_routes())
        .merge(sentinels::sentinel_routes(sentinels))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            viewer_context_middleware::<AppState>,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
