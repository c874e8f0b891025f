use std::sync::Arc;

use crate::{
    comments::{CommentService, CommentableRegistry},
    config::{AuthConfig, Config},
    infrastructure::{middleware::HasAuthConfig, Database},
};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub registry: Arc<CommentableRegistry>,
    pub comments: CommentService,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, registry: CommentableRegistry, config: Config) -> Self {
        let registry = Arc::new(registry);
        Self {
            comments: CommentService::new(db.clone(), Arc::clone(&registry)),
            db,
            registry,
            config: Arc::new(config),
        }
    }
}

impl HasAuthConfig for AppState {
    fn auth_config(&self) -> &AuthConfig {
        &self.config.auth
    }
}
