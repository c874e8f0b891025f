// Commentable Registry - startup-time table of owner types
// Built once through CommentableRegistryBuilder, then immutable and shared
// behind an Arc. Maps each stored owner tag back to a typed resolver.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::comments::capability::{CommentCapability, Commentable};
use crate::comments::identifier::{KeyScheme, OwnerKey};
use crate::comments::model::ResolvedOwner;
use crate::error::{AppError, AppResult};
use crate::infrastructure::Database;

/// Type-erased view of one registered owner type.
#[async_trait]
pub trait OwnerResolver: Send + Sync {
    fn owner_type_name(&self) -> &'static str;
    fn submission_label(&self) -> &str;
    fn key_scheme(&self) -> KeyScheme;
    fn submission_url_for_key(&self, key: &OwnerKey) -> String;
    async fn resolve(&self, db: &Database, key: &OwnerKey) -> AppResult<Option<ResolvedOwner>>;
}

#[async_trait]
impl<T: Commentable> OwnerResolver for CommentCapability<T> {
    fn owner_type_name(&self) -> &'static str {
        T::OWNER_TYPE
    }

    fn submission_label(&self) -> &str {
        CommentCapability::submission_label(self)
    }

    fn key_scheme(&self) -> KeyScheme {
        T::KEY_SCHEME
    }

    fn submission_url_for_key(&self, key: &OwnerKey) -> String {
        CommentCapability::submission_url_for_key(self, key)
    }

    async fn resolve(&self, db: &Database, key: &OwnerKey) -> AppResult<Option<ResolvedOwner>> {
        Ok(T::find_by_key(db, key).await?.map(|owner| self.bind(&owner)))
    }
}

#[derive(Default)]
pub struct CommentableRegistryBuilder {
    resolvers: BTreeMap<String, Arc<dyn OwnerResolver>>,
}

impl CommentableRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register owner type `T`. Fails if its label collides with a type
    /// registered earlier, including `T` itself.
    pub fn register<T: Commentable>(&mut self) -> AppResult<Arc<CommentCapability<T>>> {
        let capability = Arc::new(CommentCapability::<T>::new()?);
        let label = capability.submission_label().to_string();

        if let Some(existing) = self
            .resolvers
            .values()
            .find(|r| r.submission_label() == label)
        {
            return Err(AppError::ConfigurationError(format!(
                "Submission label '{}' for owner type {} is already taken by {}",
                label,
                T::OWNER_TYPE,
                existing.owner_type_name()
            )));
        }

        tracing::info!(
            "Registered commentable owner type {} (tag '{}', label '{}')",
            T::OWNER_TYPE,
            capability.owner_tag(),
            label
        );
        self.resolvers.insert(
            capability.owner_tag().to_string(),
            capability.clone() as Arc<dyn OwnerResolver>,
        );
        Ok(capability)
    }

    pub fn build(self) -> CommentableRegistry {
        CommentableRegistry {
            resolvers: self.resolvers,
        }
    }
}

/// Immutable owner-type table, shared across requests.
pub struct CommentableRegistry {
    resolvers: BTreeMap<String, Arc<dyn OwnerResolver>>,
}

impl CommentableRegistry {
    fn resolver(&self, owner_type: &str) -> AppResult<&Arc<dyn OwnerResolver>> {
        self.resolvers.get(owner_type).ok_or_else(|| {
            AppError::ConfigurationError(format!(
                "Owner type '{}' is not registered as commentable",
                owner_type
            ))
        })
    }

    pub fn owner_types(&self) -> Vec<&str> {
        self.resolvers.keys().map(String::as_str).collect()
    }

    pub fn submission_labels(&self) -> Vec<&str> {
        self.resolvers.values().map(|r| r.submission_label()).collect()
    }

    /// Decode a stored `(owner_type, owner_key)` pair and load the live
    /// owner. A missing owner is an error, never an empty result.
    pub async fn resolve(
        &self,
        db: &Database,
        owner_type: &str,
        stored_key: &str,
    ) -> AppResult<ResolvedOwner> {
        let resolver = self.resolver(owner_type)?;
        let key = resolver.key_scheme().decode(stored_key)?;
        resolver.resolve(db, &key).await?.ok_or_else(|| {
            AppError::NotFound(format!("Comment owner {}:{} no longer exists", owner_type, key))
        })
    }

    /// Path of the submission route named `label` for `key`.
    pub fn reverse(&self, label: &str, key: &OwnerKey) -> AppResult<String> {
        let resolver = self
            .resolvers
            .values()
            .find(|r| r.submission_label() == label)
            .ok_or_else(|| {
                AppError::ConfigurationError(format!("No submission route named '{}'", label))
            })?;

        if resolver.key_scheme() != key.scheme() {
            return Err(AppError::ConfigurationError(format!(
                "Route '{}' takes {:?} keys, got {:?}",
                label,
                resolver.key_scheme(),
                key.scheme()
            )));
        }
        Ok(resolver.submission_url_for_key(key))
    }
}
