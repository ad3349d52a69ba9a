//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::permissions::{PermissionFilter, PgAclFilter};
use crate::resolver::TranslationResolver;
use crate::store::{NodeStore, PgNodeStore};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Page tree storage.
    store: Arc<dyn NodeStore>,

    /// Node visibility checks for navigation.
    permissions: Arc<dyn PermissionFilter>,

    /// Slug and URL resolution over `store`.
    resolver: TranslationResolver,

    /// Language used when none is requested.
    default_language: String,
}

impl AppState {
    /// Connect to PostgreSQL, apply migrations, and wire the Postgres-backed
    /// store and ACL filter.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config)
            .await
            .context("failed to create database pool")?;
        db::run_migrations(&pool).await?;
        info!("database connection established");

        let store: Arc<dyn NodeStore> = Arc::new(PgNodeStore::new(pool.clone()));
        let permissions: Arc<dyn PermissionFilter> = Arc::new(PgAclFilter::new(pool));

        Ok(Self::from_parts(
            store,
            permissions,
            &config.default_language,
        ))
    }

    /// Assemble state from already-built collaborators.
    pub fn from_parts(
        store: Arc<dyn NodeStore>,
        permissions: Arc<dyn PermissionFilter>,
        default_language: &str,
    ) -> Self {
        let resolver = TranslationResolver::new(Arc::clone(&store));
        Self {
            inner: Arc::new(AppStateInner {
                store,
                permissions,
                resolver,
                default_language: default_language.to_string(),
            }),
        }
    }

    /// Get the node store.
    pub fn store(&self) -> &Arc<dyn NodeStore> {
        &self.inner.store
    }

    /// Get the permission filter.
    pub fn permissions(&self) -> &Arc<dyn PermissionFilter> {
        &self.inner.permissions
    }

    /// Get the translation resolver.
    pub fn resolver(&self) -> &TranslationResolver {
        &self.inner.resolver
    }

    /// Get the default language code.
    pub fn default_language(&self) -> &str {
        &self.inner.default_language
    }

    /// Check if the backing store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.inner.store.is_healthy().await
    }
}
