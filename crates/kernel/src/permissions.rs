//! Node permission filtering.
//!
//! Navigation and menus never decide visibility themselves: they hand a node
//! set to a [`PermissionFilter`] together with the actor and the permission
//! being checked, and keep whatever comes back.
//!
//! A node without any ACL entries is public. Once a node has entries for a
//! permission, only actors carrying one of the listed roles pass.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Actor, Node, Permission};

/// Access control entries for one node: permission -> allowed roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeAcl {
    entries: HashMap<Permission, HashSet<String>>,
}

impl NodeAcl {
    /// Grant a permission to a role.
    pub fn grant(&mut self, role: &str, permission: Permission) {
        self.entries
            .entry(permission)
            .or_default()
            .insert(role.to_string());
    }

    /// Check whether an actor may exercise a permission.
    pub fn allows(&self, actor: &Actor, permission: Permission) -> bool {
        if actor.is_admin {
            return true;
        }
        match self.entries.get(&permission) {
            Some(roles) => actor.roles.iter().any(|r| roles.contains(r)),
            None => true,
        }
    }
}

/// Decides which nodes an actor may see.
#[async_trait]
pub trait PermissionFilter: Send + Sync {
    /// Return the subset of `nodes` the actor holds `permission` on,
    /// preserving input order.
    async fn filter_visible(
        &self,
        nodes: Vec<Node>,
        actor: &Actor,
        permission: Permission,
    ) -> Result<Vec<Node>>;
}

/// Filter that lets every node through.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl PermissionFilter for AllowAll {
    async fn filter_visible(
        &self,
        nodes: Vec<Node>,
        _actor: &Actor,
        _permission: Permission,
    ) -> Result<Vec<Node>> {
        Ok(nodes)
    }
}

/// In-memory role-based ACL.
#[derive(Debug, Default)]
pub struct RoleAcl {
    acls: RwLock<HashMap<Uuid, NodeAcl>>,
}

impl RoleAcl {
    /// Create an empty ACL (every node public).
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a permission on a node to a role.
    pub fn grant(&self, node_id: Uuid, role: &str, permission: Permission) {
        self.acls
            .write()
            .entry(node_id)
            .or_default()
            .grant(role, permission);
    }

    /// Drop every entry for a node, making it public again.
    pub fn clear(&self, node_id: Uuid) {
        self.acls.write().remove(&node_id);
    }
}

#[async_trait]
impl PermissionFilter for RoleAcl {
    async fn filter_visible(
        &self,
        nodes: Vec<Node>,
        actor: &Actor,
        permission: Permission,
    ) -> Result<Vec<Node>> {
        let acls = self.acls.read();
        Ok(nodes
            .into_iter()
            .filter(|n| acls.get(&n.id).is_none_or(|acl| acl.allows(actor, permission)))
            .collect())
    }
}

/// ACL filter backed by the `node_acl` table with a DashMap cache.
#[derive(Clone)]
pub struct PgAclFilter {
    inner: Arc<PgAclFilterInner>,
}

struct PgAclFilterInner {
    /// Cache of node_id -> ACL entries.
    cache: DashMap<Uuid, NodeAcl>,

    /// Database pool for cache misses.
    pool: PgPool,
}

impl PgAclFilter {
    /// Create a new ACL filter.
    pub fn new(pool: PgPool) -> Self {
        Self {
            inner: Arc::new(PgAclFilterInner {
                cache: DashMap::new(),
                pool,
            }),
        }
    }

    /// Load ACLs for nodes missing from the cache.
    async fn load_missing(&self, node_ids: &[Uuid]) -> Result<()> {
        let missing: Vec<Uuid> = node_ids
            .iter()
            .filter(|id| !self.inner.cache.contains_key(id))
            .copied()
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        debug!(count = missing.len(), "loading node ACLs");
        let rows: Vec<(Uuid, String, String)> = sqlx::query_as(
            "SELECT node_id, role, permission FROM node_acl WHERE node_id = ANY($1)",
        )
        .bind(&missing)
        .fetch_all(&self.inner.pool)
        .await
        .context("failed to load node ACLs")?;

        let mut loaded: HashMap<Uuid, NodeAcl> =
            missing.iter().map(|id| (*id, NodeAcl::default())).collect();
        for (node_id, role, permission) in rows {
            let permission: Permission = permission
                .parse()
                .with_context(|| format!("invalid ACL row for node {node_id}"))?;
            loaded.entry(node_id).or_default().grant(&role, permission);
        }
        for (node_id, acl) in loaded {
            self.inner.cache.insert(node_id, acl);
        }

        Ok(())
    }

    /// Invalidate the cache for a node.
    ///
    /// Call this when a node's ACL entries change.
    pub fn invalidate_node(&self, node_id: Uuid) {
        self.inner.cache.remove(&node_id);
    }

    /// Invalidate the entire cache.
    pub fn invalidate_all(&self) {
        self.inner.cache.clear();
    }

    /// Get the number of cached entries (for monitoring).
    pub fn cache_size(&self) -> usize {
        self.inner.cache.len()
    }
}

#[async_trait]
impl PermissionFilter for PgAclFilter {
    async fn filter_visible(
        &self,
        nodes: Vec<Node>,
        actor: &Actor,
        permission: Permission,
    ) -> Result<Vec<Node>> {
        if actor.is_admin {
            return Ok(nodes);
        }

        let ids: Vec<Uuid> = nodes.iter().map(|n| n.id).collect();
        self.load_missing(&ids).await?;

        Ok(nodes
            .into_iter()
            .filter(|n| {
                self.inner
                    .cache
                    .get(&n.id)
                    .is_none_or(|acl| acl.allows(actor, permission))
            })
            .collect())
    }
}
