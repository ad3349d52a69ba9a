//! Node store abstraction.
//!
//! The resolver and menu builder only read through [`NodeStore`]; they never
//! see SQL. Two backends ship with the kernel:
//!
//! - [`PgNodeStore`]: PostgreSQL via sqlx, for the server.
//! - [`MemoryNodeStore`]: hash-indexed in-memory tree, for embedding and tests.
//!
//! Any failure from a backend is returned as-is; callers do not retry.

mod memory;
mod postgres;

pub use memory::MemoryNodeStore;
pub use postgres::PgNodeStore;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    NewNode, NewNodeTranslation, NewNodeVersion, NewPublicVersion, Node, NodeTranslation,
    NodeVersion, PageRef,
};

/// A translation joined with its owning node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslatedNode {
    pub node: Node,
    pub translation: NodeTranslation,
}

/// Persistence operations for the page tree.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Find a node by ID, deleted or not.
    async fn find_node(&self, id: Uuid) -> Result<Option<Node>>;

    /// Non-deleted direct children of a node, by ascending sequence number.
    async fn find_children(&self, parent_id: Uuid) -> Result<Vec<Node>>;

    /// Non-deleted root nodes with a translation in `lang`, by ascending
    /// sequence number. Nav-hidden nodes are dropped unless requested.
    async fn top_nodes(&self, lang: &str, include_hidden_from_nav: bool) -> Result<Vec<Node>>;

    /// All nodes carrying an internal name, by ascending sequence number.
    async fn find_by_internal_name(&self, name: &str) -> Result<Vec<Node>>;

    /// The node with an internal name directly under a parent.
    async fn find_one_by_internal_name_and_parent(
        &self,
        name: &str,
        parent_id: Uuid,
    ) -> Result<Option<Node>>;

    /// The translation of a node in `lang`; offline ones only when asked.
    async fn translation_for(
        &self,
        node_id: Uuid,
        lang: &str,
        include_offline: bool,
    ) -> Result<Option<NodeTranslation>>;

    /// Translations in `lang` whose node sits under `parent_id` (root level
    /// when None) with the given slug. A None slug matches null or empty slugs.
    async fn slug_candidates(
        &self,
        parent_id: Option<Uuid>,
        slug: Option<&str>,
        lang: &str,
    ) -> Result<Vec<TranslatedNode>>;

    /// Translations in `lang` whose cached URL equals one of `urls`.
    async fn url_candidates(&self, urls: &[String], lang: &str) -> Result<Vec<TranslatedNode>>;

    /// Translations in `lang` with no cached URL (the root placeholder).
    async fn root_url_candidates(&self, lang: &str) -> Result<Vec<TranslatedNode>>;

    /// Online translations of non-deleted nodes in `lang`.
    async fn online_translations(&self, lang: &str) -> Result<Vec<TranslatedNode>>;

    /// Translations (all languages) of non-deleted root nodes.
    async fn root_translations(&self) -> Result<Vec<TranslatedNode>>;

    /// The translation whose versions reference a page entity.
    async fn translation_for_page(&self, page: &PageRef) -> Result<Option<NodeTranslation>>;

    /// Find a version by ID.
    async fn find_version(&self, id: Uuid) -> Result<Option<NodeVersion>>;

    /// Insert a node; the store assigns its ID and sequence number.
    async fn insert_node(&self, input: NewNode) -> Result<Node>;

    /// Insert a translation.
    async fn insert_translation(&self, input: NewNodeTranslation) -> Result<NodeTranslation>;

    /// Insert a version snapshot.
    async fn insert_version(&self, input: NewNodeVersion) -> Result<NodeVersion>;

    /// Insert a translation together with its first public version and
    /// point the translation at it.
    ///
    /// All three writes commit together; on error nothing is stored.
    async fn insert_translation_with_public_version(
        &self,
        translation: NewNodeTranslation,
        version: NewPublicVersion,
    ) -> Result<(NodeTranslation, NodeVersion)>;

    /// Point a translation at a live version.
    async fn set_public_version(&self, translation_id: Uuid, version_id: Uuid) -> Result<bool>;

    /// Soft-delete a node.
    async fn mark_deleted(&self, node_id: Uuid) -> Result<bool>;

    /// Whether the backing store is reachable.
    async fn is_healthy(&self) -> bool {
        true
    }

    /// The node a page entity is attached to.
    async fn node_for_page(&self, page: &PageRef) -> Result<Option<Node>> {
        match self.translation_for_page(page).await? {
            Some(translation) => self.find_node(translation.node_id).await,
            None => Ok(None),
        }
    }
}
