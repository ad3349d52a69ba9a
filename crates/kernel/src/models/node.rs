//! Node model: a language-independent position in the page tree.
//!
//! Nodes own no children directly; children are discovered by querying on
//! `parent_id`. Content lives in per-language [`NodeTranslation`]s.
//!
//! [`NodeTranslation`]: super::NodeTranslation

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Node record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Node {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Parent node (None for root-level nodes).
    pub parent_id: Option<Uuid>,

    /// Secondary lookup key used by templates ("homepage", "news", ...).
    /// Not guaranteed unique across the tree.
    pub internal_name: Option<String>,

    /// Entity type of the page this node points at.
    pub ref_entity_name: String,

    /// Soft-delete flag.
    pub deleted: bool,

    /// Excluded from navigation menus unless explicitly requested.
    pub hidden_from_nav: bool,

    /// Monotonic store-assigned key; higher means more recent.
    pub sequence_number: i64,

    /// Unix timestamp when created.
    pub created: i64,
}

/// Input for creating a node.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewNode {
    pub parent_id: Option<Uuid>,
    pub internal_name: Option<String>,
    pub ref_entity_name: String,
    pub hidden_from_nav: bool,
}

impl Node {
    /// Check if this node sits at the top of the tree.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl NewNode {
    /// A node for a page entity type, optionally under a parent.
    pub fn page(ref_entity_name: &str, parent_id: Option<Uuid>) -> Self {
        Self {
            parent_id,
            internal_name: None,
            ref_entity_name: ref_entity_name.to_string(),
            hidden_from_nav: false,
        }
    }

    /// Set the internal name.
    pub fn with_internal_name(mut self, name: &str) -> Self {
        self.internal_name = Some(name.to_string());
        self
    }

    /// Hide the node from navigation.
    pub fn hidden(mut self) -> Self {
        self.hidden_from_nav = true;
        self
    }
}
