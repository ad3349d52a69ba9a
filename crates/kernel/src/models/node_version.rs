//! Node version model: immutable content snapshots of a translation.
//!
//! Versions are never updated in place. Edits create a new version and the
//! translation's `public_node_version_id` is pointed at whichever one is live.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version type for the live snapshot.
pub const VERSION_PUBLIC: &str = "public";

/// Version type for work-in-progress snapshots.
pub const VERSION_DRAFT: &str = "draft";

/// Node version record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NodeVersion {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Translation this snapshot belongs to.
    pub node_translation_id: Uuid,

    /// Actor who created the snapshot.
    pub owner_id: Uuid,

    /// Entity type of the referenced page.
    pub ref_entity_name: String,

    /// Identity of the referenced page.
    pub ref_id: Uuid,

    /// "public" or "draft".
    pub version_type: String,

    /// Unix timestamp when created.
    pub created: i64,
}

/// Input for creating a node version.
#[derive(Debug, Clone, Deserialize)]
pub struct NewNodeVersion {
    pub node_translation_id: Uuid,
    pub owner_id: Uuid,
    pub ref_entity_name: String,
    pub ref_id: Uuid,
    pub version_type: String,
}

/// Input for the public version recorded alongside a new translation.
///
/// The translation id is not known until the translation row exists, so it
/// is filled in by the store inside the same write.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPublicVersion {
    pub owner_id: Uuid,
    pub ref_entity_name: String,
    pub ref_id: Uuid,
}

impl NewPublicVersion {
    /// The version input for a translation that now has an id.
    pub fn for_translation(self, node_translation_id: Uuid) -> NewNodeVersion {
        NewNodeVersion {
            node_translation_id,
            owner_id: self.owner_id,
            ref_entity_name: self.ref_entity_name,
            ref_id: self.ref_id,
            version_type: VERSION_PUBLIC.to_string(),
        }
    }
}

impl NodeVersion {
    /// Check if this is a public (publishable) snapshot.
    pub fn is_public(&self) -> bool {
        self.version_type == VERSION_PUBLIC
    }
}

/// Reference to the page entity a node points at.
///
/// Pages are owned by an external content subsystem; the tree only keeps
/// their type and identity. `id` stays None until the page is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    /// Entity type (e.g., "content_page").
    pub entity_type: String,

    /// Store-assigned identity, None before the page is persisted.
    pub id: Option<Uuid>,

    /// Human-readable title, used to seed translation titles and slugs.
    pub title: String,

    /// Whether the page should be published on creation.
    pub online: bool,
}

impl PageRef {
    /// A persisted page reference.
    pub fn new(entity_type: &str, id: Uuid, title: &str) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            id: Some(id),
            title: title.to_string(),
            online: false,
        }
    }

    /// A page that has not been assigned an identity yet.
    pub fn unsaved(entity_type: &str, title: &str) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            id: None,
            title: title.to_string(),
            online: false,
        }
    }

    /// Mark the page as published.
    pub fn online(mut self) -> Self {
        self.online = true;
        self
    }
}
