//! Node translation model: the language-specific face of a node.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Node translation record.
///
/// At most one translation exists per (node, language).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NodeTranslation {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Owning node.
    pub node_id: Uuid,

    /// Language code (e.g., "en", "nl").
    pub lang: String,

    /// Whether the translation is published.
    pub online: bool,

    /// Page title in this language.
    pub title: String,

    /// Path segment identifying this translation among its siblings.
    /// None for the root placeholder.
    pub slug: Option<String>,

    /// Cached absolute URL without leading or trailing slash
    /// (e.g., "news/2026/launch"). None for the root placeholder.
    pub url: Option<String>,

    /// The version currently live, if any.
    pub public_node_version_id: Option<Uuid>,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last changed.
    pub changed: i64,
}

/// Input for creating a node translation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewNodeTranslation {
    pub node_id: Uuid,
    pub lang: String,
    pub online: bool,
    pub title: String,
    pub slug: Option<String>,
    pub url: Option<String>,
}

impl NodeTranslation {
    /// The slug, treating an empty string like the null placeholder.
    pub fn slug_segment(&self) -> &str {
        self.slug.as_deref().unwrap_or_default()
    }

    /// Check if this translation's slug matches a single path segment.
    ///
    /// An empty segment only matches the null/empty placeholder slug.
    pub fn matches_slug(&self, segment: &str) -> bool {
        self.slug_segment() == segment
    }

    /// Check if this translation is the root placeholder (no URL).
    pub fn is_root_url(&self) -> bool {
        self.url.as_deref().is_none_or(str::is_empty)
    }
}

/// Normalize a URL path: strip surrounding slashes and map empty to None.
pub fn normalize_url(url: Option<&str>) -> Option<String> {
    let trimmed = url?.trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalize a slug: empty slugs become the null placeholder.
pub fn normalize_slug(slug: Option<&str>) -> Option<String> {
    slug.filter(|s| !s.is_empty()).map(str::to_string)
}
