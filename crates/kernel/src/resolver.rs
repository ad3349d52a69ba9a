//! Slug and URL resolution for node translations.
//!
//! Two ways of turning a request path into a translation:
//!
//! - **Slug paths** walk the tree one segment at a time from a parent (or the
//!   root), picking among same-slug siblings at every level.
//! - **Full URLs** match the cached URL of a translation, taking the longest
//!   cached URL that is a prefix of the request path.
//!
//! Whenever several candidates remain, the most recent one wins: highest node
//! sequence number first, then highest translation ID (UUIDv7, so also
//! time-ordered). Deleted nodes are never returned.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::models::{Node, NodeTranslation, PageRef, normalize_url};
use crate::store::{NodeStore, TranslatedNode};

/// Outcome of a longest-prefix URL lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlMatch {
    /// The matched translation.
    pub translation: NodeTranslation,

    /// Whatever followed the matched URL in the request path, without
    /// leading slash (empty on an exact match).
    pub remainder: String,
}

/// Pick the most recent candidate, skipping deleted nodes.
pub fn most_recent(candidates: Vec<TranslatedNode>) -> Option<TranslatedNode> {
    candidates
        .into_iter()
        .filter(|c| !c.node.deleted)
        .max_by_key(|c| (c.node.sequence_number, c.translation.id))
}

/// Candidate URLs for a normalized path, longest first: every string prefix
/// ending on a char boundary, so "ab/c" -> ["ab/c", "ab", "a"].
///
/// Prefixes ending in '/' are skipped since cached URLs never carry a
/// trailing slash.
pub fn url_prefixes(path: &str) -> Vec<String> {
    path.char_indices()
        .map(|(idx, c)| &path[..idx + c.len_utf8()])
        .filter(|prefix| !prefix.ends_with('/'))
        .rev()
        .map(str::to_string)
        .collect()
}

/// Resolves slugs and URLs to node translations.
#[derive(Clone)]
pub struct TranslationResolver {
    store: Arc<dyn NodeStore>,
}

impl TranslationResolver {
    /// Create a resolver over a store.
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self { store }
    }

    /// Resolve a sequence of slug segments starting below `parent`
    /// (or at the root level when None).
    ///
    /// Every segment must match; a miss at any level yields None rather than
    /// the deepest partial match. With no segments at all, `parent` itself is
    /// returned, or the root placeholder when there is no parent.
    pub async fn resolve_by_slug_path<S: AsRef<str> + Sync>(
        &self,
        locale: &str,
        parent: Option<&NodeTranslation>,
        segments: &[S],
    ) -> Result<Option<NodeTranslation>> {
        if segments.is_empty() {
            return match parent {
                Some(p) => Ok(Some(p.clone())),
                None => self.resolve_segment(locale, None, "").await,
            };
        }

        let mut parent_node = parent.map(|p| p.node_id);
        let mut resolved = None;
        for segment in segments {
            let segment = segment.as_ref();
            let Some(found) = self.resolve_segment(locale, parent_node, segment).await? else {
                debug!(locale, segment, "slug segment not found");
                return Ok(None);
            };
            parent_node = Some(found.node_id);
            resolved = Some(found);
        }

        Ok(resolved)
    }

    /// Resolve a slash-delimited slug ("news/2026/launch") below `parent`.
    ///
    /// An empty slug resolves to the root placeholder regardless of `parent`.
    pub async fn resolve_by_slug(
        &self,
        locale: &str,
        parent: Option<&NodeTranslation>,
        slug: &str,
    ) -> Result<Option<NodeTranslation>> {
        if slug.is_empty() {
            return self.resolve_segment(locale, None, "").await;
        }
        let segments: Vec<&str> = slug.split('/').collect();
        self.resolve_by_slug_path(locale, parent, &segments).await
    }

    /// Resolve one slug segment among the children of `parent_node`.
    async fn resolve_segment(
        &self,
        locale: &str,
        parent_node: Option<uuid::Uuid>,
        segment: &str,
    ) -> Result<Option<NodeTranslation>> {
        let slug = (!segment.is_empty()).then_some(segment);
        let candidates = self
            .store
            .slug_candidates(parent_node, slug, locale)
            .await?
            .into_iter()
            .filter(|c| {
                c.translation.lang == locale
                    && c.node.parent_id == parent_node
                    && c.translation.matches_slug(segment)
            })
            .collect();

        Ok(most_recent(candidates).map(|c| c.translation))
    }

    /// Find the online translation whose cached URL is the longest prefix of
    /// `url_path`.
    ///
    /// Prefixes are plain string prefixes: "about" matches "about/team" and
    /// also "aboutus". An empty or missing path matches only the root
    /// placeholder (a translation without URL).
    pub async fn resolve_by_full_url(
        &self,
        url_path: Option<&str>,
        locale: &str,
    ) -> Result<Option<NodeTranslation>> {
        Ok(self
            .match_full_url(url_path, locale)
            .await?
            .map(|m| m.translation))
    }

    /// Like [`resolve_by_full_url`](Self::resolve_by_full_url), also reporting
    /// the part of the path beyond the matched URL.
    pub async fn match_full_url(
        &self,
        url_path: Option<&str>,
        locale: &str,
    ) -> Result<Option<UrlMatch>> {
        let Some(path) = normalize_url(url_path) else {
            let candidates = self
                .store
                .root_url_candidates(locale)
                .await?
                .into_iter()
                .filter(|c| c.translation.online && c.translation.is_root_url())
                .collect();
            return Ok(most_recent(candidates).map(|c| UrlMatch {
                translation: c.translation,
                remainder: String::new(),
            }));
        };

        let prefixes = url_prefixes(&path);
        let candidates: Vec<TranslatedNode> = self
            .store
            .url_candidates(&prefixes, locale)
            .await?
            .into_iter()
            .filter(|c| c.translation.online && c.translation.lang == locale)
            .collect();

        // Longest prefix strictly first; recency only breaks ties within a length.
        for prefix in &prefixes {
            let same_length: Vec<TranslatedNode> = candidates
                .iter()
                .filter(|c| c.translation.url.as_deref() == Some(prefix.as_str()))
                .cloned()
                .collect();
            if let Some(best) = most_recent(same_length) {
                let remainder = path[prefix.len()..].trim_start_matches('/').to_string();
                debug!(locale, path = %path, matched = %prefix, "resolved url");
                return Ok(Some(UrlMatch {
                    translation: best.translation,
                    remainder,
                }));
            }
        }

        debug!(locale, path = %path, "no url prefix matched");
        Ok(None)
    }

    /// Find the translation whose cached URL equals `url` exactly, online or
    /// not. None or empty looks up the root placeholder.
    pub async fn find_by_url(
        &self,
        url: Option<&str>,
        locale: &str,
    ) -> Result<Option<NodeTranslation>> {
        let candidates = match normalize_url(url) {
            Some(url) => {
                self.store
                    .url_candidates(std::slice::from_ref(&url), locale)
                    .await?
            }
            None => self.store.root_url_candidates(locale).await?,
        };
        Ok(most_recent(candidates).map(|c| c.translation))
    }

    /// Direct children of a node. No recursion.
    pub async fn children_of(&self, node: &Node) -> Result<Vec<Node>> {
        self.store.find_children(node.id).await
    }

    /// Translations visible to guests in a locale.
    pub async fn online_translations(&self, locale: &str) -> Result<Vec<NodeTranslation>> {
        Ok(self
            .store
            .online_translations(locale)
            .await?
            .into_iter()
            .map(|c| c.translation)
            .collect())
    }

    /// Translations of every root node, all languages.
    pub async fn root_translations(&self) -> Result<Vec<NodeTranslation>> {
        Ok(self
            .store
            .root_translations()
            .await?
            .into_iter()
            .map(|c| c.translation)
            .collect())
    }

    /// The translation a page entity belongs to.
    pub async fn translation_for_page(&self, page: &PageRef) -> Result<Option<NodeTranslation>> {
        self.store.translation_for_page(page).await
    }
}
