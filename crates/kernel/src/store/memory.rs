//! In-memory node store.
//!
//! Keeps hash indexes on (lang, url) and (parent, lang, slug) so resolution
//! looks up exact keys instead of scanning the tree.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{NodeStore, TranslatedNode};
use crate::models::{
    NewNode, NewNodeTranslation, NewNodeVersion, NewPublicVersion, Node, NodeTranslation,
    NodeVersion, PageRef, normalize_slug, normalize_url,
};

/// (parent node, lang, slug) with the null slug stored as "".
type SlugKey = (Option<Uuid>, String, String);

#[derive(Debug, Default)]
struct Tree {
    nodes: HashMap<Uuid, Node>,
    translations: HashMap<Uuid, NodeTranslation>,
    versions: HashMap<Uuid, NodeVersion>,

    children: HashMap<Option<Uuid>, Vec<Uuid>>,
    by_internal_name: HashMap<String, Vec<Uuid>>,
    by_node_lang: HashMap<(Uuid, String), Uuid>,
    by_slug: HashMap<SlugKey, Vec<Uuid>>,
    by_url: HashMap<(String, String), Vec<Uuid>>,
    root_urls: HashMap<String, Vec<Uuid>>,

    last_sequence: i64,
}

impl Tree {
    fn joined(&self, translation_id: &Uuid) -> Option<TranslatedNode> {
        let translation = self.translations.get(translation_id)?;
        let node = self.nodes.get(&translation.node_id)?;
        Some(TranslatedNode {
            node: node.clone(),
            translation: translation.clone(),
        })
    }

    fn joined_all<'a>(&self, ids: impl IntoIterator<Item = &'a Uuid>) -> Vec<TranslatedNode> {
        ids.into_iter().filter_map(|id| self.joined(id)).collect()
    }

    fn nodes_sorted<'a>(&self, ids: impl IntoIterator<Item = &'a Uuid>) -> Vec<Node> {
        let mut nodes: Vec<Node> = ids
            .into_iter()
            .filter_map(|id| self.nodes.get(id).cloned())
            .collect();
        nodes.sort_by_key(|n| n.sequence_number);
        nodes
    }

    fn add_translation(&mut self, input: NewNodeTranslation) -> Result<NodeTranslation> {
        let Some(parent_id) = self.nodes.get(&input.node_id).map(|n| n.parent_id) else {
            anyhow::bail!("node {} does not exist", input.node_id);
        };
        let node_lang = (input.node_id, input.lang.clone());
        if self.by_node_lang.contains_key(&node_lang) {
            anyhow::bail!(
                "node {} already has a '{}' translation",
                input.node_id,
                input.lang
            );
        }

        let now = chrono::Utc::now().timestamp();
        let translation = NodeTranslation {
            id: Uuid::now_v7(),
            node_id: input.node_id,
            lang: input.lang,
            online: input.online,
            title: input.title,
            slug: normalize_slug(input.slug.as_deref()),
            url: normalize_url(input.url.as_deref()),
            public_node_version_id: None,
            created: now,
            changed: now,
        };

        self.by_node_lang.insert(node_lang, translation.id);
        self.by_slug
            .entry((
                parent_id,
                translation.lang.clone(),
                translation.slug_segment().to_string(),
            ))
            .or_default()
            .push(translation.id);
        match translation.url {
            Some(ref url) => self
                .by_url
                .entry((translation.lang.clone(), url.clone()))
                .or_default()
                .push(translation.id),
            None => self
                .root_urls
                .entry(translation.lang.clone())
                .or_default()
                .push(translation.id),
        }
        self.translations.insert(translation.id, translation.clone());

        Ok(translation)
    }

    fn add_version(&mut self, input: NewNodeVersion) -> Result<NodeVersion> {
        if !self.translations.contains_key(&input.node_translation_id) {
            anyhow::bail!("translation {} does not exist", input.node_translation_id);
        }

        let version = NodeVersion {
            id: Uuid::now_v7(),
            node_translation_id: input.node_translation_id,
            owner_id: input.owner_id,
            ref_entity_name: input.ref_entity_name,
            ref_id: input.ref_id,
            version_type: input.version_type,
            created: chrono::Utc::now().timestamp(),
        };
        self.versions.insert(version.id, version.clone());

        Ok(version)
    }
}

/// Page tree held in process memory.
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    tree: RwLock<Tree>,
}

impl MemoryNodeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes, deleted ones included.
    pub fn node_count(&self) -> usize {
        self.tree.read().nodes.len()
    }
}

#[async_trait]
impl NodeStore for MemoryNodeStore {
    async fn find_node(&self, id: Uuid) -> Result<Option<Node>> {
        Ok(self.tree.read().nodes.get(&id).cloned())
    }

    async fn find_children(&self, parent_id: Uuid) -> Result<Vec<Node>> {
        let tree = self.tree.read();
        let Some(ids) = tree.children.get(&Some(parent_id)) else {
            return Ok(Vec::new());
        };
        Ok(tree
            .nodes_sorted(ids)
            .into_iter()
            .filter(|n| !n.deleted)
            .collect())
    }

    async fn top_nodes(&self, lang: &str, include_hidden_from_nav: bool) -> Result<Vec<Node>> {
        let tree = self.tree.read();
        let Some(ids) = tree.children.get(&None) else {
            return Ok(Vec::new());
        };
        Ok(tree
            .nodes_sorted(ids)
            .into_iter()
            .filter(|n| !n.deleted)
            .filter(|n| include_hidden_from_nav || !n.hidden_from_nav)
            .filter(|n| tree.by_node_lang.contains_key(&(n.id, lang.to_string())))
            .collect())
    }

    async fn find_by_internal_name(&self, name: &str) -> Result<Vec<Node>> {
        let tree = self.tree.read();
        Ok(tree
            .by_internal_name
            .get(name)
            .map(|ids| tree.nodes_sorted(ids))
            .unwrap_or_default())
    }

    async fn find_one_by_internal_name_and_parent(
        &self,
        name: &str,
        parent_id: Uuid,
    ) -> Result<Option<Node>> {
        let tree = self.tree.read();
        Ok(tree.by_internal_name.get(name).and_then(|ids| {
            tree.nodes_sorted(ids)
                .into_iter()
                .find(|n| n.parent_id == Some(parent_id))
        }))
    }

    async fn translation_for(
        &self,
        node_id: Uuid,
        lang: &str,
        include_offline: bool,
    ) -> Result<Option<NodeTranslation>> {
        let tree = self.tree.read();
        Ok(tree
            .by_node_lang
            .get(&(node_id, lang.to_string()))
            .and_then(|id| tree.translations.get(id))
            .filter(|t| include_offline || t.online)
            .cloned())
    }

    async fn slug_candidates(
        &self,
        parent_id: Option<Uuid>,
        slug: Option<&str>,
        lang: &str,
    ) -> Result<Vec<TranslatedNode>> {
        let tree = self.tree.read();
        let key = (
            parent_id,
            lang.to_string(),
            slug.unwrap_or_default().to_string(),
        );
        Ok(tree
            .by_slug
            .get(&key)
            .map(|ids| tree.joined_all(ids))
            .unwrap_or_default())
    }

    async fn url_candidates(&self, urls: &[String], lang: &str) -> Result<Vec<TranslatedNode>> {
        let tree = self.tree.read();
        let mut found = Vec::new();
        for url in urls {
            if let Some(ids) = tree.by_url.get(&(lang.to_string(), url.clone())) {
                found.extend(tree.joined_all(ids));
            }
        }
        Ok(found)
    }

    async fn root_url_candidates(&self, lang: &str) -> Result<Vec<TranslatedNode>> {
        let tree = self.tree.read();
        Ok(tree
            .root_urls
            .get(lang)
            .map(|ids| tree.joined_all(ids))
            .unwrap_or_default())
    }

    async fn online_translations(&self, lang: &str) -> Result<Vec<TranslatedNode>> {
        let tree = self.tree.read();
        let mut found: Vec<TranslatedNode> = tree
            .joined_all(tree.translations.keys())
            .into_iter()
            .filter(|tn| tn.translation.lang == lang && tn.translation.online && !tn.node.deleted)
            .collect();
        found.sort_by_key(|tn| (tn.node.sequence_number, tn.translation.id));
        Ok(found)
    }

    async fn root_translations(&self) -> Result<Vec<TranslatedNode>> {
        let tree = self.tree.read();
        let mut found: Vec<TranslatedNode> = tree
            .joined_all(tree.translations.keys())
            .into_iter()
            .filter(|tn| tn.node.is_root() && !tn.node.deleted)
            .collect();
        found.sort_by_key(|tn| (tn.node.sequence_number, tn.translation.id));
        Ok(found)
    }

    async fn translation_for_page(&self, page: &PageRef) -> Result<Option<NodeTranslation>> {
        let Some(page_id) = page.id else {
            return Ok(None);
        };
        let tree = self.tree.read();
        Ok(tree
            .versions
            .values()
            .filter(|v| v.ref_entity_name == page.entity_type && v.ref_id == page_id)
            .max_by_key(|v| (v.created, v.id))
            .and_then(|v| tree.translations.get(&v.node_translation_id))
            .cloned())
    }

    async fn find_version(&self, id: Uuid) -> Result<Option<NodeVersion>> {
        Ok(self.tree.read().versions.get(&id).cloned())
    }

    async fn insert_node(&self, input: NewNode) -> Result<Node> {
        let mut tree = self.tree.write();
        if let Some(parent_id) = input.parent_id
            && !tree.nodes.contains_key(&parent_id)
        {
            anyhow::bail!("parent node {parent_id} does not exist");
        }

        tree.last_sequence += 1;
        let node = Node {
            id: Uuid::now_v7(),
            parent_id: input.parent_id,
            internal_name: input.internal_name,
            ref_entity_name: input.ref_entity_name,
            deleted: false,
            hidden_from_nav: input.hidden_from_nav,
            sequence_number: tree.last_sequence,
            created: chrono::Utc::now().timestamp(),
        };

        tree.children
            .entry(node.parent_id)
            .or_default()
            .push(node.id);
        if let Some(ref name) = node.internal_name {
            tree.by_internal_name
                .entry(name.clone())
                .or_default()
                .push(node.id);
        }
        tree.nodes.insert(node.id, node.clone());

        Ok(node)
    }

    async fn insert_translation(&self, input: NewNodeTranslation) -> Result<NodeTranslation> {
        self.tree.write().add_translation(input)
    }

    async fn insert_version(&self, input: NewNodeVersion) -> Result<NodeVersion> {
        self.tree.write().add_version(input)
    }

    async fn insert_translation_with_public_version(
        &self,
        translation: NewNodeTranslation,
        version: NewPublicVersion,
    ) -> Result<(NodeTranslation, NodeVersion)> {
        // One write lock: either both rows land or neither does.
        let mut tree = self.tree.write();
        let mut translation = tree.add_translation(translation)?;
        let version = tree.add_version(version.for_translation(translation.id))?;
        if let Some(stored) = tree.translations.get_mut(&translation.id) {
            stored.public_node_version_id = Some(version.id);
        }
        translation.public_node_version_id = Some(version.id);
        Ok((translation, version))
    }

    async fn set_public_version(&self, translation_id: Uuid, version_id: Uuid) -> Result<bool> {
        let mut tree = self.tree.write();
        let belongs = tree
            .versions
            .get(&version_id)
            .is_some_and(|v| v.node_translation_id == translation_id);
        if !belongs {
            return Ok(false);
        }
        let Some(translation) = tree.translations.get_mut(&translation_id) else {
            return Ok(false);
        };
        translation.public_node_version_id = Some(version_id);
        translation.changed = chrono::Utc::now().timestamp();
        Ok(true)
    }

    async fn mark_deleted(&self, node_id: Uuid) -> Result<bool> {
        let mut tree = self.tree.write();
        let Some(node) = tree.nodes.get_mut(&node_id) else {
            return Ok(false);
        };
        node.deleted = true;
        Ok(true)
    }
}
