#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Trees are built through the real [`MemoryNodeStore`] insert paths, so
//! sequence numbers, slug indexes, and URL indexes behave exactly as they do
//! for embedders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

use pagetree_kernel::models::{
    NewNode, NewNodeTranslation, NewNodeVersion, NewPublicVersion, Node, NodeTranslation,
    NodeVersion, PageRef,
};
use pagetree_kernel::permissions::{AllowAll, PermissionFilter};
use pagetree_kernel::routes;
use pagetree_kernel::services::slug::child_url;
use pagetree_kernel::state::AppState;
use pagetree_kernel::store::{MemoryNodeStore, NodeStore, TranslatedNode};

/// Builder for page trees over an in-memory store.
pub struct TestTree {
    store: Arc<MemoryNodeStore>,
}

impl TestTree {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryNodeStore::new()),
        }
    }

    /// The store as the trait object the kernel consumes.
    pub fn store(&self) -> Arc<dyn NodeStore> {
        self.store.clone()
    }

    pub fn memory(&self) -> &MemoryNodeStore {
        &self.store
    }

    /// Insert an untranslated node.
    pub async fn node(&self, parent: Option<&Node>) -> Node {
        self.store
            .insert_node(NewNode::page("page", parent.map(|p| p.id)))
            .await
            .expect("insert node")
    }

    /// Insert a node from a prepared input.
    pub async fn node_with(&self, input: NewNode) -> Node {
        self.store.insert_node(input).await.expect("insert node")
    }

    /// Add an online translation; the URL extends the parent's URL in `lang`.
    pub async fn translate(&self, node: &Node, lang: &str, slug: &str) -> NodeTranslation {
        self.translate_with(node, lang, slug, true).await
    }

    /// Add an offline translation.
    pub async fn translate_offline(&self, node: &Node, lang: &str, slug: &str) -> NodeTranslation {
        self.translate_with(node, lang, slug, false).await
    }

    async fn translate_with(
        &self,
        node: &Node,
        lang: &str,
        slug: &str,
        online: bool,
    ) -> NodeTranslation {
        let parent_url = match node.parent_id {
            Some(parent_id) => self
                .store
                .translation_for(parent_id, lang, true)
                .await
                .expect("parent translation")
                .and_then(|t| t.url),
            None => None,
        };
        self.store
            .insert_translation(NewNodeTranslation {
                node_id: node.id,
                lang: lang.to_string(),
                online,
                title: title_for(slug),
                slug: Some(slug.to_string()),
                url: child_url(parent_url.as_deref(), slug),
            })
            .await
            .expect("insert translation")
    }

    /// Insert a translated page in one go.
    pub async fn page(&self, parent: Option<&Node>, lang: &str, slug: &str) -> Node {
        let node = self.node(parent).await;
        self.translate(&node, lang, slug).await;
        node
    }

    /// Insert a root placeholder: a root node whose translation has neither
    /// slug nor URL.
    pub async fn root_placeholder(&self, lang: &str) -> (Node, NodeTranslation) {
        let node = self.node(None).await;
        let translation = self
            .store
            .insert_translation(NewNodeTranslation {
                node_id: node.id,
                lang: lang.to_string(),
                online: true,
                title: "Home".to_string(),
                slug: None,
                url: None,
            })
            .await
            .expect("insert root translation");
        (node, translation)
    }

    /// Soft-delete a node.
    pub async fn delete(&self, node: &Node) {
        assert!(self.store.mark_deleted(node.id).await.expect("mark deleted"));
    }

    /// Router serving this tree with every node visible.
    pub fn app(&self) -> TestApp {
        self.app_with(Arc::new(AllowAll))
    }

    /// Router serving this tree with a specific permission filter.
    pub fn app_with(&self, permissions: Arc<dyn PermissionFilter>) -> TestApp {
        TestApp::new(AppState::from_parts(self.store(), permissions, "en"))
    }
}

/// Store that fails chosen operations and forwards everything else to a
/// tree's in-memory store.
pub struct FaultyStore {
    inner: Arc<MemoryNodeStore>,
    // Operation name -> calls still allowed before the one that fails.
    faults: Mutex<HashMap<&'static str, usize>>,
}

impl FaultyStore {
    pub fn new(tree: &TestTree) -> Arc<Self> {
        Arc::new(Self {
            inner: tree.store.clone(),
            faults: Mutex::new(HashMap::new()),
        })
    }

    /// Let `successes` calls to `op` through, then fail the next one.
    pub fn fail_after(&self, op: &'static str, successes: usize) {
        self.faults.lock().insert(op, successes);
    }

    /// Fail the next call to `op`.
    pub fn fail_next(&self, op: &'static str) {
        self.fail_after(op, 0);
    }

    fn check(&self, op: &'static str) -> Result<()> {
        let mut faults = self.faults.lock();
        match faults.get_mut(op) {
            Some(0) => {
                faults.remove(op);
                anyhow::bail!("{op}: connection reset")
            }
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NodeStore for FaultyStore {
    async fn find_node(&self, id: Uuid) -> Result<Option<Node>> {
        self.check("find_node")?;
        self.inner.find_node(id).await
    }

    async fn find_children(&self, parent_id: Uuid) -> Result<Vec<Node>> {
        self.check("find_children")?;
        self.inner.find_children(parent_id).await
    }

    async fn top_nodes(&self, lang: &str, include_hidden_from_nav: bool) -> Result<Vec<Node>> {
        self.check("top_nodes")?;
        self.inner.top_nodes(lang, include_hidden_from_nav).await
    }

    async fn find_by_internal_name(&self, name: &str) -> Result<Vec<Node>> {
        self.check("find_by_internal_name")?;
        self.inner.find_by_internal_name(name).await
    }

    async fn find_one_by_internal_name_and_parent(
        &self,
        name: &str,
        parent_id: Uuid,
    ) -> Result<Option<Node>> {
        self.check("find_one_by_internal_name_and_parent")?;
        self.inner
            .find_one_by_internal_name_and_parent(name, parent_id)
            .await
    }

    async fn translation_for(
        &self,
        node_id: Uuid,
        lang: &str,
        include_offline: bool,
    ) -> Result<Option<NodeTranslation>> {
        self.check("translation_for")?;
        self.inner.translation_for(node_id, lang, include_offline).await
    }

    async fn slug_candidates(
        &self,
        parent_id: Option<Uuid>,
        slug: Option<&str>,
        lang: &str,
    ) -> Result<Vec<TranslatedNode>> {
        self.check("slug_candidates")?;
        self.inner.slug_candidates(parent_id, slug, lang).await
    }

    async fn url_candidates(&self, urls: &[String], lang: &str) -> Result<Vec<TranslatedNode>> {
        self.check("url_candidates")?;
        self.inner.url_candidates(urls, lang).await
    }

    async fn root_url_candidates(&self, lang: &str) -> Result<Vec<TranslatedNode>> {
        self.check("root_url_candidates")?;
        self.inner.root_url_candidates(lang).await
    }

    async fn online_translations(&self, lang: &str) -> Result<Vec<TranslatedNode>> {
        self.check("online_translations")?;
        self.inner.online_translations(lang).await
    }

    async fn root_translations(&self) -> Result<Vec<TranslatedNode>> {
        self.check("root_translations")?;
        self.inner.root_translations().await
    }

    async fn translation_for_page(&self, page: &PageRef) -> Result<Option<NodeTranslation>> {
        self.check("translation_for_page")?;
        self.inner.translation_for_page(page).await
    }

    async fn find_version(&self, id: Uuid) -> Result<Option<NodeVersion>> {
        self.check("find_version")?;
        self.inner.find_version(id).await
    }

    async fn insert_node(&self, input: NewNode) -> Result<Node> {
        self.check("insert_node")?;
        self.inner.insert_node(input).await
    }

    async fn insert_translation(&self, input: NewNodeTranslation) -> Result<NodeTranslation> {
        self.check("insert_translation")?;
        self.inner.insert_translation(input).await
    }

    async fn insert_version(&self, input: NewNodeVersion) -> Result<NodeVersion> {
        self.check("insert_version")?;
        self.inner.insert_version(input).await
    }

    async fn insert_translation_with_public_version(
        &self,
        translation: NewNodeTranslation,
        version: NewPublicVersion,
    ) -> Result<(NodeTranslation, NodeVersion)> {
        self.check("insert_translation_with_public_version")?;
        self.inner
            .insert_translation_with_public_version(translation, version)
            .await
    }

    async fn set_public_version(&self, translation_id: Uuid, version_id: Uuid) -> Result<bool> {
        self.check("set_public_version")?;
        self.inner.set_public_version(translation_id, version_id).await
    }

    async fn mark_deleted(&self, node_id: Uuid) -> Result<bool> {
        self.check("mark_deleted")?;
        self.inner.mark_deleted(node_id).await
    }
}

/// "our-team" -> "Our team".
fn title_for(slug: &str) -> String {
    let words = slug.replace('-', " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Untitled".to_string(),
    }
}

/// HTTP harness around the kernel router.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new(state: AppState) -> Self {
        Self {
            router: routes::router(state),
        }
    }

    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }
}

/// Read a response body as JSON.
pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}
