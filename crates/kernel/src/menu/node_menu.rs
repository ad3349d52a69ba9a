//! Breadcrumb and navigation builder for one request.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};
use uuid::Uuid;

use super::item::{MenuItemId, MenuItemRef, NodeMenuItem};
use super::parent::ParentRef;
use crate::models::{Actor, Node, NodeTranslation, NodeVersion, Permission};
use crate::permissions::PermissionFilter;
use crate::resolver::TranslationResolver;
use crate::store::NodeStore;

/// What a menu is built for besides the current node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOptions {
    /// Language of the translations shown.
    pub lang: String,

    /// Permission the actor needs on navigation nodes.
    pub permission: Permission,

    /// Show offline translations (admin previews).
    pub include_offline: bool,

    /// Show nodes flagged hidden-from-nav in top-level and child listings.
    pub include_hidden_from_nav: bool,
}

impl MenuOptions {
    /// Online, visible pages in a language, checked for view permission.
    pub fn new(lang: &str) -> Self {
        Self {
            lang: lang.to_string(),
            permission: Permission::View,
            include_offline: false,
            include_hidden_from_nav: false,
        }
    }

    /// Check `permission` instead of view permission.
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    /// Also show offline translations.
    pub fn include_offline(mut self) -> Self {
        self.include_offline = true;
        self
    }

    /// Also list nodes flagged hidden-from-nav.
    pub fn include_hidden_from_nav(mut self) -> Self {
        self.include_hidden_from_nav = true;
        self
    }
}

/// Menu state for one (current node, locale, actor, options) tuple.
///
/// The breadcrumb and top-level list are computed eagerly by [`build`] and
/// never change afterwards. Items reached later (children, internal-name
/// lookups) are appended to the same arena, so every [`MenuItemId`] handed out
/// stays valid for the menu's lifetime.
///
/// [`build`]: NodeMenu::build
pub struct NodeMenu {
    store: Arc<dyn NodeStore>,
    permissions: Arc<dyn PermissionFilter>,
    actor: Actor,
    options: MenuOptions,

    items: Vec<NodeMenuItem>,
    breadcrumb: Vec<MenuItemId>,
    top_nodes: Vec<MenuItemId>,
    children: HashMap<MenuItemId, Vec<MenuItemId>>,
}

impl fmt::Debug for NodeMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeMenu")
            .field("actor", &self.actor)
            .field("options", &self.options)
            .field("items", &self.items.len())
            .field("breadcrumb", &self.breadcrumb)
            .field("top_nodes", &self.top_nodes)
            .finish_non_exhaustive()
    }
}

impl NodeMenu {
    /// Build the breadcrumb for `current` and the top-level navigation.
    ///
    /// Ancestors without a translation in the menu language are left out of
    /// the breadcrumb; the next translated descendant is parented to the last
    /// item that made it in. A top-level node that is also the breadcrumb root
    /// is represented by the same item in both lists.
    pub async fn build(
        store: Arc<dyn NodeStore>,
        permissions: Arc<dyn PermissionFilter>,
        actor: Actor,
        current: Option<&Node>,
        options: MenuOptions,
    ) -> Result<Self> {
        let mut menu = Self {
            store,
            permissions,
            actor,
            options,
            items: Vec::new(),
            breadcrumb: Vec::new(),
            top_nodes: Vec::new(),
            children: HashMap::new(),
        };

        if let Some(current) = current {
            menu.build_breadcrumb(current).await?;
        }
        menu.build_top_nodes().await?;

        debug!(
            lang = %menu.options.lang,
            breadcrumb = menu.breadcrumb.len(),
            top_nodes = menu.top_nodes.len(),
            "built node menu"
        );
        Ok(menu)
    }

    async fn build_breadcrumb(&mut self, current: &Node) -> Result<()> {
        let chain = self.ancestor_chain(current).await?;

        let mut parent = None;
        for node in chain {
            let Some(translation) = self.translation_for(&node).await? else {
                continue;
            };
            let id = self.push_item(node, translation, parent);
            self.breadcrumb.push(id);
            parent = Some(id);
        }

        Ok(())
    }

    async fn build_top_nodes(&mut self) -> Result<()> {
        let nodes = self
            .store
            .top_nodes(&self.options.lang, self.options.include_hidden_from_nav)
            .await?;
        let nodes = self
            .permissions
            .filter_visible(nodes, &self.actor, self.options.permission)
            .await?;

        let breadcrumb_root = self.breadcrumb.first().copied();
        for node in nodes {
            let Some(translation) = self.translation_for(&node).await? else {
                continue;
            };
            let id = match breadcrumb_root {
                Some(root) if self.items[root.0].node.id == node.id => root,
                _ => self.push_item(node, translation, None),
            };
            self.top_nodes.push(id);
        }

        Ok(())
    }

    /// Nodes from the tree root down to `node`, inclusive.
    async fn ancestor_chain(&self, node: &Node) -> Result<Vec<Node>> {
        let mut chain = vec![node.clone()];
        let mut seen = HashSet::from([node.id]);
        let mut cursor = node.parent_id;

        while let Some(parent_id) = cursor {
            if !seen.insert(parent_id) {
                warn!(node = %node.id, %parent_id, "cycle in node parent chain");
                break;
            }
            let Some(parent) = self.store.find_node(parent_id).await? else {
                warn!(node = %node.id, %parent_id, "parent node missing");
                break;
            };
            cursor = parent.parent_id;
            chain.push(parent);
        }

        chain.reverse();
        Ok(chain)
    }

    async fn translation_for(&self, node: &Node) -> Result<Option<NodeTranslation>> {
        self.store
            .translation_for(node.id, &self.options.lang, self.options.include_offline)
            .await
    }

    fn push_item(
        &mut self,
        node: Node,
        translation: NodeTranslation,
        parent: Option<MenuItemId>,
    ) -> MenuItemId {
        let id = MenuItemId(self.items.len());
        self.items.push(NodeMenuItem {
            id,
            node,
            translation,
            parent,
        });
        id
    }

    /// Item already built for a node: breadcrumb first, then top level, then
    /// anything loaded since.
    fn canonical_item_for_node(&self, node_id: Uuid) -> Option<MenuItemId> {
        self.breadcrumb
            .iter()
            .chain(self.top_nodes.iter())
            .copied()
            .find(|id| self.items[id.0].node.id == node_id)
            .or_else(|| {
                self.items
                    .iter()
                    .find(|item| item.node.id == node_id)
                    .map(|item| item.id)
            })
    }

    /// Look up an item by ID.
    pub fn item(&self, id: MenuItemId) -> Option<MenuItemRef<'_>> {
        self.items.get(id.0).map(|item| MenuItemRef::new(self, item))
    }

    fn refs(&self, ids: &[MenuItemId]) -> Vec<MenuItemRef<'_>> {
        ids.iter().filter_map(|id| self.item(*id)).collect()
    }

    /// Top-level navigation items, in store order.
    pub fn top_nodes(&self) -> Vec<MenuItemRef<'_>> {
        self.refs(&self.top_nodes)
    }

    /// Breadcrumb items, root first.
    pub fn breadcrumb(&self) -> Vec<MenuItemRef<'_>> {
        self.refs(&self.breadcrumb)
    }

    /// The last breadcrumb item.
    pub fn current(&self) -> Option<MenuItemRef<'_>> {
        self.breadcrumb.last().and_then(|id| self.item(*id))
    }

    /// The breadcrumb item at a 1-based depth.
    pub fn active_for_depth(&self, depth: usize) -> Option<MenuItemRef<'_>> {
        let index = depth.checked_sub(1)?;
        self.breadcrumb.get(index).and_then(|id| self.item(*id))
    }

    /// Whether an item's node is on the breadcrumb.
    pub fn is_active(&self, id: MenuItemId) -> bool {
        let Some(item) = self.items.get(id.0) else {
            return false;
        };
        self.breadcrumb
            .iter()
            .any(|b| self.items[b.0].node.id == item.node.id)
    }

    /// Child items of an item, loaded on first access.
    ///
    /// Children go through the same hidden-from-nav, permission, and
    /// translation filtering as the top level. A child that already has an
    /// item under this one (on the breadcrumb, or from an internal-name
    /// lookup) is returned as that item.
    pub async fn children(&mut self, id: MenuItemId) -> Result<Vec<MenuItemId>> {
        if let Some(children) = self.children.get(&id) {
            return Ok(children.clone());
        }
        let Some(item) = self.items.get(id.0) else {
            return Ok(Vec::new());
        };

        let mut nodes = self.store.find_children(item.node.id).await?;
        if !self.options.include_hidden_from_nav {
            nodes.retain(|n| !n.hidden_from_nav);
        }
        let nodes = self
            .permissions
            .filter_visible(nodes, &self.actor, self.options.permission)
            .await?;

        let mut children = Vec::with_capacity(nodes.len());
        for node in nodes {
            let Some(translation) = self.translation_for(&node).await? else {
                continue;
            };
            let existing = self
                .items
                .iter()
                .find(|item| item.node.id == node.id && item.parent == Some(id))
                .map(|item| item.id);
            let child = match existing {
                Some(existing) => existing,
                None => self.push_item(node, translation, Some(id)),
            };
            children.push(child);
        }

        self.children.insert(id, children.clone());
        Ok(children)
    }

    /// The live version behind an item, if one has been promoted.
    pub async fn public_version(&self, id: MenuItemId) -> Result<Option<NodeVersion>> {
        let Some(version_id) = self
            .items
            .get(id.0)
            .and_then(|item| item.translation.public_node_version_id)
        else {
            return Ok(None);
        };
        self.store.find_version(version_id).await
    }

    /// Resolve a slash-delimited slug below a parent translation, in the
    /// menu's language.
    pub async fn node_by_slug(
        &self,
        parent: &NodeTranslation,
        slug: &str,
    ) -> Result<Option<NodeTranslation>> {
        TranslationResolver::new(Arc::clone(&self.store))
            .resolve_by_slug(&self.options.lang, Some(parent), slug)
            .await
    }

    /// Normalize a parent reference to a node ID.
    ///
    /// Menu items from another menu and pages without a node resolve to None.
    pub async fn resolve_parent(&self, parent: &ParentRef) -> Result<Option<Uuid>> {
        match parent {
            ParentRef::Node(node) => Ok(Some(node.id)),
            ParentRef::Translation(translation) => Ok(Some(translation.node_id)),
            ParentRef::MenuItem(id) => Ok(self.items.get(id.0).map(|item| item.node.id)),
            ParentRef::Page(page) => Ok(self.store.node_for_page(page).await?.map(|n| n.id)),
        }
    }

    /// Find a node by internal name, optionally scoped under a parent, and
    /// return a menu item for it.
    ///
    /// The direct child of `parent` with that name wins. Failing that, every
    /// node carrying the name is checked for `parent` anywhere in its ancestor
    /// chain and the first hit is used; this costs O(matches x depth) store
    /// reads. Returns None when nothing matches or the node has no translation
    /// in the menu's language.
    pub async fn node_by_internal_name(
        &mut self,
        internal_name: &str,
        parent: Option<&ParentRef>,
    ) -> Result<Option<MenuItemId>> {
        let node = match parent {
            Some(parent) => {
                let Some(parent_id) = self.resolve_parent(parent).await? else {
                    return Ok(None);
                };
                self.find_named_under(internal_name, parent_id).await?
            }
            None => self
                .store
                .find_by_internal_name(internal_name)
                .await?
                .into_iter()
                .next(),
        };

        let Some(node) = node else {
            return Ok(None);
        };
        let Some(translation) = self.translation_for(&node).await? else {
            return Ok(None);
        };
        self.item_for_translation(node, translation).await
    }

    async fn find_named_under(&self, internal_name: &str, parent_id: Uuid) -> Result<Option<Node>> {
        if let Some(node) = self
            .store
            .find_one_by_internal_name_and_parent(internal_name, parent_id)
            .await?
        {
            return Ok(Some(node));
        }

        for candidate in self.store.find_by_internal_name(internal_name).await? {
            let mut seen = HashSet::from([candidate.id]);
            let mut cursor = candidate.parent_id;
            while let Some(ancestor_id) = cursor {
                if ancestor_id == parent_id {
                    return Ok(Some(candidate));
                }
                if !seen.insert(ancestor_id) {
                    break;
                }
                cursor = match self.store.find_node(ancestor_id).await? {
                    Some(ancestor) => ancestor.parent_id,
                    None => None,
                };
            }
        }

        Ok(None)
    }

    /// Build (or reuse) the item for a translated node, wiring it under the
    /// nearest ancestor the menu already holds.
    async fn item_for_translation(
        &mut self,
        node: Node,
        translation: NodeTranslation,
    ) -> Result<Option<MenuItemId>> {
        if let Some(existing) = self.canonical_item_for_node(node.id) {
            return Ok(Some(existing));
        }

        let mut anchor = None;
        let mut seen = HashSet::from([node.id]);
        let mut cursor = node.parent_id;
        let mut chain = vec![node];
        while let Some(parent_id) = cursor {
            if let Some(existing) = self.canonical_item_for_node(parent_id) {
                anchor = Some(existing);
                break;
            }
            if !seen.insert(parent_id) {
                warn!(%parent_id, "cycle in node parent chain");
                break;
            }
            let Some(parent) = self.store.find_node(parent_id).await? else {
                break;
            };
            cursor = parent.parent_id;
            chain.push(parent);
        }
        chain.reverse();

        let mut target = Some(translation);
        let last = chain.len() - 1;
        let mut parent = anchor;
        for (index, node) in chain.into_iter().enumerate() {
            let translation = if index == last {
                target.take()
            } else {
                self.translation_for(&node).await?
            };
            if let Some(translation) = translation {
                parent = Some(self.push_item(node, translation, parent));
            }
        }

        Ok(parent)
    }

    /// Language every item is translated in.
    pub fn lang(&self) -> &str {
        &self.options.lang
    }

    /// Permission checked before a node is listed.
    pub fn permission(&self) -> Permission {
        self.options.permission
    }

    /// Actor the menu was filtered for.
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Whether offline translations are shown.
    pub fn is_include_offline(&self) -> bool {
        self.options.include_offline
    }

    /// Whether hidden-from-nav nodes are listed.
    pub fn is_include_hidden_from_nav(&self) -> bool {
        self.options.include_hidden_from_nav
    }
}
