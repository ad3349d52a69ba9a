//! Menu items and read-only handles onto them.

use std::ops::Deref;

use serde::Serialize;

use super::NodeMenu;
use crate::models::{Node, NodeTranslation};

/// Index of an item inside the [`NodeMenu`] that built it.
///
/// Only meaningful for the menu that handed it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MenuItemId(pub(super) usize);

impl MenuItemId {
    /// Position in the owning menu's item arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node paired with the translation shown for it in a menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeMenuItem {
    pub(super) id: MenuItemId,
    pub(super) node: Node,
    pub(super) translation: NodeTranslation,
    pub(super) parent: Option<MenuItemId>,
}

impl NodeMenuItem {
    pub fn id(&self) -> MenuItemId {
        self.id
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn translation(&self) -> &NodeTranslation {
        &self.translation
    }

    /// The parent item, if this item is not a menu root.
    pub fn parent_id(&self) -> Option<MenuItemId> {
        self.parent
    }

    pub fn title(&self) -> &str {
        &self.translation.title
    }

    pub fn slug(&self) -> Option<&str> {
        self.translation.slug.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.translation.url.as_deref()
    }

    pub fn is_online(&self) -> bool {
        self.translation.online
    }
}

/// Borrowed view of an item together with the menu that owns it.
///
/// Navigation (parent, ancestors, active state) goes through the menu, so a
/// handle can never outlive or modify it.
#[derive(Debug, Clone, Copy)]
pub struct MenuItemRef<'m> {
    menu: &'m NodeMenu,
    item: &'m NodeMenuItem,
}

impl<'m> MenuItemRef<'m> {
    pub(super) fn new(menu: &'m NodeMenu, item: &'m NodeMenuItem) -> Self {
        Self { menu, item }
    }

    /// The owning menu.
    pub fn menu(&self) -> &'m NodeMenu {
        self.menu
    }

    /// The underlying item.
    pub fn item(&self) -> &'m NodeMenuItem {
        self.item
    }

    /// The parent item.
    pub fn parent(&self) -> Option<MenuItemRef<'m>> {
        self.item.parent.and_then(|id| self.menu.item(id))
    }

    /// Ancestors from the menu root down to the direct parent.
    pub fn parents(&self) -> Vec<MenuItemRef<'m>> {
        let mut parents = Vec::new();
        let mut cursor = self.parent();
        while let Some(parent) = cursor {
            cursor = parent.parent();
            parents.push(parent);
        }
        parents.reverse();
        parents
    }

    /// Whether the item's node is on the current breadcrumb.
    pub fn is_active(&self) -> bool {
        self.menu.is_active(self.item.id)
    }

    /// Whether two handles point at the same item of the same menu.
    pub fn same_item(&self, other: &MenuItemRef<'_>) -> bool {
        std::ptr::eq(self.menu, other.menu) && self.item.id == other.item.id
    }
}

impl Deref for MenuItemRef<'_> {
    type Target = NodeMenuItem;

    fn deref(&self) -> &Self::Target {
        self.item
    }
}
