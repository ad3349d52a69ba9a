//! Ways of naming the parent scope of an internal-name lookup.

use crate::models::{Node, NodeTranslation, PageRef};

use super::MenuItemId;

/// Anything that identifies a node to search under.
///
/// Normalized to a node ID by [`NodeMenu::resolve_parent`].
///
/// [`NodeMenu::resolve_parent`]: super::NodeMenu::resolve_parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef {
    Node(Node),
    Translation(NodeTranslation),
    MenuItem(MenuItemId),
    Page(PageRef),
}

impl From<Node> for ParentRef {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

impl From<NodeTranslation> for ParentRef {
    fn from(translation: NodeTranslation) -> Self {
        Self::Translation(translation)
    }
}

impl From<MenuItemId> for ParentRef {
    fn from(id: MenuItemId) -> Self {
        Self::MenuItem(id)
    }
}

impl From<PageRef> for ParentRef {
    fn from(page: PageRef) -> Self {
        Self::Page(page)
    }
}
