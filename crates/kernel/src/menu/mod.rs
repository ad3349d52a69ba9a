//! Navigation menus built from the page tree.
//!
//! A [`NodeMenu`] is built per request for the page being shown and provides:
//! - The breadcrumb from the tree root to the current page
//! - The top-level navigation entries
//! - Lazily loaded children of any item, filtered by the actor's permissions

mod item;
mod node_menu;
mod parent;

pub use item::{MenuItemId, MenuItemRef, NodeMenuItem};
pub use node_menu::{MenuOptions, NodeMenu};
pub use parent::ParentRef;
