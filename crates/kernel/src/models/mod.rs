//! Page tree models.

pub mod actor;
pub mod language;
pub mod node;
pub mod node_translation;
pub mod node_version;

pub use actor::{Actor, Permission};
pub use language::validate_locale;
pub use node::{NewNode, Node};
pub use node_translation::{NewNodeTranslation, NodeTranslation, normalize_slug, normalize_url};
pub use node_version::{
    NewNodeVersion, NewPublicVersion, NodeVersion, PageRef, VERSION_DRAFT, VERSION_PUBLIC,
};
