//! Write-side services over the node store.

pub mod slug;
pub mod translation;

pub use slug::slugify;
pub use translation::create_translation_for;
