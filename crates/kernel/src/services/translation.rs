//! Creating translations for pages.

use tracing::info;
use uuid::Uuid;

use super::slug::{child_url, slugify};
use crate::error::{NodeError, NodeResult};
use crate::models::{NewNodeTranslation, NewPublicVersion, Node, NodeTranslation, PageRef};
use crate::store::NodeStore;

/// Slug for a new translation.
///
/// Titles with no ASCII letters or digits slugify to nothing, and an empty
/// slug would give the translation its parent's URL (or make it a root
/// placeholder). Such titles fall back to the node id.
fn slug_for(title: &str, node: &Node) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        format!("node-{}", node.id.simple())
    } else {
        slug
    }
}

/// Create the `lang` translation of `node` for a persisted page.
///
/// Title and online state come from the page; the slug is the slugified title
/// (or `node-<id>` when that is empty) and the URL is appended to the parent
/// translation's URL in the same language. A first "public" version pointing at the page is recorded and
/// promoted in the same store write, so the returned translation already has
/// a live version and a failure leaves nothing behind.
///
/// Fails with [`NodeError::Precondition`] if the page has no identity yet or
/// the node already has a translation in `lang`.
pub async fn create_translation_for(
    store: &dyn NodeStore,
    page: &PageRef,
    lang: &str,
    node: &Node,
    owner_id: Uuid,
) -> NodeResult<NodeTranslation> {
    let Some(page_id) = page.id else {
        return Err(NodeError::Precondition(format!(
            "{} page \"{}\" has no id; persist it before translating",
            page.entity_type, page.title
        )));
    };

    if store.translation_for(node.id, lang, true).await?.is_some() {
        return Err(NodeError::Precondition(format!(
            "node {} already has a '{lang}' translation",
            node.id
        )));
    }

    let parent_url = match node.parent_id {
        Some(parent_id) => store
            .translation_for(parent_id, lang, true)
            .await?
            .and_then(|t| t.url),
        None => None,
    };

    let slug = slug_for(&page.title, node);
    let url = child_url(parent_url.as_deref(), &slug);

    let (translation, _) = store
        .insert_translation_with_public_version(
            NewNodeTranslation {
                node_id: node.id,
                lang: lang.to_string(),
                online: page.online,
                title: page.title.clone(),
                slug: Some(slug),
                url,
            },
            NewPublicVersion {
                owner_id,
                ref_entity_name: page.entity_type.clone(),
                ref_id: page_id,
            },
        )
        .await?;

    info!(
        node = %node.id,
        translation = %translation.id,
        lang,
        title = %translation.title,
        "created translation"
    );

    Ok(translation)
}
