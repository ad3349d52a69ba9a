//! Page lookup by URL.
//!
//! `GET /{locale}/{*path}` resolves the path to the translation with the
//! longest matching URL and returns it with the navigation for that page.
//! Paths with no match in the requested locale are retried in the default
//! language.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::menu::{MenuItemRef, MenuOptions, NodeMenu};
use crate::models::{Actor, NodeTranslation, validate_locale};
use crate::state::AppState;

/// A navigation entry as rendered to clients.
#[derive(Debug, Serialize)]
pub struct MenuEntry {
    pub node_id: Uuid,
    pub title: String,
    pub slug: Option<String>,
    pub url: Option<String>,
    pub active: bool,
}

impl From<MenuItemRef<'_>> for MenuEntry {
    fn from(item: MenuItemRef<'_>) -> Self {
        Self {
            node_id: item.node().id,
            title: item.title().to_string(),
            slug: item.slug().map(str::to_string),
            url: item.url().map(str::to_string),
            active: item.is_active(),
        }
    }
}

/// Resolved page with its navigation.
#[derive(Debug, Serialize)]
pub struct PageView {
    /// Locale the page was served in; the default language on fallback.
    pub locale: String,

    pub translation: NodeTranslation,

    /// Path left over after the matched URL, for the page to interpret.
    pub remainder: String,

    pub breadcrumb: Vec<MenuEntry>,
    pub top_nodes: Vec<MenuEntry>,
}

/// Resolve `path` in `locale` for an actor and build its navigation.
///
/// When nothing matches in `locale`, the path is resolved in the default
/// language instead and the page is served in that language.
///
/// Returns [`AppError::BadRequest`] for a malformed locale and
/// [`AppError::NotFound`] when no online translation matches in either.
pub async fn load_page(
    state: &AppState,
    locale: &str,
    path: &str,
    actor: Actor,
) -> AppResult<PageView> {
    validate_locale(locale).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let resolver = state.resolver();
    let mut served = locale;
    let mut matched = resolver.match_full_url(Some(path), locale).await?;
    if matched.is_none() && locale != state.default_language() {
        served = state.default_language();
        debug!(locale, fallback = served, path, "falling back to default language");
        matched = resolver.match_full_url(Some(path), served).await?;
    }
    let Some(matched) = matched else {
        debug!(locale, path, "no page for path");
        return Err(AppError::NotFound);
    };
    let Some(node) = state.store().find_node(matched.translation.node_id).await? else {
        return Err(AppError::NotFound);
    };

    let menu = NodeMenu::build(
        Arc::clone(state.store()),
        Arc::clone(state.permissions()),
        actor,
        Some(&node),
        MenuOptions::new(served),
    )
    .await?;

    Ok(PageView {
        locale: served.to_string(),
        translation: matched.translation,
        remainder: matched.remainder,
        breadcrumb: menu.breadcrumb().into_iter().map(MenuEntry::from).collect(),
        top_nodes: menu.top_nodes().into_iter().map(MenuEntry::from).collect(),
    })
}

async fn locale_root(
    State(state): State<AppState>,
    Path(locale): Path<String>,
) -> AppResult<Json<PageView>> {
    load_page(&state, &locale, "", Actor::anonymous())
        .await
        .map(Json)
}

async fn page(
    State(state): State<AppState>,
    Path((locale, path)): Path<(String, String)>,
) -> AppResult<Json<PageView>> {
    load_page(&state, &locale, &path, Actor::anonymous())
        .await
        .map(Json)
}

/// Create the page router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{locale}", get(locale_root))
        .route("/{locale}/{*path}", get(page))
}
