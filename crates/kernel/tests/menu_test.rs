//! Integration tests for navigation menus.

mod common;

use std::sync::Arc;

use common::TestTree;
use pagetree_kernel::menu::{MenuOptions, NodeMenu, ParentRef};
use pagetree_kernel::models::{
    Actor, NewNode, NewNodeVersion, Node, PageRef, Permission, VERSION_PUBLIC,
};
use pagetree_kernel::permissions::{AllowAll, PermissionFilter, RoleAcl};
use uuid::Uuid;

async fn build(tree: &TestTree, current: Option<&Node>, options: MenuOptions) -> NodeMenu {
    build_with(tree, Arc::new(AllowAll), Actor::anonymous(), current, options).await
}

async fn build_with(
    tree: &TestTree,
    permissions: Arc<dyn PermissionFilter>,
    actor: Actor,
    current: Option<&Node>,
    options: MenuOptions,
) -> NodeMenu {
    NodeMenu::build(tree.store(), permissions, actor, current, options)
        .await
        .unwrap()
}

fn titles(items: &[pagetree_kernel::menu::MenuItemRef<'_>]) -> Vec<String> {
    items.iter().map(|i| i.title().to_string()).collect()
}

#[tokio::test]
async fn breadcrumb_runs_root_to_current() {
    let tree = TestTree::new();
    let about = tree.page(None, "en", "about").await;
    let team = tree.page(Some(&about), "en", "team").await;
    let alice = tree.page(Some(&team), "en", "alice").await;

    let menu = build(&tree, Some(&alice), MenuOptions::new("en")).await;
    let crumbs = menu.breadcrumb();

    assert_eq!(titles(&crumbs), vec!["About", "Team", "Alice"]);
    assert_eq!(crumbs[0].node().id, about.id);
    assert_eq!(crumbs[2].node().id, alice.id);
    assert!(crumbs[0].parent().is_none());
    for pair in crumbs.windows(2) {
        assert!(pair[1].parent().unwrap().same_item(&pair[0]));
    }
    assert_eq!(crumbs[2].url(), Some("about/team/alice"));
    assert!(menu.current().unwrap().same_item(&crumbs[2]));
}

#[tokio::test]
async fn breadcrumb_skips_untranslated_ancestors() {
    let tree = TestTree::new();
    let about = tree.page(None, "en", "about").await;
    let team = tree.node(Some(&about)).await;
    tree.translate(&team, "nl", "team").await;
    let alice = tree.page(Some(&team), "en", "alice").await;

    let menu = build(&tree, Some(&alice), MenuOptions::new("en")).await;
    let crumbs = menu.breadcrumb();

    assert_eq!(titles(&crumbs), vec!["About", "Alice"]);
    assert!(crumbs[1].parent().unwrap().same_item(&crumbs[0]));
}

#[tokio::test]
async fn offline_ancestors_are_skipped_unless_requested() {
    let tree = TestTree::new();
    let about = tree.page(None, "en", "about").await;
    let team = tree.node(Some(&about)).await;
    tree.translate_offline(&team, "en", "team").await;
    let alice = tree.page(Some(&team), "en", "alice").await;

    let menu = build(&tree, Some(&alice), MenuOptions::new("en")).await;
    assert_eq!(titles(&menu.breadcrumb()), vec!["About", "Alice"]);

    let preview = build(&tree, Some(&alice), MenuOptions::new("en").include_offline()).await;
    assert_eq!(titles(&preview.breadcrumb()), vec!["About", "Team", "Alice"]);
    assert!(preview.is_include_offline());
}

#[tokio::test]
async fn top_level_reuses_breadcrumb_root() {
    let tree = TestTree::new();
    let home = tree.page(None, "en", "home").await;
    let about = tree.page(None, "en", "about").await;
    let team = tree.page(Some(&about), "en", "team").await;

    let menu = build(&tree, Some(&team), MenuOptions::new("en")).await;
    let top = menu.top_nodes();
    let crumbs = menu.breadcrumb();

    assert_eq!(titles(&top), vec!["Home", "About"]);
    assert!(top[1].same_item(&crumbs[0]));
    assert_eq!(top[1].id(), crumbs[0].id());
    assert_eq!(top[0].node().id, home.id);
    assert!(top[0].parent().is_none());
    assert!(top[1].is_active());
    assert!(!top[0].is_active());
}

#[tokio::test]
async fn top_level_respects_visibility_flags() {
    let tree = TestTree::new();
    tree.page(None, "en", "home").await;
    let hidden = tree.node_with(NewNode::page("page", None).hidden()).await;
    tree.translate(&hidden, "en", "secret").await;
    let dutch_only = tree.node(None).await;
    tree.translate(&dutch_only, "nl", "alleen").await;

    let menu = build(&tree, None, MenuOptions::new("en")).await;
    assert_eq!(titles(&menu.top_nodes()), vec!["Home"]);
    assert!(menu.breadcrumb().is_empty());
    assert!(menu.current().is_none());

    let with_hidden = build(&tree, None, MenuOptions::new("en").include_hidden_from_nav()).await;
    assert_eq!(titles(&with_hidden.top_nodes()), vec!["Home", "Secret"]);
}

#[tokio::test]
async fn top_level_is_permission_filtered() {
    let tree = TestTree::new();
    tree.page(None, "en", "home").await;
    let members = tree.page(None, "en", "members").await;

    let acl = Arc::new(RoleAcl::new());
    acl.grant(members.id, "member", Permission::View);

    let guest = build_with(
        &tree,
        acl.clone(),
        Actor::anonymous(),
        None,
        MenuOptions::new("en"),
    )
    .await;
    assert_eq!(titles(&guest.top_nodes()), vec!["Home"]);

    let member = build_with(
        &tree,
        acl.clone(),
        Actor::authenticated(Uuid::now_v7(), &["member"]),
        None,
        MenuOptions::new("en"),
    )
    .await;
    assert_eq!(titles(&member.top_nodes()), vec!["Home", "Members"]);

    let editor = build_with(
        &tree,
        acl,
        Actor::authenticated(Uuid::now_v7(), &["member"]),
        None,
        MenuOptions::new("en").with_permission(Permission::Edit),
    )
    .await;
    assert_eq!(titles(&editor.top_nodes()), vec!["Home", "Members"]);
    assert_eq!(editor.permission(), Permission::Edit);
}

#[tokio::test]
async fn active_for_depth_indexes_breadcrumb() {
    let tree = TestTree::new();
    let about = tree.page(None, "en", "about").await;
    let team = tree.page(Some(&about), "en", "team").await;

    let menu = build(&tree, Some(&team), MenuOptions::new("en")).await;
    let crumbs = menu.breadcrumb();

    assert!(menu.active_for_depth(0).is_none());
    for depth in 1..=crumbs.len() {
        let active = menu.active_for_depth(depth).unwrap();
        assert!(active.same_item(&crumbs[depth - 1]));
    }
    assert!(menu.active_for_depth(crumbs.len() + 1).is_none());
    assert!(menu.active_for_depth(usize::MAX).is_none());
}

#[tokio::test]
async fn children_are_loaded_once_and_filtered() {
    let tree = TestTree::new();
    let about = tree.page(None, "en", "about").await;
    let team = tree.page(Some(&about), "en", "team").await;
    tree.page(Some(&about), "en", "history").await;
    let hidden = tree
        .node_with(NewNode::page("page", Some(about.id)).hidden())
        .await;
    tree.translate(&hidden, "en", "internal").await;
    let untranslated = tree.node(Some(&about)).await;
    tree.translate(&untranslated, "nl", "alleen").await;
    let gone = tree.page(Some(&about), "en", "gone").await;
    tree.delete(&gone).await;

    let mut menu = build(&tree, Some(&team), MenuOptions::new("en")).await;
    let root = menu.breadcrumb()[0].id();
    let team_item = menu.breadcrumb()[1].id();

    let children = menu.children(root).await.unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0], team_item);
    let history = menu.item(children[1]).unwrap();
    assert_eq!(history.title(), "History");
    assert_eq!(history.parent().unwrap().id(), root);
    assert!(!history.is_active());

    let again = menu.children(root).await.unwrap();
    assert_eq!(again, children);
    assert!(menu.children(team_item).await.unwrap().is_empty());
}

#[tokio::test]
async fn parents_lists_ancestors_root_first() {
    let tree = TestTree::new();
    let a = tree.page(None, "en", "a").await;
    let b = tree.page(Some(&a), "en", "b").await;
    let c = tree.page(Some(&b), "en", "c").await;

    let menu = build(&tree, Some(&c), MenuOptions::new("en")).await;
    let current = menu.current().unwrap();
    assert_eq!(titles(&current.parents()), vec!["A", "B"]);
    assert!(menu.breadcrumb()[0].parents().is_empty());
}

#[tokio::test]
async fn internal_name_direct_child_lookup() {
    let tree = TestTree::new();
    let about = tree.page(None, "en", "about").await;
    let contact = tree
        .node_with(NewNode::page("page", Some(about.id)).with_internal_name("contact"))
        .await;
    tree.translate(&contact, "en", "contact").await;

    let mut menu = build(&tree, Some(&about), MenuOptions::new("en")).await;
    let root = menu.breadcrumb()[0].id();

    let found = menu
        .node_by_internal_name("contact", Some(&ParentRef::MenuItem(root)))
        .await
        .unwrap()
        .unwrap();
    let item = menu.item(found).unwrap();
    assert_eq!(item.node().id, contact.id);
    assert_eq!(item.parent().unwrap().id(), root);
}

#[tokio::test]
async fn internal_name_item_is_reused_by_children() {
    let tree = TestTree::new();
    let about = tree.page(None, "en", "about").await;
    tree.page(Some(&about), "en", "team").await;
    let contact = tree
        .node_with(NewNode::page("page", Some(about.id)).with_internal_name("contact"))
        .await;
    tree.translate(&contact, "en", "contact").await;

    let mut menu = build(&tree, Some(&about), MenuOptions::new("en")).await;
    let root = menu.breadcrumb()[0].id();
    let named = menu
        .node_by_internal_name("contact", Some(&ParentRef::MenuItem(root)))
        .await
        .unwrap()
        .unwrap();

    let children = menu.children(root).await.unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(children[1], named);

    let again = menu
        .node_by_internal_name("contact", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again, named);
}

#[tokio::test]
async fn internal_name_falls_back_to_deep_descendants() {
    let tree = TestTree::new();
    let other = tree.page(None, "en", "other").await;
    let decoy = tree
        .node_with(NewNode::page("page", Some(other.id)).with_internal_name("faq"))
        .await;
    tree.translate(&decoy, "en", "faq").await;

    let support = tree.page(None, "en", "support").await;
    let docs = tree.page(Some(&support), "en", "docs").await;
    let faq = tree
        .node_with(NewNode::page("page", Some(docs.id)).with_internal_name("faq"))
        .await;
    tree.translate(&faq, "en", "faq").await;

    let mut menu = build(&tree, Some(&support), MenuOptions::new("en")).await;
    let support_translation = menu.breadcrumb()[0].translation().clone();

    let found = menu
        .node_by_internal_name("faq", Some(&ParentRef::from(support_translation)))
        .await
        .unwrap()
        .unwrap();
    let item = menu.item(found).unwrap();
    assert_eq!(item.node().id, faq.id);

    // The new item hangs off the existing breadcrumb root via "docs".
    let parents = item.parents();
    assert_eq!(titles(&parents), vec!["Support", "Docs"]);
    assert!(parents[0].same_item(&menu.breadcrumb()[0]));
}

#[tokio::test]
async fn internal_name_misses_are_none() {
    let tree = TestTree::new();
    let about = tree.page(None, "en", "about").await;
    let untranslated = tree
        .node_with(NewNode::page("page", Some(about.id)).with_internal_name("legal"))
        .await;
    tree.translate(&untranslated, "nl", "juridisch").await;

    let mut menu = build(&tree, Some(&about), MenuOptions::new("en")).await;
    let parent = ParentRef::Node(about.clone());

    assert!(
        menu.node_by_internal_name("missing", Some(&parent))
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        menu.node_by_internal_name("legal", Some(&parent))
            .await
            .unwrap()
            .is_none()
    );
    let unsaved = ParentRef::Page(PageRef::unsaved("page", "Draft"));
    assert!(
        menu.node_by_internal_name("legal", Some(&unsaved))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn internal_name_without_parent_reuses_breadcrumb_item() {
    let tree = TestTree::new();
    let home = tree
        .node_with(NewNode::page("page", None).with_internal_name("homepage"))
        .await;
    tree.translate(&home, "en", "home").await;

    let mut menu = build(&tree, Some(&home), MenuOptions::new("en")).await;
    let found = menu
        .node_by_internal_name("homepage", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found, menu.breadcrumb()[0].id());
}

#[tokio::test]
async fn public_version_follows_promoted_snapshot() {
    let tree = TestTree::new();
    let about = tree.node(None).await;
    let translation = tree.translate(&about, "en", "about").await;
    let store = tree.store();
    let version = store
        .insert_version(NewNodeVersion {
            node_translation_id: translation.id,
            owner_id: Uuid::now_v7(),
            ref_entity_name: "page".to_string(),
            ref_id: Uuid::now_v7(),
            version_type: VERSION_PUBLIC.to_string(),
        })
        .await
        .unwrap();

    let before = build(&tree, Some(&about), MenuOptions::new("en")).await;
    let item = before.current().unwrap().id();
    assert!(before.public_version(item).await.unwrap().is_none());

    assert!(
        store
            .set_public_version(translation.id, version.id)
            .await
            .unwrap()
    );
    let after = build(&tree, Some(&about), MenuOptions::new("en")).await;
    let item = after.current().unwrap().id();
    let live = after.public_version(item).await.unwrap().unwrap();
    assert_eq!(live.id, version.id);
}

#[tokio::test]
async fn node_by_slug_uses_menu_language() {
    let tree = TestTree::new();
    let about = tree.node(None).await;
    tree.translate(&about, "en", "about").await;
    tree.translate(&about, "nl", "over").await;
    let team = tree.node(Some(&about)).await;
    tree.translate(&team, "en", "team").await;
    tree.translate(&team, "nl", "ploeg").await;

    let menu = build(&tree, Some(&about), MenuOptions::new("nl")).await;
    let parent = menu.current().unwrap().translation().clone();
    assert_eq!(parent.lang, "nl");

    let found = menu.node_by_slug(&parent, "ploeg").await.unwrap().unwrap();
    assert_eq!(found.node_id, team.id);
    assert_eq!(found.lang, "nl");
    assert!(menu.node_by_slug(&parent, "team").await.unwrap().is_none());
    assert_eq!(menu.lang(), "nl");
}
