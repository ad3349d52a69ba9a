//! PostgreSQL node store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{NodeStore, TranslatedNode};
use crate::models::{
    NewNode, NewNodeTranslation, NewNodeVersion, NewPublicVersion, Node, NodeTranslation,
    NodeVersion, PageRef, normalize_slug, normalize_url,
};

const NODE_COLUMNS: &str = "id, parent_id, internal_name, ref_entity_name, deleted, hidden_from_nav, sequence_number, created";

const TRANSLATION_COLUMNS: &str =
    "id, node_id, lang, online, title, slug, url, public_node_version_id, created, changed";

const VERSION_COLUMNS: &str =
    "id, node_translation_id, owner_id, ref_entity_name, ref_id, version_type, created";

/// Column list for a translation joined with its node (`t` and `n` aliases).
const JOINED_COLUMNS: &str = r#"
    n.id AS n_id, n.parent_id AS n_parent_id, n.internal_name AS n_internal_name,
    n.ref_entity_name AS n_ref_entity_name, n.deleted AS n_deleted,
    n.hidden_from_nav AS n_hidden_from_nav, n.sequence_number AS n_sequence_number,
    n.created AS n_created,
    t.id AS t_id, t.lang AS t_lang, t.online AS t_online, t.title AS t_title,
    t.slug AS t_slug, t.url AS t_url, t.public_node_version_id AS t_public_node_version_id,
    t.created AS t_created, t.changed AS t_changed
"#;

#[derive(sqlx::FromRow)]
struct JoinedRow {
    n_id: Uuid,
    n_parent_id: Option<Uuid>,
    n_internal_name: Option<String>,
    n_ref_entity_name: String,
    n_deleted: bool,
    n_hidden_from_nav: bool,
    n_sequence_number: i64,
    n_created: i64,
    t_id: Uuid,
    t_lang: String,
    t_online: bool,
    t_title: String,
    t_slug: Option<String>,
    t_url: Option<String>,
    t_public_node_version_id: Option<Uuid>,
    t_created: i64,
    t_changed: i64,
}

impl From<JoinedRow> for TranslatedNode {
    fn from(row: JoinedRow) -> Self {
        Self {
            node: Node {
                id: row.n_id,
                parent_id: row.n_parent_id,
                internal_name: row.n_internal_name,
                ref_entity_name: row.n_ref_entity_name,
                deleted: row.n_deleted,
                hidden_from_nav: row.n_hidden_from_nav,
                sequence_number: row.n_sequence_number,
                created: row.n_created,
            },
            translation: NodeTranslation {
                id: row.t_id,
                node_id: row.n_id,
                lang: row.t_lang,
                online: row.t_online,
                title: row.t_title,
                slug: row.t_slug,
                url: row.t_url,
                public_node_version_id: row.t_public_node_version_id,
                created: row.t_created,
                changed: row.t_changed,
            },
        }
    }
}

fn into_joined(rows: Vec<JoinedRow>) -> Vec<TranslatedNode> {
    rows.into_iter().map(TranslatedNode::from).collect()
}

/// Node store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgNodeStore {
    pool: PgPool,
}

impl PgNodeStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl NodeStore for PgNodeStore {
    async fn find_node(&self, id: Uuid) -> Result<Option<Node>> {
        let node = sqlx::query_as::<_, Node>(&format!(
            "SELECT {NODE_COLUMNS} FROM node WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch node by id")?;

        Ok(node)
    }

    async fn find_children(&self, parent_id: Uuid) -> Result<Vec<Node>> {
        let nodes = sqlx::query_as::<_, Node>(&format!(
            "SELECT {NODE_COLUMNS} FROM node WHERE parent_id = $1 AND deleted = FALSE ORDER BY sequence_number"
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch child nodes")?;

        Ok(nodes)
    }

    async fn top_nodes(&self, lang: &str, include_hidden_from_nav: bool) -> Result<Vec<Node>> {
        let nodes = sqlx::query_as::<_, Node>(
            r#"
            SELECT n.id, n.parent_id, n.internal_name, n.ref_entity_name, n.deleted,
                   n.hidden_from_nav, n.sequence_number, n.created
            FROM node n
            INNER JOIN node_translation t ON t.node_id = n.id
            WHERE n.parent_id IS NULL
              AND n.deleted = FALSE
              AND t.lang = $1
              AND ($2 OR n.hidden_from_nav = FALSE)
            ORDER BY n.sequence_number
            "#,
        )
        .bind(lang)
        .bind(include_hidden_from_nav)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch top nodes")?;

        Ok(nodes)
    }

    async fn find_by_internal_name(&self, name: &str) -> Result<Vec<Node>> {
        let nodes = sqlx::query_as::<_, Node>(&format!(
            "SELECT {NODE_COLUMNS} FROM node WHERE internal_name = $1 ORDER BY sequence_number"
        ))
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch nodes by internal name")?;

        Ok(nodes)
    }

    async fn find_one_by_internal_name_and_parent(
        &self,
        name: &str,
        parent_id: Uuid,
    ) -> Result<Option<Node>> {
        let node = sqlx::query_as::<_, Node>(&format!(
            "SELECT {NODE_COLUMNS} FROM node WHERE internal_name = $1 AND parent_id = $2 ORDER BY sequence_number LIMIT 1"
        ))
        .bind(name)
        .bind(parent_id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch node by internal name and parent")?;

        Ok(node)
    }

    async fn translation_for(
        &self,
        node_id: Uuid,
        lang: &str,
        include_offline: bool,
    ) -> Result<Option<NodeTranslation>> {
        let translation = sqlx::query_as::<_, NodeTranslation>(&format!(
            "SELECT {TRANSLATION_COLUMNS} FROM node_translation WHERE node_id = $1 AND lang = $2 AND ($3 OR online = TRUE)"
        ))
        .bind(node_id)
        .bind(lang)
        .bind(include_offline)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch node translation")?;

        Ok(translation)
    }

    async fn slug_candidates(
        &self,
        parent_id: Option<Uuid>,
        slug: Option<&str>,
        lang: &str,
    ) -> Result<Vec<TranslatedNode>> {
        let rows = sqlx::query_as::<_, JoinedRow>(&format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM node_translation t
            INNER JOIN node n ON n.id = t.node_id
            WHERE n.parent_id IS NOT DISTINCT FROM $1
              AND t.lang = $2
              AND COALESCE(t.slug, '') = COALESCE($3, '')
            ORDER BY n.sequence_number DESC, t.id DESC
            "#
        ))
        .bind(parent_id)
        .bind(lang)
        .bind(slug)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch slug candidates")?;

        Ok(into_joined(rows))
    }

    async fn url_candidates(&self, urls: &[String], lang: &str) -> Result<Vec<TranslatedNode>> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, JoinedRow>(&format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM node_translation t
            INNER JOIN node n ON n.id = t.node_id
            WHERE t.lang = $1 AND t.url = ANY($2)
            ORDER BY LENGTH(t.url) DESC, n.sequence_number DESC, t.id DESC
            "#
        ))
        .bind(lang)
        .bind(urls)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch url candidates")?;

        Ok(into_joined(rows))
    }

    async fn root_url_candidates(&self, lang: &str) -> Result<Vec<TranslatedNode>> {
        let rows = sqlx::query_as::<_, JoinedRow>(&format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM node_translation t
            INNER JOIN node n ON n.id = t.node_id
            WHERE t.lang = $1 AND (t.url IS NULL OR t.url = '')
            ORDER BY n.sequence_number DESC, t.id DESC
            "#
        ))
        .bind(lang)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch root url candidates")?;

        Ok(into_joined(rows))
    }

    async fn online_translations(&self, lang: &str) -> Result<Vec<TranslatedNode>> {
        let rows = sqlx::query_as::<_, JoinedRow>(&format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM node_translation t
            INNER JOIN node n ON n.id = t.node_id
            WHERE n.deleted = FALSE AND t.online = TRUE AND t.lang = $1
            ORDER BY n.sequence_number, t.id
            "#
        ))
        .bind(lang)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch online translations")?;

        Ok(into_joined(rows))
    }

    async fn root_translations(&self) -> Result<Vec<TranslatedNode>> {
        let rows = sqlx::query_as::<_, JoinedRow>(&format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM node_translation t
            INNER JOIN node n ON n.id = t.node_id
            WHERE n.parent_id IS NULL AND n.deleted = FALSE
            ORDER BY n.sequence_number, t.id
            "#
        ))
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch root translations")?;

        Ok(into_joined(rows))
    }

    async fn translation_for_page(&self, page: &PageRef) -> Result<Option<NodeTranslation>> {
        let Some(page_id) = page.id else {
            return Ok(None);
        };

        let translation = sqlx::query_as::<_, NodeTranslation>(
            r#"
            SELECT t.id, t.node_id, t.lang, t.online, t.title, t.slug, t.url,
                   t.public_node_version_id, t.created, t.changed
            FROM node_version v
            INNER JOIN node_translation t ON t.id = v.node_translation_id
            WHERE v.ref_entity_name = $1 AND v.ref_id = $2
            ORDER BY v.created DESC, v.id DESC
            LIMIT 1
            "#,
        )
        .bind(&page.entity_type)
        .bind(page_id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch translation for page")?;

        Ok(translation)
    }

    async fn find_version(&self, id: Uuid) -> Result<Option<NodeVersion>> {
        let version = sqlx::query_as::<_, NodeVersion>(&format!(
            "SELECT {VERSION_COLUMNS} FROM node_version WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch node version")?;

        Ok(version)
    }

    async fn insert_node(&self, input: NewNode) -> Result<Node> {
        let now = chrono::Utc::now().timestamp();

        let node = sqlx::query_as::<_, Node>(&format!(
            r#"
            INSERT INTO node (id, parent_id, internal_name, ref_entity_name, hidden_from_nav, created)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {NODE_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(input.parent_id)
        .bind(&input.internal_name)
        .bind(&input.ref_entity_name)
        .bind(input.hidden_from_nav)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .context("failed to create node")?;

        Ok(node)
    }

    async fn insert_translation(&self, input: NewNodeTranslation) -> Result<NodeTranslation> {
        let now = chrono::Utc::now().timestamp();

        let translation = sqlx::query_as::<_, NodeTranslation>(&format!(
            r#"
            INSERT INTO node_translation (id, node_id, lang, online, title, slug, url, created, changed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TRANSLATION_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(input.node_id)
        .bind(&input.lang)
        .bind(input.online)
        .bind(&input.title)
        .bind(normalize_slug(input.slug.as_deref()))
        .bind(normalize_url(input.url.as_deref()))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .context("failed to create node translation")?;

        Ok(translation)
    }

    async fn insert_version(&self, input: NewNodeVersion) -> Result<NodeVersion> {
        let now = chrono::Utc::now().timestamp();

        let version = sqlx::query_as::<_, NodeVersion>(&format!(
            r#"
            INSERT INTO node_version (id, node_translation_id, owner_id, ref_entity_name, ref_id, version_type, created)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {VERSION_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(input.node_translation_id)
        .bind(input.owner_id)
        .bind(&input.ref_entity_name)
        .bind(input.ref_id)
        .bind(&input.version_type)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .context("failed to create node version")?;

        Ok(version)
    }

    async fn insert_translation_with_public_version(
        &self,
        translation: NewNodeTranslation,
        version: NewPublicVersion,
    ) -> Result<(NodeTranslation, NodeVersion)> {
        let now = chrono::Utc::now().timestamp();
        let translation_id = Uuid::now_v7();
        let version_id = Uuid::now_v7();

        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to start transaction")?;

        // Translation first, without a public version.
        sqlx::query(
            r#"
            INSERT INTO node_translation (id, node_id, lang, online, title, slug, url, created, changed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(translation_id)
        .bind(translation.node_id)
        .bind(&translation.lang)
        .bind(translation.online)
        .bind(&translation.title)
        .bind(normalize_slug(translation.slug.as_deref()))
        .bind(normalize_url(translation.url.as_deref()))
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("failed to insert node translation")?;

        let version = version.for_translation(translation_id);
        let version = sqlx::query_as::<_, NodeVersion>(&format!(
            r#"
            INSERT INTO node_version (id, node_translation_id, owner_id, ref_entity_name, ref_id, version_type, created)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {VERSION_COLUMNS}
            "#
        ))
        .bind(version_id)
        .bind(version.node_translation_id)
        .bind(version.owner_id)
        .bind(&version.ref_entity_name)
        .bind(version.ref_id)
        .bind(&version.version_type)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .context("failed to insert public node version")?;

        let translation = sqlx::query_as::<_, NodeTranslation>(&format!(
            r#"
            UPDATE node_translation SET public_node_version_id = $1
            WHERE id = $2
            RETURNING {TRANSLATION_COLUMNS}
            "#
        ))
        .bind(version_id)
        .bind(translation_id)
        .fetch_one(&mut *tx)
        .await
        .context("failed to set public node version")?;

        tx.commit().await.context("failed to commit transaction")?;

        Ok((translation, version))
    }

    async fn set_public_version(&self, translation_id: Uuid, version_id: Uuid) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            UPDATE node_translation
            SET public_node_version_id = $1, changed = $2
            WHERE id = $3
              AND EXISTS (SELECT 1 FROM node_version WHERE id = $1 AND node_translation_id = $3)
            "#,
        )
        .bind(version_id)
        .bind(now)
        .bind(translation_id)
        .execute(&self.pool)
        .await
        .context("failed to set public node version")?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_deleted(&self, node_id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE node SET deleted = TRUE WHERE id = $1")
            .bind(node_id)
            .execute(&self.pool)
            .await
            .context("failed to mark node deleted")?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_healthy(&self) -> bool {
        crate::db::check_health(&self.pool).await
    }
}
