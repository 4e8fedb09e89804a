//! services/diary_api/src/adapters/db.rs
//!
//! This module contains the database adapter, the concrete implementation of
//! the `TreeStore` and `IdentityProvider` ports from the `core` crate. It keeps
//! the tree in PostgreSQL using `sqlx`: one row per stored node, keyed by its
//! full path, holding a JSONB value.

use async_trait::async_trait;
use diary_core::paths::segments;
use diary_core::ports::{IdentityProvider, PortError, PortResult, TreeStore};
use diary_core::Identity;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the collaborator ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct NodeRecord {
    path: String,
    value: Json<Value>,
}

#[derive(FromRow)]
struct SessionRecord {
    user_id: String,
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// Path Helpers
//=========================================================================================

/// `a//b/` and `/a/b` both address `a/b`.
fn normalize(path: &str) -> String {
    segments(path).collect::<Vec<_>>().join("/")
}

/// The path itself and every ancestor, shortest first.
fn self_and_ancestors(path: &str) -> Vec<String> {
    let mut prefixes: Vec<String> = Vec::new();
    for key in segments(path) {
        let next = match prefixes.last() {
            Some(parent) => format!("{}/{}", parent, key),
            None => key.to_string(),
        };
        prefixes.push(next);
    }
    prefixes
}

/// A `LIKE` pattern matching every path strictly below `path`.
fn descendants_pattern(path: &str) -> String {
    let escaped = path
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    if escaped.is_empty() {
        "%".to_string()
    } else {
        format!("{}/%", escaped)
    }
}

fn pointer<'a>(keys: impl Iterator<Item = &'a str>) -> String {
    keys.map(|key| format!("/{}", key.replace('~', "~0")))
        .collect()
}

/// Places `value` at `keys` inside `root`, turning anything in the way into an object.
fn insert_at<'a>(root: &mut Value, keys: impl Iterator<Item = &'a str>, value: Value) {
    let mut keys = keys.peekable();
    let mut node = root;
    while let Some(key) = keys.next() {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(object) = node else {
            return;
        };
        if keys.peek().is_none() {
            object.insert(key.to_string(), value);
            return;
        }
        node = object
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

/// Applies an update's fields: `null` removes the field.
fn merge_fields(target: &mut Map<String, Value>, fields: Map<String, Value>) {
    for (field, value) in fields {
        if value.is_null() {
            target.remove(&field);
        } else {
            target.insert(field, value);
        }
    }
}

//=========================================================================================
// `TreeStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl TreeStore for DbAdapter {
    async fn get(&self, path: &str) -> PortResult<Option<Value>> {
        let path = normalize(path);
        // Shallow rows first so deeper rows land on top of them.
        let records = sqlx::query_as::<_, NodeRecord>(
            r#"
            SELECT path, value FROM tree_nodes
            WHERE path = ANY($1) OR path LIKE $2 ESCAPE '\'
            ORDER BY length(path) - length(replace(path, '/', '')), seq
            "#,
        )
        .bind(self_and_ancestors(&path))
        .bind(descendants_pattern(&path))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        if records.is_empty() {
            return Ok(None);
        }
        let mut root = Value::Object(Map::new());
        for record in records {
            insert_at(&mut root, segments(&record.path), record.value.0);
        }
        Ok(root
            .pointer(&pointer(segments(&path)))
            .filter(|v| !v.is_null())
            .cloned())
    }

    async fn push(&self, path: &str, value: Value) -> PortResult<String> {
        let path = normalize(path);
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };
        // Keys come from a database sequence, so they sort in insertion order
        // across every process writing to the same database.
        let key: String = sqlx::query_scalar(
            r#"
            INSERT INTO tree_nodes (path, value)
            SELECT $1 || lpad(to_hex(nextval('tree_push_keys')), 16, '0'), $2
            RETURNING substr(path, length($1) + 1)
            "#,
        )
        .bind(&prefix)
        .bind(Json(value))
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        debug!("Pushed node {}{}", prefix, key);
        Ok(key)
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> PortResult<()> {
        let path = normalize(path);
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let stored = sqlx::query_as::<_, NodeRecord>(
            r#"
            SELECT path, value FROM tree_nodes
            WHERE path = ANY($1)
            ORDER BY length(path) DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(self_and_ancestors(&path))
        .fetch_optional(&mut *tx)
        .await
        .map_err(unexpected)?;

        match stored {
            Some(record) => {
                let depth = segments(&record.path).count();
                let mut value = record.value.0;
                let target = value
                    .pointer_mut(&pointer(segments(&path).skip(depth)))
                    .and_then(Value::as_object_mut)
                    .ok_or_else(|| PortError::NotFound(path.clone()))?;
                merge_fields(target, fields);
                sqlx::query("UPDATE tree_nodes SET value = $2, updated_at = now() WHERE path = $1")
                    .bind(&record.path)
                    .bind(Json(value))
                    .execute(&mut *tx)
                    .await
                    .map_err(unexpected)?;
            }
            None => {
                // The node may exist only through its children.
                let has_children: bool = sqlx::query_scalar(
                    r#"SELECT EXISTS (SELECT 1 FROM tree_nodes WHERE path LIKE $1 ESCAPE '\')"#,
                )
                .bind(descendants_pattern(&path))
                .fetch_one(&mut *tx)
                .await
                .map_err(unexpected)?;
                if !has_children || path.is_empty() {
                    return Err(PortError::NotFound(path));
                }
                let mut value = Map::new();
                merge_fields(&mut value, fields);
                sqlx::query("INSERT INTO tree_nodes (path, value) VALUES ($1, $2)")
                    .bind(&path)
                    .bind(Json(Value::Object(value)))
                    .execute(&mut *tx)
                    .await
                    .map_err(unexpected)?;
            }
        }

        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }
}

//=========================================================================================
// `IdentityProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl IdentityProvider for DbAdapter {
    async fn current_identity(&self, credential: &str) -> PortResult<Option<Identity>> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(credential)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| Identity::new(r.user_id)))
    }

    async fn sign_out(&self, credential: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(credential)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
