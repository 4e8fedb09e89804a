//! crates/diary_core/src/memory.rs
//!
//! In-process implementations of the collaborator ports. They back the test
//! suites and local runs without a database, and follow the same contracts as
//! the hosted services: whole-subtree reads, generated push keys, and updates
//! that refuse to create missing nodes.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::Identity;
use crate::paths::segments;
use crate::ports::{IdentityProvider, PortError, PortResult, TreeStore};
use crate::push_id::PushIdGenerator;

//=========================================================================================
// MemoryTree
//=========================================================================================

/// A JSON tree held in memory.
#[derive(Debug)]
pub struct MemoryTree {
    root: RwLock<Value>,
    ids: PushIdGenerator,
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self {
            root: RwLock::new(Value::Object(Map::new())),
            ids: PushIdGenerator::new(),
        }
    }
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites whatever is stored at `path`, creating intermediate nodes.
    pub async fn set(&self, path: &str, value: Value) -> PortResult<()> {
        let mut root = self.root.write().await;
        let mut keys: Vec<&str> = segments(path).collect();
        let last = keys
            .pop()
            .ok_or_else(|| PortError::Unexpected("cannot overwrite the tree root".to_string()))?;
        let parent = object_at_mut(&mut root, &keys)?;
        parent.insert(last.to_string(), value);
        Ok(())
    }
}

/// Walks (and creates) objects along `keys`.
fn object_at_mut<'a>(root: &'a mut Value, keys: &[&str]) -> PortResult<&'a mut Map<String, Value>> {
    let mut node = root
        .as_object_mut()
        .ok_or_else(|| PortError::Unexpected("tree root is not an object".to_string()))?;
    for key in keys {
        let child = node
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        node = child
            .as_object_mut()
            .ok_or_else(|| PortError::Unexpected(format!("'{}' is not an object node", key)))?;
    }
    Ok(node)
}

/// Converts a tree path into a JSON pointer.
fn pointer(path: &str) -> String {
    segments(path)
        .map(|key| format!("/{}", key.replace('~', "~0")))
        .collect()
}

#[async_trait]
impl TreeStore for MemoryTree {
    async fn get(&self, path: &str) -> PortResult<Option<Value>> {
        let root = self.root.read().await;
        Ok(root
            .pointer(&pointer(path))
            .filter(|v| !v.is_null())
            .cloned())
    }

    async fn push(&self, path: &str, value: Value) -> PortResult<String> {
        let key = self.ids.next_id();
        let mut root = self.root.write().await;
        let keys: Vec<&str> = segments(path).collect();
        object_at_mut(&mut root, &keys)?.insert(key.clone(), value);
        Ok(key)
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> PortResult<()> {
        let mut root = self.root.write().await;
        let target = root
            .pointer_mut(&pointer(path))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| PortError::NotFound(path.to_string()))?;
        for (field, value) in fields {
            if value.is_null() {
                target.remove(&field);
            } else {
                target.insert(field, value);
            }
        }
        Ok(())
    }
}

//=========================================================================================
// MemorySessions
//=========================================================================================

/// Session credentials known to an in-process identity provider.
#[derive(Debug, Default)]
pub struct MemorySessions {
    sessions: RwLock<HashMap<String, Identity>>,
}

impl MemorySessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sign_in(&self, credential: impl Into<String>, identity: Identity) {
        self.sessions.write().await.insert(credential.into(), identity);
    }
}

#[async_trait]
impl IdentityProvider for MemorySessions {
    async fn current_identity(&self, credential: &str) -> PortResult<Option<Identity>> {
        Ok(self.sessions.read().await.get(credential).cloned())
    }

    async fn sign_out(&self, credential: &str) -> PortResult<()> {
        self.sessions.write().await.remove(credential);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn get_reads_nested_values_and_missing_paths() {
        let tree = MemoryTree::new();
        tree.set("users/u1", json!({ "name": "Aiko" })).await.unwrap();

        assert_eq!(tree.get("users/u1/name").await.unwrap(), Some(json!("Aiko")));
        assert_eq!(tree.get("users/u2/name").await.unwrap(), None);
        assert_eq!(tree.get("users/u1/name/deeper").await.unwrap(), None);
    }

    #[tokio::test]
    async fn push_appends_under_generated_keys_in_order() {
        let tree = MemoryTree::new();
        let first = tree.push("chats/c/messages", json!({ "n": 1 })).await.unwrap();
        let second = tree.push("chats/c/messages", json!({ "n": 2 })).await.unwrap();
        assert!(first < second);

        let messages = tree.get("chats/c/messages").await.unwrap().unwrap();
        let keys: Vec<&String> = messages.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec![&first, &second]);
    }

    #[tokio::test]
    async fn update_merges_existing_nodes_only() {
        let tree = MemoryTree::new();
        let key = tree.push("chats/c/messages", json!({ "memo": "m" })).await.unwrap();
        let path = format!("chats/c/messages/{}", key);

        let mut fields = Map::new();
        fields.insert("advice".into(), json!("good"));
        tree.update(&path, fields.clone()).await.unwrap();
        assert_eq!(
            tree.get(&path).await.unwrap(),
            Some(json!({ "memo": "m", "advice": "good" }))
        );

        let err = tree.update("chats/c/messages/nope", fields).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
        assert_eq!(tree.get("chats/c/messages/nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn sessions_resolve_until_signed_out() {
        let sessions = MemorySessions::new();
        sessions.sign_in("tok", Identity::new("u1")).await;

        assert_eq!(
            sessions.current_identity("tok").await.unwrap(),
            Some(Identity::new("u1"))
        );
        sessions.sign_out("tok").await.unwrap();
        sessions.sign_out("tok").await.unwrap();
        assert_eq!(sessions.current_identity("tok").await.unwrap(), None);
    }
}
