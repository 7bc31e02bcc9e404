use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::{CoordinationClient, Stat, cancellable};
use crate::error::CoordinationError;
use crate::paths;

/// Serializable contents of a coordination tree.
///
/// ```json
/// {
///   "collections": { "gettingstarted": "_default" },
///   "nodes": { "/configs/_default/managed-schema": "<schema/>" }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeSnapshot {
  /// Collection name to configset name.
  #[serde(default)]
  pub collections: BTreeMap<String, String>,

  /// Node path to textual content.
  #[serde(default)]
  pub nodes: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct Node {
  data: Bytes,
  version: i32,
}

impl Node {
  /// The store's counter wraps rather than overflowing.
  fn update(&mut self, data: Bytes) {
    self.data = data;
    self.version = self.version.wrapping_add(1);
  }

  fn stat(&self) -> Stat {
    Stat {
      version: self.version,
      data_length: self.data.len(),
    }
  }
}

/// In-memory coordination store.
///
/// Suitable for tests and for serving a tree snapshot locally. Nodes start at
/// version 0 and every `set_data` bumps the version by one.
#[derive(Debug, Default)]
pub struct InMemoryCoordinationStore {
  nodes: RwLock<HashMap<String, Node>>,
}

impl InMemoryCoordinationStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a store populated from a snapshot.
  pub fn from_snapshot(snapshot: TreeSnapshot) -> Result<Self, CoordinationError> {
    let store = Self::new();
    for (collection, config_set) in &snapshot.collections {
      store.set_collection_config(collection, config_set)?;
    }
    for (path, content) in snapshot.nodes {
      store.create(&path, content)?;
    }
    Ok(store)
  }

  /// Create a node at version 0.
  pub fn create(&self, path: &str, data: impl Into<Bytes>) -> Result<Stat, CoordinationError> {
    let mut nodes = self.write();
    if nodes.contains_key(path) {
      return Err(CoordinationError::NodeExists {
        path: path.to_string(),
      });
    }
    let node = Node {
      data: data.into(),
      version: 0,
    };
    let stat = node.stat();
    nodes.insert(path.to_string(), node);
    debug!(path = %path, "created node");
    Ok(stat)
  }

  /// Replace a node's content and bump its version.
  pub fn set_data(&self, path: &str, data: impl Into<Bytes>) -> Result<Stat, CoordinationError> {
    let mut nodes = self.write();
    let node = nodes
      .get_mut(path)
      .ok_or_else(|| CoordinationError::NoNode {
        path: path.to_string(),
      })?;
    node.update(data.into());
    debug!(path = %path, version = node.version, "updated node");
    Ok(node.stat())
  }

  /// Delete a node.
  pub fn delete(&self, path: &str) -> Result<(), CoordinationError> {
    match self.write().remove(path) {
      Some(_) => Ok(()),
      None => Err(CoordinationError::NoNode {
        path: path.to_string(),
      }),
    }
  }

  /// Register (or re-point) the configset used by a collection.
  pub fn set_collection_config(
    &self,
    collection: &str,
    config_set: &str,
  ) -> Result<Stat, CoordinationError> {
    let path = paths::collection_path(collection);
    let data = Bytes::from(serde_json::json!({ "configName": config_set }).to_string());

    let mut nodes = self.write();
    let stat = match nodes.entry(path) {
      Entry::Occupied(mut entry) => {
        entry.get_mut().update(data);
        entry.get().stat()
      }
      Entry::Vacant(entry) => entry.insert(Node { data, version: 0 }).stat(),
    };
    debug!(collection = %collection, config_set = %config_set, "registered collection configset");
    Ok(stat)
  }

  fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Node>> {
    self.nodes.read().unwrap_or_else(|e| e.into_inner())
  }

  fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Node>> {
    self.nodes.write().unwrap_or_else(|e| e.into_inner())
  }
}

#[async_trait]
impl CoordinationClient for InMemoryCoordinationStore {
  async fn exists(
    &self,
    path: &str,
    cancel: &CancellationToken,
  ) -> Result<Option<Stat>, CoordinationError> {
    cancellable(cancel, async { Ok(self.read().get(path).map(Node::stat)) }).await
  }

  async fn get_data(
    &self,
    path: &str,
    cancel: &CancellationToken,
  ) -> Result<(Bytes, Stat), CoordinationError> {
    cancellable(cancel, async {
      self
        .read()
        .get(path)
        .map(|node| (node.data.clone(), node.stat()))
        .ok_or_else(|| CoordinationError::NoNode {
          path: path.to_string(),
        })
    })
    .await
  }
}
