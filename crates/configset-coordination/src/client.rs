use std::future::Future;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::error::CoordinationError;
use crate::paths;

/// Node metadata returned without transferring the node's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
  /// Data version, bumped by the store on every content update.
  pub version: i32,

  /// Length of the node's content in bytes.
  pub data_length: usize,
}

/// Client capability for a hierarchical coordination store.
///
/// The connection behind an implementation is shared and externally owned.
/// Implementations must be safe to call concurrently and must not hold locks
/// across a pending round-trip.
#[async_trait]
pub trait CoordinationClient: Send + Sync {
  /// Stat a node. Returns `None` when the node does not exist.
  async fn exists(
    &self,
    path: &str,
    cancel: &CancellationToken,
  ) -> Result<Option<Stat>, CoordinationError>;

  /// Read a node's content along with its stat.
  ///
  /// A missing node is reported as [`CoordinationError::NoNode`].
  async fn get_data(
    &self,
    path: &str,
    cancel: &CancellationToken,
  ) -> Result<(Bytes, Stat), CoordinationError>;

  /// Read the configset name registered for a collection.
  ///
  /// The collection node holds a JSON object whose `configName` property
  /// names the configset.
  async fn read_config_name(
    &self,
    collection: &str,
    cancel: &CancellationToken,
  ) -> Result<String, CoordinationError> {
    let path = paths::collection_path(collection);
    let (data, _) = self.get_data(&path, cancel).await?;

    let props: serde_json::Value =
      serde_json::from_slice(&data).map_err(|e| CoordinationError::MalformedNode {
        path: path.clone(),
        message: e.to_string(),
      })?;

    match props.get(paths::CONFIG_NAME_PROP) {
      Some(serde_json::Value::String(name)) if !name.is_empty() => Ok(name.clone()),
      _ => Err(CoordinationError::MalformedNode {
        path,
        message: format!("missing '{}'", paths::CONFIG_NAME_PROP),
      }),
    }
  }
}

/// Run a coordination round-trip, giving up as soon as `cancel` fires.
///
/// A cancelled token wins over a ready result.
pub async fn cancellable<T, F>(cancel: &CancellationToken, op: F) -> Result<T, CoordinationError>
where
  F: Future<Output = Result<T, CoordinationError>>,
{
  tokio::select! {
    biased;
    _ = cancel.cancelled() => Err(CoordinationError::Interrupted),
    result = op => result,
  }
}
