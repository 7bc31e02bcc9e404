use thiserror::Error;

/// Errors raised by a coordination store round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinationError {
  /// The node does not exist.
  #[error("no node at {path}")]
  NoNode { path: String },

  /// A node already exists where one was being created.
  #[error("node already exists at {path}")]
  NodeExists { path: String },

  /// The connection to the store was lost before a reply arrived.
  #[error("connection to coordination store lost")]
  ConnectionLoss,

  /// The client session expired.
  #[error("coordination session expired")]
  SessionExpired,

  /// A node's content could not be interpreted.
  #[error("malformed node at {path}: {message}")]
  MalformedNode { path: String, message: String },

  /// The caller cancelled while waiting on the store.
  #[error("interrupted while waiting on coordination store")]
  Interrupted,
}

impl CoordinationError {
  /// True when this error reflects caller cancellation, not a store anomaly.
  pub fn is_interrupted(&self) -> bool {
    matches!(self, CoordinationError::Interrupted)
  }

  /// True when the node was cleanly absent.
  pub fn is_no_node(&self) -> bool {
    matches!(self, CoordinationError::NoNode { .. })
  }
}
