use configset_coordination::CoordinationError;
use thiserror::Error;

/// Errors that can occur while loading configset resources.
#[derive(Debug, Error)]
pub enum LoaderError {
  /// No loader in the chain has the resource.
  #[error("resource not found: {name}")]
  NotFound { name: String },

  /// Loader construction or lookup was given an unusable argument.
  #[error("invalid argument: {message}")]
  InvalidArgument { message: String },

  /// The caller cancelled while a read was pending.
  #[error("resource load cancelled")]
  Cancelled,

  /// The coordination store failed while reading a resource.
  #[error("coordination error reading '{name}'")]
  Coordination {
    name: String,
    #[source]
    source: CoordinationError,
  },

  /// The configset properties resource is not a JSON object.
  #[error("invalid configset properties in '{name}': {message}")]
  InvalidFlags { name: String, message: String },

  /// An I/O error occurred.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl LoaderError {
  pub fn is_not_found(&self) -> bool {
    matches!(self, LoaderError::NotFound { .. })
  }
}
