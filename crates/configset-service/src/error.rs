use configset_coordination::CoordinationError;
use configset_loader::LoaderError;
use thiserror::Error;

/// Errors that can occur while preparing a core's configset.
#[derive(Debug, Error)]
pub enum ConfigSetError {
  /// The collection's configset mapping could not be read.
  #[error("trouble resolving configset for collection {collection}")]
  Resolution {
    collection: String,
    #[source]
    source: CoordinationError,
  },

  /// The caller cancelled while waiting on the coordination store.
  #[error("configset operation cancelled")]
  Cancelled,

  /// A loader or lookup was given an unusable argument.
  #[error("invalid argument: {message}")]
  InvalidArgument { message: String },

  /// Loading a configset resource failed.
  #[error("resource loading failed: {0}")]
  Loader(#[source] LoaderError),
}

impl ConfigSetError {
  pub fn is_cancelled(&self) -> bool {
    matches!(self, ConfigSetError::Cancelled)
  }
}

impl From<LoaderError> for ConfigSetError {
  fn from(e: LoaderError) -> Self {
    match e {
      LoaderError::Cancelled => ConfigSetError::Cancelled,
      LoaderError::InvalidArgument { message } => ConfigSetError::InvalidArgument { message },
      other => ConfigSetError::Loader(other),
    }
  }
}
