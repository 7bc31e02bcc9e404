use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio_util::sync::CancellationToken;

use crate::error::LoaderError;
use crate::loader::{ResourceLoader, normalize_resource_name};

/// Filesystem-based resource loader.
///
/// Each resource is read from `{root}/{name}`.
#[derive(Debug, Clone)]
pub struct FsResourceLoader {
  root: PathBuf,
}

impl FsResourceLoader {
  /// Create a new loader rooted at the given directory.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Get the root directory of the loader.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Resolve a resource name to a path under the root.
  pub fn resource_path(&self, name: &str) -> Result<PathBuf, LoaderError> {
    let name = normalize_resource_name(name)?;
    if name.is_empty() {
      Ok(self.root.clone())
    } else {
      Ok(self.root.join(name))
    }
  }
}

#[async_trait]
impl ResourceLoader for FsResourceLoader {
  async fn open_resource(
    &self,
    name: &str,
    cancel: &CancellationToken,
  ) -> Result<Bytes, LoaderError> {
    if cancel.is_cancelled() {
      return Err(LoaderError::Cancelled);
    }

    let path = self.resource_path(name)?;
    match fs::read(&path).await {
      Ok(data) => Ok(Bytes::from(data)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(LoaderError::NotFound {
        name: name.to_string(),
      }),
      Err(e) => Err(LoaderError::Io(e)),
    }
  }

  fn describe(&self) -> String {
    self.root.display().to_string()
  }
}
