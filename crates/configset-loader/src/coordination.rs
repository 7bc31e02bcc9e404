use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use configset_coordination::{CoordinationClient, CoordinationError, paths};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::LoaderError;
use crate::loader::{ResourceLoader, config_node_path, validate_config_set_name};

/// Resource loader whose reads are rooted at a configset in the coordination
/// store.
///
/// Construction performs no I/O. Each read first tries
/// `/configs/<config_set>/<name>`; when the node is absent the parent loader,
/// if any, is asked instead.
pub struct CoordinationResourceLoader {
  instance_dir: PathBuf,
  config_set: String,
  config_set_path: String,
  client: Arc<dyn CoordinationClient>,
  parent: Option<Arc<dyn ResourceLoader>>,
}

impl CoordinationResourceLoader {
  /// Create a loader for `config_set`.
  ///
  /// Fails with [`LoaderError::InvalidArgument`] when the configset name is
  /// not a single path segment or the instance directory is empty.
  pub fn new(
    instance_dir: impl Into<PathBuf>,
    config_set: impl Into<String>,
    client: Arc<dyn CoordinationClient>,
    parent: Option<Arc<dyn ResourceLoader>>,
  ) -> Result<Self, LoaderError> {
    let instance_dir = instance_dir.into();
    let config_set = config_set.into();

    validate_config_set_name(&config_set)?;
    if instance_dir.as_os_str().is_empty() {
      return Err(LoaderError::InvalidArgument {
        message: "instance directory must not be empty".to_string(),
      });
    }

    let config_set_path = paths::config_set_path(&config_set);
    Ok(Self {
      instance_dir,
      config_set,
      config_set_path,
      client,
      parent,
    })
  }

  /// The configset this loader reads from.
  pub fn config_set(&self) -> &str {
    &self.config_set
  }

  /// The coordination path every read is rooted at.
  pub fn config_set_path(&self) -> &str {
    &self.config_set_path
  }

  pub fn instance_dir(&self) -> &Path {
    &self.instance_dir
  }

  /// Coordination path for a resource name.
  pub fn node_path(&self, name: &str) -> Result<String, LoaderError> {
    config_node_path(&self.config_set, name)
  }
}

#[async_trait]
impl ResourceLoader for CoordinationResourceLoader {
  async fn open_resource(
    &self,
    name: &str,
    cancel: &CancellationToken,
  ) -> Result<Bytes, LoaderError> {
    let path = self.node_path(name)?;

    match self.client.get_data(&path, cancel).await {
      Ok((data, stat)) => {
        debug!(path = %path, version = stat.version, "loaded resource from coordination store");
        Ok(data)
      }
      Err(CoordinationError::NoNode { .. }) => match &self.parent {
        Some(parent) => parent.open_resource(name, cancel).await,
        None => Err(LoaderError::NotFound {
          name: name.to_string(),
        }),
      },
      Err(CoordinationError::Interrupted) => Err(LoaderError::Cancelled),
      Err(source) => Err(LoaderError::Coordination {
        name: path,
        source,
      }),
    }
  }

  fn describe(&self) -> String {
    self.config_set_path.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use configset_coordination::{InMemoryCoordinationStore, Stat};

  fn store_with_schema() -> Arc<InMemoryCoordinationStore> {
    let store = InMemoryCoordinationStore::new();
    store
      .create("/configs/_default/managed-schema", "<schema name=\"default\"/>")
      .unwrap();
    Arc::new(store)
  }

  /// Client that fails every call with a fixed error.
  struct FailingClient(CoordinationError);

  #[async_trait]
  impl CoordinationClient for FailingClient {
    async fn exists(
      &self,
      _path: &str,
      _cancel: &CancellationToken,
    ) -> Result<Option<Stat>, CoordinationError> {
      Err(self.0.clone())
    }

    async fn get_data(
      &self,
      _path: &str,
      _cancel: &CancellationToken,
    ) -> Result<(Bytes, Stat), CoordinationError> {
      Err(self.0.clone())
    }
  }

  #[test]
  fn test_construction_validates_arguments() {
    let store = store_with_schema();

    assert!(matches!(
      CoordinationResourceLoader::new("/var/cores/c1", "", store.clone(), None),
      Err(LoaderError::InvalidArgument { .. })
    ));
    assert!(matches!(
      CoordinationResourceLoader::new("", "_default", store.clone(), None),
      Err(LoaderError::InvalidArgument { .. })
    ));
    assert!(matches!(
      CoordinationResourceLoader::new("/var/cores/c1", "a/b", store.clone(), None),
      Err(LoaderError::InvalidArgument { .. })
    ));

    let loader = CoordinationResourceLoader::new("/var/cores/c1", "_default", store, None).unwrap();
    assert_eq!(loader.config_set_path(), "/configs/_default");
    assert_eq!(
      loader.node_path("./managed-schema").unwrap(),
      "/configs/_default/managed-schema"
    );
  }

  #[tokio::test]
  async fn test_reads_are_rooted_at_config_set() {
    let loader =
      CoordinationResourceLoader::new("/var/cores/c1", "_default", store_with_schema(), None)
        .unwrap();
    let cancel = CancellationToken::new();

    let data = loader.open_resource("managed-schema", &cancel).await.unwrap();
    assert_eq!(&data[..], b"<schema name=\"default\"/>");

    let err = loader.open_resource("solrconfig.xml", &cancel).await.unwrap_err();
    assert!(err.is_not_found());
  }

  #[tokio::test]
  async fn test_falls_back_to_parent_loader() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("stopwords.txt"), "a\nthe\n").unwrap();
    let parent: Arc<dyn ResourceLoader> = Arc::new(crate::FsResourceLoader::new(dir.path()));

    let loader = CoordinationResourceLoader::new(
      "/var/cores/c1",
      "_default",
      store_with_schema(),
      Some(parent),
    )
    .unwrap();
    let cancel = CancellationToken::new();

    let data = loader.open_resource("stopwords.txt", &cancel).await.unwrap();
    assert_eq!(&data[..], b"a\nthe\n");
    assert!(loader.resource_exists("managed-schema", &cancel).await.unwrap());
  }

  #[tokio::test]
  async fn test_classifies_coordination_failures() {
    let cancel = CancellationToken::new();

    let loader = CoordinationResourceLoader::new(
      "/var/cores/c1",
      "_default",
      Arc::new(FailingClient(CoordinationError::ConnectionLoss)),
      None,
    )
    .unwrap();
    assert!(matches!(
      loader.open_resource("managed-schema", &cancel).await,
      Err(LoaderError::Coordination {
        source: CoordinationError::ConnectionLoss,
        ..
      })
    ));

    let loader = CoordinationResourceLoader::new(
      "/var/cores/c1",
      "_default",
      Arc::new(FailingClient(CoordinationError::Interrupted)),
      None,
    )
    .unwrap();
    assert!(matches!(
      loader.open_resource("managed-schema", &cancel).await,
      Err(LoaderError::Cancelled)
    ));
  }
}
