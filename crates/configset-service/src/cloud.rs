use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use configset_coordination::{CoordinationClient, CoordinationError};
use configset_loader::{
  ConfigSetFlags, CoordinationResourceLoader, ResourceLoader, config_node_path,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::descriptor::CoreDescriptor;
use crate::error::ConfigSetError;
use crate::provider::ConfigSetProvider;

/// Configset provider backed by the coordination store.
///
/// The collection-to-configset mapping and every configuration file are read
/// from the store. The client is shared; nothing here takes a lock around a
/// round-trip, so concurrent calls for different cores are fine.
pub struct CloudConfigSetProvider {
  client: Arc<dyn CoordinationClient>,
  parent: Option<Arc<dyn ResourceLoader>>,
}

impl CloudConfigSetProvider {
  pub fn new(client: Arc<dyn CoordinationClient>) -> Self {
    Self {
      client,
      parent: None,
    }
  }

  /// Loader consulted for resources the configset does not carry.
  pub fn with_parent_loader(mut self, parent: Arc<dyn ResourceLoader>) -> Self {
    self.parent = Some(parent);
    self
  }

  /// Resolve the configset registered for the core's collection and record
  /// it on the descriptor.
  ///
  /// Any configset already on the descriptor is replaced. On failure the
  /// descriptor is left untouched. Failures are not retried here.
  pub async fn resolve(
    &self,
    cd: &mut CoreDescriptor,
    cancel: &CancellationToken,
  ) -> Result<String, ConfigSetError> {
    let collection = cd.collection_name();
    if collection.is_empty() {
      return Err(ConfigSetError::InvalidArgument {
        message: format!("core '{}' has no collection", cd.name()),
      });
    }

    let config_set = match self.client.read_config_name(collection, cancel).await {
      Ok(name) => name,
      Err(CoordinationError::Interrupted) => return Err(ConfigSetError::Cancelled),
      Err(source) => {
        return Err(ConfigSetError::Resolution {
          collection: collection.to_string(),
          source,
        });
      }
    };

    if let Some(previous) = cd.config_set()
      && previous != config_set
    {
      debug!(
        core = %cd.name(),
        ignored = %previous,
        config_set = %config_set,
        "replacing descriptor configset with coordination store mapping"
      );
    }

    cd.set_config_set(config_set.clone());
    Ok(config_set)
  }

  /// Build a loader whose reads are rooted at `/configs/<config_set>`.
  ///
  /// No coordination I/O happens until the loader is used.
  pub fn create_scoped_loader(
    &self,
    instance_dir: &Path,
    config_set: &str,
  ) -> Result<CoordinationResourceLoader, ConfigSetError> {
    Ok(CoordinationResourceLoader::new(
      instance_dir,
      config_set,
      self.client.clone(),
      self.parent.clone(),
    )?)
  }

  /// Version counter of `/configs/<config_set>/<file>`, read without
  /// transferring the file.
  ///
  /// A missing node yields `None`. Other store errors are logged and also
  /// yield `None`; a real problem shows up once the file itself is read.
  /// Cancellation is the exception and is returned as an error.
  ///
  /// `file` is normalised as the loader normalises resource names, so the
  /// version always describes the node the loader reads.
  pub async fn modification_version(
    &self,
    config_set: &str,
    file: &str,
    cancel: &CancellationToken,
  ) -> Result<Option<i64>, ConfigSetError> {
    let path = config_node_path(config_set, file)?;

    match self.client.exists(&path, cancel).await {
      Ok(Some(stat)) => Ok(Some(i64::from(stat.version))),
      Ok(None) | Err(CoordinationError::NoNode { .. }) => Ok(None),
      Err(CoordinationError::Interrupted) => Err(ConfigSetError::Cancelled),
      Err(e) => {
        warn!(
          path = %path,
          error = %e,
          "unexpected error getting modification version"
        );
        Ok(None)
      }
    }
  }
}

#[async_trait]
impl ConfigSetProvider for CloudConfigSetProvider {
  async fn create_loader(
    &self,
    cd: &mut CoreDescriptor,
    cancel: &CancellationToken,
  ) -> Result<Arc<dyn ResourceLoader>, ConfigSetError> {
    let config_set = self.resolve(cd, cancel).await?;
    let loader = self.create_scoped_loader(cd.instance_dir(), &config_set)?;
    Ok(Arc::new(loader))
  }

  async fn load_flags(
    &self,
    _cd: &CoreDescriptor,
    loader: &dyn ResourceLoader,
    cancel: &CancellationToken,
  ) -> Result<ConfigSetFlags, ConfigSetError> {
    Ok(ConfigSetFlags::read_from_loader(loader, ".", cancel).await?)
  }

  async fn current_modification_version(
    &self,
    cd: &CoreDescriptor,
    file: &str,
    cancel: &CancellationToken,
  ) -> Result<Option<i64>, ConfigSetError> {
    match cd.config_set() {
      Some(config_set) => self.modification_version(config_set, file, cancel).await,
      None => Err(ConfigSetError::InvalidArgument {
        message: format!("core '{}' has no resolved configset", cd.name()),
      }),
    }
  }

  fn describe(&self, cd: &CoreDescriptor) -> String {
    format!("configset {}", cd.config_set().unwrap_or("<unresolved>"))
  }
}
