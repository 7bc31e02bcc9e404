use std::sync::Arc;

use async_trait::async_trait;
use configset_loader::{ConfigSetFlags, ResourceLoader};
use tokio_util::sync::CancellationToken;

use crate::descriptor::CoreDescriptor;
use crate::error::ConfigSetError;

/// Where a core's configuration comes from.
///
/// [`ConfigSetService`](crate::ConfigSetService) holds one of these and calls
/// it for every core it loads.
#[async_trait]
pub trait ConfigSetProvider: Send + Sync {
  /// Build a resource loader for the core's configset.
  ///
  /// May record the configset chosen for the core in `cd`.
  async fn create_loader(
    &self,
    cd: &mut CoreDescriptor,
    cancel: &CancellationToken,
  ) -> Result<Arc<dyn ResourceLoader>, ConfigSetError>;

  /// Read the configset's flags through its loader.
  async fn load_flags(
    &self,
    cd: &CoreDescriptor,
    loader: &dyn ResourceLoader,
    cancel: &CancellationToken,
  ) -> Result<ConfigSetFlags, ConfigSetError>;

  /// Change-detection marker for one file of the core's configset.
  ///
  /// `None` means no marker is available and the file must not be served
  /// from cache.
  async fn current_modification_version(
    &self,
    cd: &CoreDescriptor,
    file: &str,
    cancel: &CancellationToken,
  ) -> Result<Option<i64>, ConfigSetError>;

  /// Label for logs.
  fn describe(&self, cd: &CoreDescriptor) -> String;
}
