use std::path::PathBuf;
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use configset_loader::{
  ConfigSetFlags, FsResourceLoader, ResourceLoader, validate_config_set_name,
};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::descriptor::CoreDescriptor;
use crate::error::ConfigSetError;
use crate::provider::ConfigSetProvider;

/// Configset provider backed by the local filesystem.
///
/// A core that names a configset reads from `{base}/{name}/conf`; any other
/// core reads from `{instance_dir}/conf`. Modification versions are file
/// modification times in milliseconds.
#[derive(Debug, Clone)]
pub struct StandaloneConfigSetProvider {
  config_set_base: PathBuf,
}

impl StandaloneConfigSetProvider {
  pub fn new(config_set_base: impl Into<PathBuf>) -> Self {
    Self {
      config_set_base: config_set_base.into(),
    }
  }

  /// Directory holding the core's configuration files.
  pub fn config_dir(&self, cd: &CoreDescriptor) -> Result<PathBuf, ConfigSetError> {
    match cd.config_set() {
      Some(name) => {
        validate_config_set_name(name)?;
        Ok(self.config_set_base.join(name).join("conf"))
      }
      None if cd.instance_dir().as_os_str().is_empty() => Err(ConfigSetError::InvalidArgument {
        message: format!("core '{}' has no instance directory", cd.name()),
      }),
      None => Ok(cd.instance_dir().join("conf")),
    }
  }
}

#[async_trait]
impl ConfigSetProvider for StandaloneConfigSetProvider {
  async fn create_loader(
    &self,
    cd: &mut CoreDescriptor,
    _cancel: &CancellationToken,
  ) -> Result<Arc<dyn ResourceLoader>, ConfigSetError> {
    Ok(Arc::new(FsResourceLoader::new(self.config_dir(cd)?)))
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
    if cancel.is_cancelled() {
      return Err(ConfigSetError::Cancelled);
    }

    let loader = FsResourceLoader::new(self.config_dir(cd)?);
    let path = loader.resource_path(file)?;

    let modified = match tokio::fs::metadata(&path).await.and_then(|m| m.modified()) {
      Ok(modified) => modified,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
      Err(e) => {
        warn!(
          path = %path.display(),
          error = %e,
          "unexpected error getting modification version"
        );
        return Ok(None);
      }
    };

    Ok(
      modified
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_millis()).ok()),
    )
  }

  fn describe(&self, cd: &CoreDescriptor) -> String {
    match cd.config_set() {
      Some(name) => format!("configset {}", name),
      None => format!("instancedir {}", cd.instance_dir().display()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_named_config_set_reads_from_base() {
    let base = tempfile::tempdir().unwrap();
    let conf = base.path().join("techproducts").join("conf");
    std::fs::create_dir_all(&conf).unwrap();
    std::fs::write(conf.join("managed-schema"), "<schema/>").unwrap();
    std::fs::write(conf.join("configsetprops.json"), r#"{"immutable": true}"#).unwrap();

    let provider = StandaloneConfigSetProvider::new(base.path());
    let cancel = CancellationToken::new();
    let mut cd =
      CoreDescriptor::new("techproducts", "", "/var/cores/tp").with_config_set("techproducts");

    let loader = provider.create_loader(&mut cd, &cancel).await.unwrap();
    let data = loader.open_resource("managed-schema", &cancel).await.unwrap();
    assert_eq!(&data[..], b"<schema/>");

    let flags = provider.load_flags(&cd, loader.as_ref(), &cancel).await.unwrap();
    assert!(flags.immutable());

    let version = provider
      .current_modification_version(&cd, "managed-schema", &cancel)
      .await
      .unwrap();
    assert!(version.is_some());

    let missing = provider
      .current_modification_version(&cd, "schema.xml", &cancel)
      .await
      .unwrap();
    assert_eq!(missing, None);
    assert_eq!(provider.describe(&cd), "configset techproducts");
  }

  #[tokio::test]
  async fn test_unnamed_config_set_reads_from_instance_dir() {
    let base = tempfile::tempdir().unwrap();
    let instance = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(instance.path().join("conf")).unwrap();
    std::fs::write(instance.path().join("conf").join("solrconfig.xml"), "<config/>").unwrap();

    let provider = StandaloneConfigSetProvider::new(base.path());
    let cancel = CancellationToken::new();
    let mut cd = CoreDescriptor::new("core1", "", instance.path());

    let loader = provider.create_loader(&mut cd, &cancel).await.unwrap();
    assert!(loader.resource_exists("solrconfig.xml", &cancel).await.unwrap());

    let flags = provider.load_flags(&cd, loader.as_ref(), &cancel).await.unwrap();
    assert!(flags.is_empty());
    assert!(provider.describe(&cd).starts_with("instancedir "));
  }

  #[tokio::test]
  async fn test_version_propagates_cancellation() {
    let base = tempfile::tempdir().unwrap();
    let provider = StandaloneConfigSetProvider::new(base.path());
    let cd = CoreDescriptor::new("core1", "", "/var/cores/c1").with_config_set("_default");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = provider
      .current_modification_version(&cd, "managed-schema", &cancel)
      .await
      .unwrap_err();
    assert!(err.is_cancelled());
  }

  #[test]
  fn test_rejects_unusable_config_set_names() {
    let provider = StandaloneConfigSetProvider::new("/var/configsets");
    for name in ["", "..", ".", "a/b"] {
      let cd = CoreDescriptor::new("core1", "", "/var/cores/c1").with_config_set(name);
      assert!(
        matches!(
          provider.config_dir(&cd),
          Err(ConfigSetError::InvalidArgument { .. })
        ),
        "accepted configset name {name:?}"
      );
    }
  }
}
