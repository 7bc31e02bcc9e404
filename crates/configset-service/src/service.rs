use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use configset_loader::{ConfigSetFlags, LoaderError, ResourceLoader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ServiceConfig;
use crate::descriptor::CoreDescriptor;
use crate::error::ConfigSetError;
use crate::provider::ConfigSetProvider;

/// Everything a core needs from its configset.
pub struct LoadedConfigSet {
  /// Label from [`ConfigSetProvider::describe`].
  pub name: String,

  /// Loader scoped to the configset.
  pub loader: Arc<dyn ResourceLoader>,

  /// Configset flags; empty when the configset carries none.
  pub flags: ConfigSetFlags,

  /// Raw schema resource, if the configset has one.
  pub schema: Option<Bytes>,

  /// Modification version the schema was read at, if known.
  pub schema_version: Option<i64>,
}

#[derive(Debug, Clone)]
struct SharedSchema {
  version: i64,
  data: Bytes,
}

/// Loads configsets for cores through a pluggable provider.
///
/// With `share_schema` enabled, a schema read at a known modification version
/// is kept and handed to later cores of the same configset until the version
/// changes. A schema without a version is never shared.
pub struct ConfigSetService {
  provider: Arc<dyn ConfigSetProvider>,
  config: ServiceConfig,
  schemas: Mutex<HashMap<String, SharedSchema>>,
}

impl ConfigSetService {
  pub fn new(provider: Arc<dyn ConfigSetProvider>, config: ServiceConfig) -> Self {
    Self {
      provider,
      config,
      schemas: Mutex::new(HashMap::new()),
    }
  }

  pub fn provider(&self) -> &Arc<dyn ConfigSetProvider> {
    &self.provider
  }

  pub fn config(&self) -> &ServiceConfig {
    &self.config
  }

  /// Prepare the configset for a core.
  ///
  /// Resolution and cancellation failures abort the load.
  pub async fn load(
    &self,
    cd: &mut CoreDescriptor,
    cancel: &CancellationToken,
  ) -> Result<LoadedConfigSet, ConfigSetError> {
    let loader = self.provider.create_loader(cd, cancel).await?;
    let flags = self.provider.load_flags(cd, loader.as_ref(), cancel).await?;
    let name = self.provider.describe(cd);

    let (schema, schema_version) = self.load_schema(cd, &name, loader.as_ref(), cancel).await?;

    info!(
      core = %cd.name(),
      configset = %name,
      schema_version = ?schema_version,
      "loaded configset"
    );

    Ok(LoadedConfigSet {
      name,
      loader,
      flags,
      schema,
      schema_version,
    })
  }

  async fn load_schema(
    &self,
    cd: &CoreDescriptor,
    name: &str,
    loader: &dyn ResourceLoader,
    cancel: &CancellationToken,
  ) -> Result<(Option<Bytes>, Option<i64>), ConfigSetError> {
    let schema_file = &self.config.schema_file;
    let version = self
      .provider
      .current_modification_version(cd, schema_file, cancel)
      .await?;

    if self.config.share_schema
      && let Some(version) = version
      && let Some(shared) = self.shared_schema(name, version)
    {
      debug!(configset = %name, version, "reusing shared schema");
      return Ok((Some(shared), Some(version)));
    }

    let schema = match loader.open_resource(schema_file, cancel).await {
      Ok(data) => Some(data),
      Err(LoaderError::NotFound { .. }) => None,
      Err(e) => return Err(e.into()),
    };

    if self.config.share_schema
      && let (Some(version), Some(data)) = (version, &schema)
    {
      self.schemas_guard().insert(
        name.to_string(),
        SharedSchema {
          version,
          data: data.clone(),
        },
      );
    }

    Ok((schema, version))
  }

  fn shared_schema(&self, name: &str, version: i64) -> Option<Bytes> {
    self
      .schemas_guard()
      .get(name)
      .filter(|shared| shared.version == version)
      .map(|shared| shared.data.clone())
  }

  fn schemas_guard(&self) -> std::sync::MutexGuard<'_, HashMap<String, SharedSchema>> {
    self.schemas.lock().unwrap_or_else(|e| e.into_inner())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::StandaloneConfigSetProvider;

  #[tokio::test]
  async fn test_load_without_schema() {
    let base = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(base.path().join("empty").join("conf")).unwrap();

    let provider = Arc::new(StandaloneConfigSetProvider::new(base.path()));
    let service = ConfigSetService::new(provider, ServiceConfig::default());
    let mut cd = CoreDescriptor::new("core1", "", "/var/cores/c1").with_config_set("empty");

    let loaded = service.load(&mut cd, &CancellationToken::new()).await.unwrap();
    assert_eq!(loaded.name, "configset empty");
    assert!(loaded.schema.is_none());
    assert!(loaded.schema_version.is_none());
    assert!(loaded.flags.is_empty());
  }

  #[tokio::test]
  async fn test_schema_shared_for_same_version() {
    let base = tempfile::tempdir().unwrap();
    let conf = base.path().join("shared").join("conf");
    std::fs::create_dir_all(&conf).unwrap();
    std::fs::write(conf.join("managed-schema"), "<schema/>").unwrap();

    let provider = Arc::new(StandaloneConfigSetProvider::new(base.path()));
    let service = ConfigSetService::new(provider, ServiceConfig::default());
    let cancel = CancellationToken::new();

    let mut first = CoreDescriptor::new("core1", "", "/var/cores/c1").with_config_set("shared");
    let loaded = service.load(&mut first, &cancel).await.unwrap();
    assert_eq!(loaded.schema.as_deref(), Some(&b"<schema/>"[..]));

    let version = loaded.schema_version.unwrap();
    assert!(service.shared_schema("configset shared", version).is_some());
  }
}
