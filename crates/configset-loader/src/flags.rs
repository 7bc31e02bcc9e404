use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::error::LoaderError;
use crate::loader::ResourceLoader;

/// Conventional name of the configset properties resource.
pub const CONFIGSET_PROPERTIES_FILE: &str = "configsetprops.json";

const IMMUTABLE_KEY: &str = "immutable";
const TRUSTED_KEY: &str = "trusted";

/// Small property bag attached to a configset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSetFlags {
  props: Map<String, Value>,
}

impl ConfigSetFlags {
  pub fn new(props: Map<String, Value>) -> Self {
    Self { props }
  }

  /// Read `<dir>/configsetprops.json` through `loader`.
  ///
  /// A missing resource yields empty flags. Content that is not a JSON object
  /// is rejected.
  pub async fn read_from_loader(
    loader: &dyn ResourceLoader,
    dir: &str,
    cancel: &CancellationToken,
  ) -> Result<Self, LoaderError> {
    let name = if dir.is_empty() {
      CONFIGSET_PROPERTIES_FILE.to_string()
    } else {
      format!("{}/{}", dir.trim_end_matches('/'), CONFIGSET_PROPERTIES_FILE)
    };

    let data = match loader.open_resource(&name, cancel).await {
      Ok(data) => data,
      Err(LoaderError::NotFound { .. }) => return Ok(Self::default()),
      Err(e) => return Err(e),
    };

    match serde_json::from_slice::<Value>(&data) {
      Ok(Value::Object(props)) => Ok(Self::new(props)),
      Ok(_) => Err(LoaderError::InvalidFlags {
        name,
        message: "expected a JSON object".to_string(),
      }),
      Err(e) => Err(LoaderError::InvalidFlags {
        name,
        message: e.to_string(),
      }),
    }
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.props.get(key)
  }

  pub fn is_empty(&self) -> bool {
    self.props.is_empty()
  }

  pub fn as_map(&self) -> &Map<String, Value> {
    &self.props
  }

  /// Whether the configset refuses modification. Defaults to false.
  pub fn immutable(&self) -> bool {
    self.bool_flag(IMMUTABLE_KEY).unwrap_or(false)
  }

  /// Whether the configset came from a trusted source. Defaults to true.
  pub fn trusted(&self) -> bool {
    self.bool_flag(TRUSTED_KEY).unwrap_or(true)
  }

  fn bool_flag(&self, key: &str) -> Option<bool> {
    match self.props.get(key)? {
      Value::Bool(b) => Some(*b),
      Value::String(s) => s.parse().ok(),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::FsResourceLoader;

  #[tokio::test]
  async fn test_missing_properties_yield_empty_flags() {
    let dir = tempfile::tempdir().unwrap();
    let loader = FsResourceLoader::new(dir.path());
    let cancel = CancellationToken::new();

    let flags = ConfigSetFlags::read_from_loader(&loader, ".", &cancel)
      .await
      .unwrap();
    assert!(flags.is_empty());
    assert!(!flags.immutable());
    assert!(flags.trusted());
  }

  #[tokio::test]
  async fn test_reads_properties() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
      dir.path().join(CONFIGSET_PROPERTIES_FILE),
      r#"{"immutable": "true", "trusted": false, "owner": "search-team"}"#,
    )
    .unwrap();
    let loader = FsResourceLoader::new(dir.path());
    let cancel = CancellationToken::new();

    let flags = ConfigSetFlags::read_from_loader(&loader, ".", &cancel)
      .await
      .unwrap();
    assert!(flags.immutable());
    assert!(!flags.trusted());
    assert_eq!(flags.get("owner"), Some(&Value::from("search-team")));
  }

  #[tokio::test]
  async fn test_rejects_non_object_properties() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIGSET_PROPERTIES_FILE), "[1, 2]").unwrap();
    let loader = FsResourceLoader::new(dir.path());
    let cancel = CancellationToken::new();

    let result = ConfigSetFlags::read_from_loader(&loader, ".", &cancel).await;
    assert!(matches!(result, Err(LoaderError::InvalidFlags { .. })));
  }
}
