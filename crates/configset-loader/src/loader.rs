use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use configset_coordination::paths;

use crate::error::LoaderError;

/// Loads configuration resources by name.
///
/// Names are relative to the loader's configuration root. A leading `./` or
/// `/` is ignored, and `.` names the root itself.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
  /// Read a resource's bytes.
  async fn open_resource(
    &self,
    name: &str,
    cancel: &CancellationToken,
  ) -> Result<Bytes, LoaderError>;

  /// Check whether a resource is available.
  async fn resource_exists(
    &self,
    name: &str,
    cancel: &CancellationToken,
  ) -> Result<bool, LoaderError> {
    match self.open_resource(name, cancel).await {
      Ok(_) => Ok(true),
      Err(LoaderError::NotFound { .. }) => Ok(false),
      Err(e) => Err(e),
    }
  }

  /// Human-readable location of the configuration root.
  fn describe(&self) -> String;
}

/// Strip `./` and `/` prefixes and reject parent-directory escapes.
pub fn normalize_resource_name(name: &str) -> Result<String, LoaderError> {
  let mut rest = name.trim();
  loop {
    if let Some(stripped) = rest.strip_prefix("./") {
      rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('/') {
      rest = stripped;
    } else {
      break;
    }
  }

  if rest == "." {
    rest = "";
  }

  if rest.split('/').any(|segment| segment == "..") {
    return Err(LoaderError::InvalidArgument {
      message: format!("resource name escapes the configuration root: {}", name),
    });
  }

  Ok(rest.trim_end_matches('/').to_string())
}

/// Reject configset names that cannot form a single path segment.
pub fn validate_config_set_name(config_set: &str) -> Result<(), LoaderError> {
  if config_set.trim().is_empty() {
    return Err(LoaderError::InvalidArgument {
      message: "configset name must not be empty".to_string(),
    });
  }
  if config_set.contains('/') || config_set == "." || config_set == ".." {
    return Err(LoaderError::InvalidArgument {
      message: format!("invalid configset name: {}", config_set),
    });
  }
  Ok(())
}

/// Coordination path of a resource inside a configset.
///
/// The name is normalised the same way loaders normalise it, so `./x` and `x`
/// address the same node.
pub fn config_node_path(config_set: &str, name: &str) -> Result<String, LoaderError> {
  validate_config_set_name(config_set)?;
  let name = normalize_resource_name(name)?;
  if name.is_empty() {
    Ok(paths::config_set_path(config_set))
  } else {
    Ok(paths::config_path(config_set, &name))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_normalize_resource_name() {
    assert_eq!(normalize_resource_name("schema.xml").unwrap(), "schema.xml");
    assert_eq!(normalize_resource_name("./schema.xml").unwrap(), "schema.xml");
    assert_eq!(normalize_resource_name("/lang/stop.txt").unwrap(), "lang/stop.txt");
    assert_eq!(normalize_resource_name(".").unwrap(), "");
    assert_eq!(normalize_resource_name("./").unwrap(), "");
  }

  #[test]
  fn test_config_node_path() {
    assert_eq!(
      config_node_path("_default", "./managed-schema").unwrap(),
      "/configs/_default/managed-schema"
    );
    assert_eq!(config_node_path("_default", ".").unwrap(), "/configs/_default");
    for bad in ["", " ", ".", "..", "a/b"] {
      assert!(matches!(
        config_node_path(bad, "x"),
        Err(LoaderError::InvalidArgument { .. })
      ));
    }
  }

  #[test]
  fn test_normalize_rejects_parent_escape() {
    assert!(matches!(
      normalize_resource_name("../secrets.json"),
      Err(LoaderError::InvalidArgument { .. })
    ));
    assert!(matches!(
      normalize_resource_name("lang/../../x"),
      Err(LoaderError::InvalidArgument { .. })
    ));
  }
}
