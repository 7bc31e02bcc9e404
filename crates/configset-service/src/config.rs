use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Settings for [`ConfigSetService`](crate::ConfigSetService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
  /// Directory holding named configsets for standalone cores.
  #[serde(default)]
  pub configset_base_dir: Option<PathBuf>,

  /// Reuse a loaded schema across cores while its modification version is
  /// unchanged.
  #[serde(default = "default_share_schema")]
  pub share_schema: bool,

  /// Schema resource name inside a configset.
  #[serde(default = "default_schema_file")]
  pub schema_file: String,
}

fn default_share_schema() -> bool {
  true
}

fn default_schema_file() -> String {
  "managed-schema".to_string()
}

impl Default for ServiceConfig {
  fn default() -> Self {
    Self {
      configset_base_dir: None,
      share_schema: default_share_schema(),
      schema_file: default_schema_file(),
    }
  }
}
