use std::path::{Path, PathBuf};

/// Identity of a core: which collection it serves, where it lives on disk,
/// and which configset it uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreDescriptor {
  name: String,
  collection_name: String,
  instance_dir: PathBuf,
  config_set: Option<String>,
}

impl CoreDescriptor {
  pub fn new(
    name: impl Into<String>,
    collection_name: impl Into<String>,
    instance_dir: impl Into<PathBuf>,
  ) -> Self {
    Self {
      name: name.into(),
      collection_name: collection_name.into(),
      instance_dir: instance_dir.into(),
      config_set: None,
    }
  }

  /// Name a configset up front. Only standalone mode honours this; cloud
  /// resolution replaces it with the coordination store's mapping.
  pub fn with_config_set(mut self, config_set: impl Into<String>) -> Self {
    self.config_set = Some(config_set.into());
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn collection_name(&self) -> &str {
    &self.collection_name
  }

  pub fn instance_dir(&self) -> &Path {
    &self.instance_dir
  }

  pub fn config_set(&self) -> Option<&str> {
    self.config_set.as_deref()
  }

  pub(crate) fn set_config_set(&mut self, config_set: String) {
    self.config_set = Some(config_set);
  }
}
