//! Node path conventions shared with the coordination tree layout.

/// Root node under which every configset lives.
pub const CONFIGS_ROOT: &str = "/configs";

/// Root node under which every collection's state node lives.
pub const COLLECTIONS_ROOT: &str = "/collections";

/// Key inside a collection node's JSON naming its configset.
pub const CONFIG_NAME_PROP: &str = "configName";

/// Path of a configset's root node: `/configs/<config_set>`.
pub fn config_set_path(config_set: &str) -> String {
  format!("{}/{}", CONFIGS_ROOT, config_set)
}

/// Path of a file inside a configset: `/configs/<config_set>/<file>`.
pub fn config_path(config_set: &str, file: &str) -> String {
  format!("{}/{}/{}", CONFIGS_ROOT, config_set, file)
}

/// Path of a collection's node: `/collections/<collection>`.
pub fn collection_path(collection: &str) -> String {
  format!("{}/{}", COLLECTIONS_ROOT, collection)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_config_path() {
    assert_eq!(
      config_path("techproducts", "schema.xml"),
      "/configs/techproducts/schema.xml"
    );
    assert_eq!(
      config_path("_default", "lang/stopwords_en.txt"),
      "/configs/_default/lang/stopwords_en.txt"
    );
  }

  #[test]
  fn test_collection_and_root_paths() {
    assert_eq!(collection_path("gettingstarted"), "/collections/gettingstarted");
    assert_eq!(config_set_path("_default"), "/configs/_default");
  }
}
