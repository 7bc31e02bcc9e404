//! Configset Loader
//!
//! Resource loaders hand out the raw bytes of configuration files by name.
//! [`CoordinationResourceLoader`] roots every read at a configset's subtree in
//! the coordination store (`/configs/<name>/...`) and falls back to a parent
//! loader for anything the configset does not carry. [`FsResourceLoader`]
//! serves the same contract from a local directory.

mod coordination;
mod error;
mod flags;
mod fs;
mod loader;

pub use coordination::CoordinationResourceLoader;
pub use error::LoaderError;
pub use flags::{CONFIGSET_PROPERTIES_FILE, ConfigSetFlags};
pub use fs::FsResourceLoader;
pub use loader::{
  ResourceLoader, config_node_path, normalize_resource_name, validate_config_set_name,
};
