//! Configset Service
//!
//! Decides which configset a core uses and hands the configuration layer a
//! loader scoped to it.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ ConfigSetService                                           │
//! │  - load(descriptor, cancel) → LoadedConfigSet              │
//! │  - reuses a shared schema while its version is unchanged   │
//! └─────────────────────────────┬──────────────────────────────┘
//!                               │ Arc<dyn ConfigSetProvider>
//!             ┌─────────────────┴──────────────────┐
//! ┌───────────▼─────────────┐        ┌─────────────▼──────────────┐
//! │ CloudConfigSetProvider  │        │ StandaloneConfigSetProvider│
//! │  collection → configset │        │  <base>/<name>/conf or     │
//! │  /configs/<name>/...    │        │  <instance_dir>/conf       │
//! └─────────────────────────┘        └────────────────────────────┘
//! ```
//!
//! In cloud mode the coordination store is the only source of truth for a
//! collection's configset: whatever the descriptor carried before resolution
//! is overwritten.

mod cloud;
mod config;
mod descriptor;
mod error;
mod provider;
mod service;
mod standalone;

pub use cloud::CloudConfigSetProvider;
pub use config::ServiceConfig;
pub use descriptor::CoreDescriptor;
pub use error::ConfigSetError;
pub use provider::ConfigSetProvider;
pub use service::{ConfigSetService, LoadedConfigSet};
pub use standalone::StandaloneConfigSetProvider;
