use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use configset_coordination::{InMemoryCoordinationStore, TreeSnapshot};
use configset_loader::FsResourceLoader;
use configset_service::{
  CloudConfigSetProvider, ConfigSetProvider, ConfigSetService, CoreDescriptor, ServiceConfig,
  StandaloneConfigSetProvider,
};

/// configset - resolve and inspect configsets from a coordination tree
#[derive(Parser)]
#[command(name = "configset")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.configset)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Coordination tree snapshot (default: <data-dir>/tree.json)
  #[arg(long, global = true)]
  tree: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Print the configset a collection uses
  Resolve {
    collection: String,
  },

  /// Print the modification version of a configset file
  Version {
    config_set: String,
    file: String,
  },

  /// Print the flags of a collection's configset
  Flags {
    collection: String,
  },

  /// Load a core's configset and print a summary
  Load {
    /// Collection the core belongs to
    collection: String,

    /// Core name (default: <collection>_core)
    #[arg(long)]
    core: Option<String>,

    /// Core instance directory (default: <data-dir>/cores/<core>)
    #[arg(long)]
    instance_dir: Option<PathBuf>,

    /// Read configsets from the filesystem instead of the coordination tree
    #[arg(long)]
    standalone: bool,

    /// Configset name for a standalone core
    #[arg(long, requires = "standalone")]
    config_set: Option<String>,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(log_filter())
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".configset"),
  };
  let tree_path = cli.tree.unwrap_or_else(|| data_dir.join("tree.json"));

  let Some(command) = cli.command else {
    println!("configset - use --help to see available commands");
    return Ok(());
  };

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        interrupt(&on_signal);
      }
    });

    run(command, &data_dir, &tree_path, &cancel).await
  })
}

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "warn";

fn log_filter() -> EnvFilter {
  EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn interrupt(cancel: &CancellationToken) {
  warn!("interrupt received, cancelling pending coordination calls");
  cancel.cancel();
}

async fn run(
  command: Commands,
  data_dir: &Path,
  tree_path: &Path,
  cancel: &CancellationToken,
) -> Result<()> {
  match command {
    Commands::Resolve { collection } => {
      let provider = cloud_provider(data_dir, tree_path).await?;
      let mut cd = CoreDescriptor::new(
        format!("{}_core", collection),
        &collection,
        data_dir.join("cores"),
      );
      let name = provider
        .resolve(&mut cd, cancel)
        .await
        .context("failed to resolve configset")?;
      println!("{}", name);
    }
    Commands::Version { config_set, file } => {
      let provider = cloud_provider(data_dir, tree_path).await?;
      match provider
        .modification_version(&config_set, &file, cancel)
        .await
        .context("modification version lookup failed")?
      {
        Some(version) => println!("{}", version),
        None => println!("none"),
      }
    }
    Commands::Flags { collection } => {
      let provider = cloud_provider(data_dir, tree_path).await?;
      let mut cd = CoreDescriptor::new(
        format!("{}_core", collection),
        &collection,
        data_dir.join("cores"),
      );
      let loader = provider
        .create_loader(&mut cd, cancel)
        .await
        .context("failed to create loader")?;
      let flags = provider
        .load_flags(&cd, loader.as_ref(), cancel)
        .await
        .context("failed to load configset flags")?;
      println!("{}", serde_json::to_string_pretty(flags.as_map())?);
    }
    Commands::Load {
      collection,
      core,
      instance_dir,
      standalone,
      config_set,
    } => {
      let config = read_service_config(data_dir).await?;
      let core = core.unwrap_or_else(|| format!("{}_core", collection));
      let instance_dir = instance_dir.unwrap_or_else(|| data_dir.join("cores").join(&core));

      let provider: Arc<dyn ConfigSetProvider> = if standalone {
        let base = config
          .configset_base_dir
          .clone()
          .unwrap_or_else(|| data_dir.join("configsets"));
        Arc::new(StandaloneConfigSetProvider::new(base))
      } else {
        Arc::new(cloud_provider(data_dir, tree_path).await?)
      };

      let mut cd = CoreDescriptor::new(&core, &collection, instance_dir);
      if let Some(name) = config_set {
        cd = cd.with_config_set(name);
      }

      let service = ConfigSetService::new(provider, config);
      let loaded = service
        .load(&mut cd, cancel)
        .await
        .with_context(|| format!("failed to load configset for core '{}'", core))?;

      let summary = serde_json::json!({
        "core": cd.name(),
        "collection": cd.collection_name(),
        "configset": cd.config_set(),
        "label": loaded.name,
        "root": loaded.loader.describe(),
        "flags": loaded.flags.as_map(),
        "schema_version": loaded.schema_version,
        "schema_bytes": loaded.schema.as_ref().map(|s| s.len()),
      });
      println!("{}", serde_json::to_string_pretty(&summary)?);
    }
  }

  Ok(())
}

async fn cloud_provider(data_dir: &Path, tree_path: &Path) -> Result<CloudConfigSetProvider> {
  let content = tokio::fs::read_to_string(tree_path)
    .await
    .with_context(|| format!("failed to read tree snapshot: {}", tree_path.display()))?;

  let snapshot: TreeSnapshot = serde_json::from_str(&content)
    .with_context(|| format!("failed to parse tree snapshot: {}", tree_path.display()))?;

  let store = InMemoryCoordinationStore::from_snapshot(snapshot)
    .context("failed to build coordination store from snapshot")?;

  let shared = FsResourceLoader::new(data_dir.join("shared"));
  Ok(CloudConfigSetProvider::new(Arc::new(store)).with_parent_loader(Arc::new(shared)))
}

async fn read_service_config(data_dir: &Path) -> Result<ServiceConfig> {
  let path = data_dir.join("config.json");
  match tokio::fs::read_to_string(&path).await {
    Ok(content) => serde_json::from_str(&content)
      .with_context(|| format!("failed to parse service config: {}", path.display())),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServiceConfig::default()),
    Err(e) => Err(e).with_context(|| format!("failed to read service config: {}", path.display())),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tracing_subscriber::filter::LevelFilter;
  use tracing_test::traced_test;

  #[test]
  fn test_default_log_filter_shows_warnings() {
    let filter = EnvFilter::new(DEFAULT_LOG_FILTER);
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
  }

  #[test]
  #[traced_test]
  fn test_interrupt_cancels_and_logs() {
    let cancel = CancellationToken::new();
    interrupt(&cancel);

    assert!(cancel.is_cancelled());
    assert!(logs_contain("interrupt received"));
  }
}
