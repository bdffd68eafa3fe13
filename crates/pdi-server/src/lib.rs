//! Wiring for the PDI people service binary.
//!
//! Loads [`ServerConfig`], opens the SQLite store, wraps it in a
//! [`FallbackStore`] sharing one [`ModeController`] with the API, and builds
//! the router.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use pdi_api::AppState;
use pdi_core::{
  mode::{DataSourceMode, ModeController},
  sample::SampleData,
  store::PeopleStore,
};
use pdi_store_memory::FallbackStore;
use pdi_store_sqlite::SqliteStore;
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PDI_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub store_path:     PathBuf,
  /// Serve sample data from the start instead of the live store.
  #[serde(default)]
  pub start_degraded: bool,
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `PDI_`-prefixed
  /// environment variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080)?
      .set_default("store_path", "pdi.sqlite")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("PDI"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn initial_mode(&self) -> DataSourceMode {
    if self.start_degraded {
      DataSourceMode::Degraded
    } else {
      DataSourceMode::Live
    }
  }
}

// ─── Store ────────────────────────────────────────────────────────────────────

/// Open the live store at `path` (with `~` expanded), seeding it with the
/// sample dataset if `seed_sample` is set and the database is empty.
pub async fn open_store(path: &Path, seed_sample: bool) -> anyhow::Result<SqliteStore> {
  let path = expand_tilde(path);
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))?;

  if seed_sample {
    if store.is_empty().await? {
      let data = SampleData::load();
      tracing::info!(
        actors = data.actors.len(),
        entities = data.entities.len(),
        "seeding empty store with sample data"
      );
      store.import(data.actors, data.teams, data.entities).await?;
    } else {
      tracing::info!("store already populated; not seeding");
    }
  }
  Ok(store)
}

/// The full application: the API over `live`, degrading to sample data.
pub fn app<L>(live: L, mode: Arc<ModeController>) -> Router
where
  L: PeopleStore + 'static,
{
  let store = FallbackStore::new(live, mode.clone());
  pdi_api::api_router(AppState::new(Arc::new(store), mode))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
