//! urgencias-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite worksheet store, and serves the dashboard API over HTTP.
//!
//! ```
//! cargo run -p urgencias-server -- --config config.toml
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use urgencias_core::{memory::MemoryStore, store::TableStore};
use urgencias_server::{ServerConfig, dataset, expand_tilde, router};
use urgencias_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Urgencias dashboard server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Keep the worksheet in memory instead of opening `store_path`.
  /// Everything is lost on exit.
  #[arg(long)]
  in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  if cli.in_memory {
    tracing::warn!("using an in-memory worksheet; data will not survive a restart");
    return serve(Arc::new(MemoryStore::new()), &server_cfg).await;
  }

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  serve(Arc::new(store), &server_cfg).await
}

async fn serve<S>(store: Arc<S>, server_cfg: &ServerConfig) -> anyhow::Result<()>
where
  S: TableStore + 'static,
{
  let dataset = Arc::new(dataset(store, server_cfg));

  // Surface an unreachable store at startup rather than on the first request.
  let snapshot = dataset
    .load()
    .await
    .with_context(|| {
      format!("failed to read worksheet {:?}", server_cfg.worksheet)
    })?;
  tracing::info!(
    worksheet = %server_cfg.worksheet,
    revision = %snapshot.revision,
    rows = snapshot.table.len(),
    "worksheet loaded"
  );

  let app = router(dataset);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
