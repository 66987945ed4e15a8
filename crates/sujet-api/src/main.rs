//! sujet server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store, and serves the JSON API. The `import` subcommand bulk-loads
//! sujets from a JSON Lines file instead of serving.
//!
//! # Bulk import
//!
//! ```text
//! cargo run -p sujet-api --bin server -- import sujets.jsonl
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use sujet_api::{AppState, ServerConfig};
use sujet_archive::{NullSink, WebhookSink};
use sujet_core::{archive::ArchivalSink, store::SujetStore as _, sujet::ImportSujet};
use sujet_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "sujet curation server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API (the default).
  Serve,

  /// Bulk-load sujets from a JSON Lines file, skipping known texts.
  Import {
    /// One object per line: `{"original_text":"...","ai_suggestion":"..."}`.
    file: PathBuf,
  },
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

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SUJET"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open the SQLite store.
  let db_path = expand_tilde(&server_cfg.db_path);
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open store at {db_path:?}"))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Import { file } => import(store, &file).await,
    Command::Serve => match &server_cfg.archive_url {
      Some(url) => {
        let sink =
          WebhookSink::new(url.clone()).context("failed to build archive sink")?;
        serve(store, sink, &server_cfg).await
      }
      None => {
        tracing::info!("no archive_url configured; archival disabled");
        serve(store, NullSink, &server_cfg).await
      }
    },
  }
}

async fn serve<A>(store: SqliteStore, sink: A, cfg: &ServerConfig) -> anyhow::Result<()>
where
  A: ArchivalSink + 'static,
{
  let state = AppState { store: Arc::new(store), sink: Arc::new(sink) };
  let app = sujet_api::router(state);

  let address = format!("{}:{}", cfg.host, cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn import(store: SqliteStore, file: &Path) -> anyhow::Result<()> {
  let contents = std::fs::read_to_string(file)
    .with_context(|| format!("failed to read {file:?}"))?;

  let mut batch = Vec::new();
  for (lineno, line) in contents.lines().enumerate() {
    if line.trim().is_empty() {
      continue;
    }
    let record: ImportSujet = serde_json::from_str(line)
      .with_context(|| format!("bad record on line {}", lineno + 1))?;
    batch.push(record);
  }

  let summary = store.import(batch).await.context("import failed")?;
  tracing::info!(added = summary.added, skipped = summary.skipped, "import finished");
  println!(
    "Added {} new sujets, skipped {} existing ones.",
    summary.added, summary.skipped
  );
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
