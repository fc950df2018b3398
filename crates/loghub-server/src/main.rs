//! `loghub`: QSO log server and command-line front end.
//!
//! Reads `loghub.toml` (or the path given with `--config`) layered with
//! `LOGHUB_*` environment variables, opens the SQLite store, and either
//! serves the JSON API or runs one command against the store directly.
//!
//! ```text
//! loghub serve
//! loghub import field-day.adi --station-callsign N0CALL
//! loghub review <IMPORT_ID>
//! loghub finalize <IMPORT_ID>
//! loghub sync clublog --push
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use loghub_core::{catalog::TagCatalog, import::ImportRequest, log::EntryQuery};
use loghub_server::{AppState, ServerConfig};
use loghub_store_sqlite::SqliteStore;
use loghub_sync::{ProviderName, reconcile};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about = "Amateur-radio QSO log")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "loghub.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API.
  Serve,
  /// Stage an ADIF file as a new pending import.
  Import {
    file: PathBuf,
    #[arg(long)]
    station_callsign: Option<String>,
    #[arg(long)]
    notes: Option<String>,
  },
  /// List imports, newest first.
  Imports,
  /// Show what finalize would commit and reject.
  Review { id: Uuid },
  /// Commit the valid staged entries of an import.
  Finalize { id: Uuid },
  /// Discard a pending import.
  Cancel { id: Uuid },
  /// Write the committed log as ADIF.
  Export {
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
  /// Run one reconciliation pass against a provider.
  Sync {
    provider: String,
    /// Also push every committed entry to the provider.
    #[arg(long)]
    push: bool,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("LOGHUB").separator("__"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let catalog = TagCatalog::load(server_cfg.catalog_path.as_deref());
  let state = AppState::new(Arc::new(store), Arc::new(catalog), server_cfg.clone());
  let imports = &state.imports;

  match cli.command {
    Command::Serve => {
      let app = loghub_server::router(state.clone());
      let address = format!("{}:{}", server_cfg.host, server_cfg.port);

      tracing::info!("Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
      axum::serve(listener, app).await.context("server error")?;
    }

    Command::Import {
      file,
      station_callsign,
      notes,
    } => {
      let raw = std::fs::read(&file).with_context(|| format!("failed to read {file:?}"))?;
      let request = ImportRequest {
        station_callsign: station_callsign.or(server_cfg.station_callsign.clone()),
        notes,
        ..ImportRequest::adif_file(
          file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned()),
        )
      };
      print_json(&imports.create_import(&raw, request).await?)?;
    }

    Command::Imports => print_json(&imports.list().await?)?,
    Command::Review { id } => print_json(&imports.review(id).await?)?,
    Command::Finalize { id } => print_json(&imports.finalize(id).await?)?,
    Command::Cancel { id } => print_json(&imports.cancel(id).await?)?,

    Command::Export { output } => {
      let adif = imports.export(&EntryQuery::default()).await?;
      match output {
        Some(path) => std::fs::write(&path, adif)
          .with_context(|| format!("failed to write {path:?}"))?,
        None => print!("{adif}"),
      }
    }

    Command::Sync { provider, push } => {
      let name = ProviderName::parse(&provider)?;
      let (provider, credentials) = server_cfg.providers.resolve(name)?;
      let report = reconcile(imports.store().as_ref(), &provider, &credentials, push).await?;
      print_json(&report)?;
    }
  }

  Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
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
