//! plotline-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, wires the OCR programs, the geocoder and the
//! document directory into the intake pipeline, and serves the JSON API over
//! HTTP.

mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::{Router, extract::DefaultBodyLimit};
use clap::Parser;
use plotline_intake::{
  Intake, docstore::FsDocumentStore, extraction::DocumentExtractor, geocode::HttpGeocoder,
  location::LocationResolver, ocr::CommandOcr,
};
use plotline_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::{ServerConfig, environment, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "Plotline survey intake server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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
  let settings = ::config::Config::builder()
    .add_source(::config::File::from(cli.config).required(false))
    .add_source(environment())
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent() {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Collaborators.
  let names = CommandOcr::from_argv(&server_cfg.names_command)
    .context("names_command is not configured")?;
  let utm = CommandOcr::from_argv(&server_cfg.utm_command)
    .context("utm_command is not configured")?;
  let geocoder = HttpGeocoder::new(
    server_cfg.geocoding_url.clone(),
    server_cfg.geocoding_api_key.clone(),
    server_cfg.geocoding_timeout(),
  )
  .context("failed to build geocoding client")?;

  let document_dir = expand_tilde(&server_cfg.document_dir);
  let documents = FsDocumentStore::open(&document_dir, server_cfg.document_base_url.clone())
    .await
    .with_context(|| format!("failed to open document directory {document_dir:?}"))?;

  let intake = Intake::new(
    Arc::new(store),
    DocumentExtractor::new(Arc::new(names), Arc::new(utm), server_cfg.extraction_timeout()),
    LocationResolver::new(Arc::new(geocoder), server_cfg.geocoding_timeout()),
    Arc::new(documents),
  );

  let app = Router::new()
    .nest("/api", plotline_api::api_router(Arc::new(intake)))
    .nest_service("/documents", ServeDir::new(&document_dir))
    .layer(DefaultBodyLimit::max(server_cfg.max_upload_bytes))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
