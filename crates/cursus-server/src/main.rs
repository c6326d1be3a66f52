//! cursus server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `CURSUS_*` environment variables, opens the SQLite store, and serves the
//! JSON API over HTTP.
//!
//! # Token hash generation
//!
//! To generate the argon2 PHC string for `auth_token_hash`:
//!
//! ```sh
//! echo -n 's3cret' | cargo run -p cursus-server --bin cursus -- --hash-token
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use cursus_server::{ServerConfig, auth::hash_token};
use cursus_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Cursus training logistics server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a bearer token read from stdin and exit.
  #[arg(long)]
  hash_token: bool,
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

  // Helper mode: hash a token and exit.
  if cli.hash_token {
    let token = read_token()?;
    anyhow::ensure!(!token.is_empty(), "token must not be empty");
    let hash = hash_token(&token).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CURSUS"))
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store = SqliteStore::open(&server_cfg.database_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", server_cfg.database_path)
    })?;

  let auth = server_cfg.auth();
  if auth.is_none() {
    warn!("auth_token_hash is not set; the API is open to any client");
  }
  let cors = server_cfg
    .cors()
    .with_context(|| format!("invalid cors_origin {:?}", server_cfg.cors_origin))?;

  let app = cursus_server::router(Arc::new(store), auth, cors);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  info!("shutting down");
}

/// Read a token from the first line of stdin.
fn read_token() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  eprint!("Token: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
