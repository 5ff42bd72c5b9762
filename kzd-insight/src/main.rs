//! kzd-insight - Kozendo check-in insight service
//!
//! Turns wellness check-ins into coaching insights via Gemini, substituting
//! canned content when the AI service is unavailable, and keeps a check-in
//! history.

use anyhow::{Context, Result};
use clap::Parser;
use kzd_common::config::{self, TomlConfig};
use kzd_common::db::init_database;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info, warn};

use kzd_insight::services::InsightGenerator;
use kzd_insight::{build_router, AppState};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "kzd-insight")]
#[command(about = "Kozendo check-in insight service")]
#[command(version)]
struct Args {
    /// Root folder holding the database (overrides config file)
    #[arg(short, long, env = "KOZENDO_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Address to bind (overrides config file)
    #[arg(long, env = "KOZENDO_BIND")]
    bind: Option<String>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "KOZENDO_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing starts so its log level can apply
    let (toml_config, config_error) = match config::load_toml_config() {
        Ok(cfg) => (cfg, None),
        Err(e) => (TomlConfig::default(), Some(e)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&toml_config.logging.level)),
        )
        .init();

    info!(
        "Starting Kozendo Insight (kzd-insight) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if let Some(e) = config_error {
        warn!("Ignoring config file, using defaults: {}", e);
    }

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    let db_path = config::prepare_root_folder(&root_folder)
        .with_context(|| format!("Failed to prepare root folder {}", root_folder.display()))?;
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let api_key = config::resolve_api_key(&toml_config).map(|(key, source)| {
        info!("Gemini API key loaded from {}", source);
        key
    });
    let generator = InsightGenerator::from_config(&toml_config.gemini, api_key);

    let state = AppState::new(pool, generator);
    let app = build_router(state);

    let bind = args.bind.unwrap_or(toml_config.server.bind);
    let port = args.port.unwrap_or(toml_config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", bind, port))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("kzd-insight listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
