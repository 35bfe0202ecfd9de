pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod services;
pub mod state;

use anyhow::Context;
use std::path::{Path, PathBuf};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
pub use config::Config;
use db::Store;

/// Installs the global tracing subscriber. `RUST_LOG` wins over
/// `general.log_level`.
pub fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let json = config.general.log_json;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .try_init()
        .context("Failed to initialize tracing")
}

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    init_tracing(&config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Init => cmd_init(cli.config.as_deref()),
        Commands::Migrate => cmd_migrate(&config).await,
        Commands::Promote { login_id } => cmd_promote(&config, &login_id).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!(
        "recipebox v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    let port = config.server.port;
    let state = api::create_app_state_from_config(config, prometheus_handle).await?;
    let app = api::router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("API server running at http://{addr}/api/v1");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}

fn cmd_init(path: Option<&Path>) -> anyhow::Result<()> {
    let path = path.map_or_else(|| PathBuf::from("config.toml"), Path::to_path_buf);

    if Config::create_default_if_missing(&path)? {
        println!("Created {}", path.display());
        println!("Set JWT_SECRET (at least {} characters) before starting the server.", config::MIN_JWT_SECRET_LEN);
    } else {
        println!("{} already exists, leaving it untouched", path.display());
    }
    Ok(())
}

async fn cmd_migrate(config: &Config) -> anyhow::Result<()> {
    Store::with_pool_options(
        &config.general.database_url,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;
    println!("Migrations applied to {}", config.general.database_url);
    Ok(())
}

async fn cmd_promote(config: &Config, login_id: &str) -> anyhow::Result<()> {
    let store = Store::with_pool_options(
        &config.general.database_url,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    if store.promote_user(login_id).await? {
        info!(login_id = %login_id, "Account promoted to ADMIN");
        println!("{login_id} is now an ADMIN");
        Ok(())
    } else {
        warn!(login_id = %login_id, "Promote failed: no such account");
        anyhow::bail!("No account with login id '{login_id}'")
    }
}
