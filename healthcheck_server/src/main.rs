//! Main entry point for the healthcheck server binary

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use healthcheck_core::{
    create_app, run_server, CheckRegistry, DataSourceCheckProvider, HealthcheckConfig,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = HealthcheckConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", config.bind_address());

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    let registry = Arc::new(CheckRegistry::new().with_provider(DataSourceCheckProvider));

    registry
        .initialize(Some(&config.environment))
        .map_err(|e| anyhow::anyhow!("Health check discovery failed: {}", e))?;

    let checks = match &config.exclude_checks {
        Some(exclude_list) => registry.filtered_checks_from_list(exclude_list)?,
        None => registry.all_checks()?,
    };
    info!("Registering {} health checks", checks.len());
    registry.register_checks(checks);

    let app = create_app(Arc::clone(&registry));

    run_server(app, addr).await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let default_level = if cfg!(debug_assertions) { "debug" } else { "info" };

        format!(
            "{}={},healthcheck_core={},tower_http=debug",
            env!("CARGO_CRATE_NAME").replace('-', "_"),
            default_level,
            default_level
        )
        .into()
    });

    let fmt_layer = fmt::layer().with_target(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }
}
