//! HTTP surface: report, summary, ping and the activation admin routes

use std::fmt::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{HealthCheckError, Result};
use crate::registry::CheckRegistry;
use crate::report::render_report;

pub fn create_app(registry: Arc<CheckRegistry>) -> Router {
    Router::new()
        .route("/healthcheck", get(handle_healthcheck))
        .route("/healthcheck/summary", get(handle_summary))
        .route("/checks", get(handle_list_checks))
        .route("/checks/:name/activate", post(handle_activate))
        .route("/checks/:name/deactivate", post(handle_deactivate))
        .route("/ping", get(handle_ping))
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

/// Runs the registered checks and answers with the plain-text report:
/// 200 when everything is healthy, 500 when anything failed, 501 when no
/// check is registered at all.
async fn handle_healthcheck(State(registry): State<Arc<CheckRegistry>>) -> impl IntoResponse {
    info!("GET /healthcheck - running registered checks");

    let start = Instant::now();
    let results = registry.run_all_detailed().await;

    let status = if results.is_empty() {
        StatusCode::NOT_IMPLEMENTED
    } else if results.values().all(|result| result.is_healthy()) {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    let mut body = render_report(&results);
    let _ = writeln!(
        body,
        "Total execution time : {} ms ",
        start.elapsed().as_millis()
    );

    (
        status,
        [
            (header::CACHE_CONTROL, "must-revalidate,no-cache,no-store"),
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
        ],
        body,
    )
}

async fn handle_summary(State(registry): State<Arc<CheckRegistry>>) -> impl IntoResponse {
    let healthy = registry.run_all().await;
    Json(serde_json::json!({ "healthy": healthy }))
}

async fn handle_list_checks(
    State(registry): State<Arc<CheckRegistry>>,
) -> Result<impl IntoResponse> {
    let mut catalogued: Vec<String> = registry
        .all_checks()?
        .iter()
        .map(|check| check.name().to_string())
        .collect();
    catalogued.sort();

    Ok(Json(serde_json::json!({
        "catalogued": catalogued,
        "active": registry.active_names(),
    })))
}

async fn handle_activate(
    State(registry): State<Arc<CheckRegistry>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse> {
    let known = registry
        .all_checks()?
        .iter()
        .any(|check| check.name().trim() == name.trim());
    if !known {
        return Err(HealthCheckError::UnknownCheck(name));
    }

    registry.activate_check(&name)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_deactivate(
    State(registry): State<Arc<CheckRegistry>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse> {
    if !registry.active_names().contains(&name.trim().to_string()) {
        return Err(HealthCheckError::UnknownCheck(name));
    }

    registry.deactivate_check(&name);
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_ping() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "pong\n",
    )
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
