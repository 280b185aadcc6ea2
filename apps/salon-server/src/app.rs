use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use appointments::api::rest::openapi::openapi_json;
use appointments::config::AppointmentsConfig;
use appointments::Appointments;
use axum::{routing::get, Router};
use runtime::{AppConfig, DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::ingress;

const MEMORY_DSN: &str = "sqlite::memory:";

/// Detect the backend from the URL scheme.
pub fn detect_backend(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    let scheme = raw
        .split_once(':')
        .map(|(s, _)| s)
        .ok_or_else(|| anyhow!("Invalid database URL '{}'", cfg.redacted_url()))?;
    match scheme {
        "sqlite" | "sqlite3" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        other => Err(anyhow!("Unsupported database type: {other}")),
    }
}

pub async fn connect(cfg: &DatabaseConfig, home_dir: &Path) -> Result<DatabaseConnection> {
    let backend = detect_backend(cfg)?;
    let url = cfg.resolved_url(home_dir);

    let mut opts = ConnectOptions::new(url.clone());
    opts.acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if url.contains(":memory:") {
        // every pooled connection would otherwise open its own empty database
        opts.max_connections(1);
    } else if let Some(n) = cfg.max_conns {
        opts.max_connections(n);
    }

    tracing::info!(backend, "Connecting to database: {}", cfg.redacted_url());
    Database::connect(opts)
        .await
        .with_context(|| format!("Failed to connect to {}", cfg.redacted_url()))
}

/// Wire the appointments module against the configured store.
///
/// `mock` swaps the configured database for a throwaway in-memory SQLite
/// one; no database section at all falls back to the plain in-memory store.
pub async fn build_appointments(config: &AppConfig, mock: bool) -> Result<Appointments> {
    let module_cfg: AppointmentsConfig = config.module_config("appointments")?;
    let home_dir = Path::new(&config.server.home_dir);

    match (&config.database, mock) {
        (_, true) => {
            let db = connect(
                &DatabaseConfig {
                    url: MEMORY_DSN.to_string(),
                    max_conns: Some(1),
                },
                home_dir,
            )
            .await?;
            Appointments::with_database(&module_cfg, db).await
        }
        (Some(db_cfg), false) => {
            let db = connect(db_cfg, home_dir).await?;
            Appointments::with_database(&module_cfg, db).await
        }
        (None, false) => {
            tracing::warn!("No database configuration found, bookings will not survive a restart");
            Appointments::in_memory(&module_cfg)
        }
    }
}

/// Full application router: module routes, OpenAPI document, edge layers.
pub fn build_router(config: &AppConfig, appointments: &Appointments) -> Router {
    let router = appointments
        .register_rest(Router::new())
        .route("/openapi.json", get(openapi_json));
    ingress::with_edge_layers(router, &config.server)
}
