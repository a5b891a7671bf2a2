//! Campus inventory HTTP server
//!
//! Main entry point for the HTTP API server.

use std::{future::IntoFuture, sync::Arc, time::Duration};

use application::{DepartmentService, ScopeSettings, ports::AuditLogPort};
use domain::AuditBuilder;
use infrastructure::{
    AppConfig, AsyncDatabase, AsyncDatabaseConfig, DEFAULT_LOG_FILTER, LogFormat,
    SecurityValidator, SqliteAuditLog, SqliteDepartmentStore, init_tracing,
};
use presentation_http::{error::set_expose_internal_errors, routes, state::AppState};
use tokio::{net::TcpListener, signal, sync::watch};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Startup is refused on critical findings unless this is `true`
const ALLOW_INSECURE_ENV: &str = "INVENTORY_ALLOW_INSECURE_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?;

    init_tracing(LogFormat::from_config(&config.server.log_format), DEFAULT_LOG_FILTER)?;

    info!(
        "Campus inventory v{} starting ({:?})",
        env!("CARGO_PKG_VERSION"),
        config.environment
    );

    // Configuration checks
    let warnings = SecurityValidator::validate(&config);
    SecurityValidator::log_warnings(&warnings);
    let allow_insecure = std::env::var(ALLOW_INSECURE_ENV).is_ok_and(|v| v == "true");
    if SecurityValidator::should_block_startup(&config, &warnings, allow_insecure) {
        anyhow::bail!(
            "Refusing to start with critical configuration issues; \
             fix them or set {ALLOW_INSECURE_ENV}=true"
        );
    }
    set_expose_internal_errors(!config.is_production());

    // Database
    let database = AsyncDatabase::new(&AsyncDatabaseConfig::from(&config.database)).await?;
    if config.database.run_migrations {
        database.migrate().await?;
    }
    let audit_log = SqliteAuditLog::new(database.pool().clone());

    // Admin department bootstrap
    let admin_department = match &config.scoping.admin_department_code {
        Some(code) => {
            let members = config
                .scoping
                .admin_user_ids()
                .map_err(|e| anyhow::anyhow!(e))?;
            let bootstrap = DepartmentService::new(
                Arc::new(SqliteDepartmentStore::new(database.pool().clone())),
                Arc::new(audit_log.clone()),
            );
            let department = bootstrap
                .ensure_admin_department(code, &config.scoping.admin_department_name, &members)
                .await?;
            info!(code = %department.code, members = members.len(), "Admin department ready");
            Some(department.id)
        },
        None => {
            warn!("No admin department configured; scoping cannot be bypassed");
            None
        },
    };

    let settings = ScopeSettings {
        admin_department,
        missing_policy: config.scoping.missing_context_policy,
    };
    info!(policy = ?settings.missing_policy, "Department scoping configured");

    let state = AppState::sqlite(&database, config.clone(), settings);
    let app = routes::create_router(state);

    // Configure CORS layer
    let cors_layer = if !config.server.cors_enabled {
        CorsLayer::new()
    } else if config.server.allowed_origins.is_empty() {
        // Development mode: allow all origins
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use axum::http::{HeaderValue, Method};
        let origins: Vec<HeaderValue> = config
            .server
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers(Any)
    };

    // Add middleware (order matters: last added = outermost)
    let app = app
        .layer(RequestBodyLimitLayer::new(config.server.max_body_size_json_bytes))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    if let Err(e) = audit_log
        .log(&AuditBuilder::system_startup(env!("CARGO_PKG_VERSION")))
        .await
    {
        warn!(error = %e, "Failed to record startup");
    }

    info!("Server listening on http://{}", addr);
    info!("API docs: http://{}/swagger-ui", addr);

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs.unwrap_or(30));

    // Open connections get `shutdown_timeout` to drain once a signal arrives
    let (signalled_tx, mut signalled_rx) = watch::channel(());
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        _ = signalled_rx.changed() => {
            info!("Waiting up to {:?} for connections to close...", shutdown_timeout);
            match tokio::time::timeout(shutdown_timeout, &mut server).await {
                Ok(result) => result?,
                Err(_) => warn!(?shutdown_timeout, "Connections still open, shutting down anyway"),
            }
        }
    }

    if let Err(e) = audit_log.log(&AuditBuilder::system_shutdown("signal")).await {
        warn!(error = %e, "Failed to record shutdown");
    }
    database.close().await;

    info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM) and handle graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
