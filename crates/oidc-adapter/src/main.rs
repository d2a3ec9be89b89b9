//! OIDC Adapter
//!
//! Entry point for the OIDC to meeting token adapter.

use oidc_adapter::config::Config;
use oidc_adapter::routes::{self, AppState};
use oidc_adapter::signing_key::SigningKey;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration is read first so DEBUG can pick the default log filter
    let config = Config::from_env();
    let debug = config.as_ref().map(|c| c.debug).unwrap_or(false);
    let default_filter = if debug {
        "oidc_adapter=debug,tower_http=debug"
    } else {
        "oidc_adapter=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting OIDC Adapter");

    let config = config.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        keycloak_origin = %config.keycloak_origin,
        keycloak_origin_internal = %config.keycloak_origin_internal,
        keycloak_realm = %config.keycloak_realm,
        keycloak_client_id = %config.keycloak_client_id,
        keycloak_mode = %config.keycloak_mode,
        jwt_alg = %config.jwt_alg,
        jwt_hash = %config.jwt_hash,
        jwt_app_id = %config.jwt_app_id,
        jwt_app_secret = "[REDACTED]",
        jwt_exp_second = config.jwt_exp_second,
        hostname = %config.hostname,
        port = config.port,
        debug = config.debug,
        "Configuration loaded successfully"
    );

    // The signing key is created once; the service never starts without it
    let signing_key =
        SigningKey::initialize(&config.jwt_app_secret, &config.jwt_alg, &config.jwt_hash)
            .map_err(|e| {
                error!("Failed to initialize signing key: {}", e);
                e
            })?;

    info!(algorithm = ?signing_key.algorithm(), "Signing key initialized");

    let bind_address = (config.hostname.clone(), config.port);
    let state = Arc::new(AppState::new(&config, Arc::new(signing_key)));
    let app = routes::build_routes(state);

    let listener = tokio::net::TcpListener::bind(bind_address).await.map_err(|e| {
        error!("Failed to bind listener: {}", e);
        e
    })?;
    let addr = listener.local_addr()?;

    info!("OIDC Adapter listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("OIDC Adapter shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
///
/// In-flight requests are allowed to finish; no new connections are accepted.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
