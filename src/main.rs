// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;
use std::time::Duration;

use identity_gateway::{
    api::router,
    config::{Config, LogFormat},
    logging,
    state::AppState,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Time in-flight requests get to finish after a shutdown signal.
const DRAIN_PERIOD: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (log_format, rejected_format) = LogFormat::from_env();
    logging::init(log_format);
    if let Some(value) = rejected_format {
        warn!(value = %value, "Unknown LOG_FORMAT, falling back to json");
    }

    info!("Starting identity gateway");

    let config = Config::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;
    info!(
        env = %config.env,
        bind_address = %config.bind_address(),
        issuer = %config.issuer_url,
        provider_timeout_secs = config.provider_timeout.as_secs(),
        "Configuration loaded"
    );

    // Keys are fetched before binding so a JWKS failure never accepts traffic.
    let state = AppState::initialize(&config).await.map_err(|e| {
        error!(error = %e, "Failed to initialize application state");
        e
    })?;

    let addr: SocketAddr = config.bind_address().parse().map_err(|e| {
        error!(error = %e, "Invalid bind address");
        e
    })?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Identity gateway listening on http://{addr} (docs at /docs)");

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    let server = axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown.clone().cancelled_owned());

    tokio::select! {
        result = async { server.await } => result?,
        _ = drain_deadline(&shutdown) => {
            warn!(
                drain_secs = DRAIN_PERIOD.as_secs(),
                "Drain period elapsed with requests in flight"
            );
        }
    }

    info!("Identity gateway shutdown complete");
    Ok(())
}

/// Resolves once the drain period has passed after shutdown began.
async fn drain_deadline(shutdown: &CancellationToken) {
    shutdown.cancelled().await;
    tokio::time::sleep(DRAIN_PERIOD).await;
}

/// Cancel `shutdown` on SIGINT or SIGTERM.
async fn watch_signals(shutdown: CancellationToken) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown"),
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGINT");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown");
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
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

    shutdown.cancel();
}
