use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use semadepth_api::config::ServerConfig;
use semadepth_api::router::build_app_router;
use semadepth_api::state::AppState;
use semadepth_inference::local_calibrator::LocalCalibrator;
use semadepth_inference::{Calibrator, InferenceApi};
use semadepth_session::{Collaborators, Session, SessionSettings};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "semadepth_api=debug,semadepth_session=debug,semadepth_inference=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Inference collaborators ---
    let api = Arc::new(
        InferenceApi::new(config.inference.url.clone(), config.inference.timeout())
            .expect("Failed to build inference HTTP client"),
    );
    let calibrator: Arc<dyn Calibrator> = if config.inference.local_calibration {
        Arc::new(LocalCalibrator::new(api.clone(), api.clone()))
    } else {
        api.clone()
    };
    tracing::info!(
        url = %api.api_url(),
        timeout_secs = config.inference.timeout_secs,
        local_calibration = config.inference.local_calibration,
        "Inference client ready",
    );

    // --- Session ---
    let session = Session::new(
        Collaborators {
            detector: api.clone(),
            dimensions: api.clone(),
            distance: api,
            calibrator,
        },
        SessionSettings {
            accurate_mode: config.accurate_mode,
            ..SessionSettings::default()
        },
    );

    // --- Router ---
    let state = AppState::new(session, config.clone());
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
