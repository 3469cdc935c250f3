//! rps-classifier - Rock/paper/scissors classification service
//!
//! Loads the pre-trained model at startup (exits if it is missing) and serves
//! `POST /predict` plus `GET /health`.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rps_classifier::classifier::Classifier;
use rps_classifier::cli::Args;
use rps_classifier::{build_router, AppState};
use rps_common::ServiceConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_override = args.log_level.clone();

    // Config is resolved before tracing so the configured level applies
    let config = ServiceConfig::resolve(args.into_overrides());
    let log_level = match &config {
        Ok(config) => config.log_level.clone(),
        Err(_) => log_override.unwrap_or_else(|| "info".to_string()),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "rps_classifier={level},rps_common={level},tower_http={level}",
                    level = log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting rps-classifier v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = config.context("Failed to resolve configuration")?;
    match &config.source {
        Some(path) => info!("Config file: {}", path.display()),
        None => warn!("No config file found, using compiled defaults"),
    }
    info!("Model path: {}", config.model_path.display());
    info!(
        "Input size: {}x{}, threshold: {}, labels: {:?}",
        config.image_size, config.image_size, config.confidence_threshold, config.labels
    );

    // Fail fast when the model is missing or unusable
    let classifier = match Classifier::from_config(&config) {
        Ok(classifier) => {
            info!("✓ Model loaded ({})", classifier.describe());
            classifier
        }
        Err(e) => {
            error!("Failed to load model: {}", e);
            return Err(e).context("Model initialization failed");
        }
    };

    let state = AppState::new(classifier, config.max_upload_bytes);
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("rps-classifier listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
