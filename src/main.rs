// invoice-lens - Multi-language invoice extractor powered by Google Gemini
// Author: kelexine (https://github.com/kelexine)

use anyhow::Result;
use clap::Parser;
use invoice_lens::cli::Args;
use invoice_lens::config::{AppConfig, API_KEY_ENV};
use invoice_lens::gemini::GeminiClient;
use invoice_lens::server::create_router;
use invoice_lens::utils::logging;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Phase 0: Pick up a local .env file, if any
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration (credential included)
    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting invoice-lens v{}", env!("CARGO_PKG_VERSION"));
    if dotenv_loaded {
        info!("Loaded environment from .env");
    }
    if config.gemini.api_key.is_none() {
        warn!(
            "{} is not set; extraction requests will fail until it is provided",
            API_KEY_ENV
        );
    }

    // Phase 3: Build the Gemini client with the credential loaded above
    let gemini_client = GeminiClient::new(&config.gemini)?;
    info!("Using model {} at {}", gemini_client.model(), gemini_client.base_url());

    if args.check {
        return match gemini_client.check_connectivity().await {
            Ok(latency) => {
                info!("Gemini API reachable in {:?}", latency);
                Ok(())
            }
            Err(e) => {
                error!("Gemini API check failed: {}", e);
                Err(e.into())
            }
        };
    }

    // Phase 4: Build and start HTTP server
    let app = create_router(config.clone(), Arc::new(gemini_client))?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 5: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
