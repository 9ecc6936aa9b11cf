//! MedAssist - Rust Backend
//!
//! First-aid guidance service with a multi-provider AI fallback chain.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod config;
mod error;
mod guidance;
mod llm;

use config::AiConfig;
use guidance::GuidanceService;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug level logging
    #[arg(long, default_value_t = false)]
    debug: bool,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub guidance: Arc<GuidanceService>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Determine log level based on --debug flag
    let log_level = if args.debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // Initialize logging (File + Stdout)
    let file_appender = tracing_appender::rolling::daily("logs", "medassist.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false), // File output matches plain text
        )
        .with(
            tracing_subscriber::fmt::layer().with_writer(std::io::stdout), // Keep stdout for dev
        )
        .with(env_filter)
        .init();

    tracing::info!("Log level: {}", log_level);

    // Load environment variables
    dotenvy::dotenv().ok();

    // Read provider credentials once; adapters never touch the environment
    let ai_config = AiConfig::from_env();
    let order = ai_config.provider_order();
    if order.is_empty() {
        tracing::warn!("No AI provider credentials configured; guidance requests will fail");
    } else {
        tracing::info!("AI provider fallback order: {:?}", order);
    }

    // Create app state
    let app_state = AppState {
        guidance: Arc::new(GuidanceService::new(ai_config)),
    };

    // Setup CORS - Allow credentials by mirroring request origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Build router
    let app = Router::new()
        // ============ Guidance API ============
        .route("/api/guidance", post(api::guidance::generate))
        // ============ Health Check ============
        .route("/health", get(|| async { "OK" }))
        .layer(cors)
        .with_state(app_state)
        // Several images plus an audio clip per request
        .layer(DefaultBodyLimit::max(64 * 1024 * 1024));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 5000));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
