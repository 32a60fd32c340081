//! Jeonse Risk Analysis Server
//!
//! Accepts a real estate registry certificate (등기사항전부증명서) PDF with
//! the unit's area and the proposed jeonse deposit, and returns a risk report:
//!
//! - OCR of the certificate and extraction of address and building name
//! - Closest comparable officetel sale from the public trade registry
//! - Risk score, grade, per-feature attributions and a short summary
//!
//! ## Architecture
//!
//! The analysis pipeline is synchronous (OCR subprocesses, blocking HTTP) and
//! runs on tokio's blocking pool under a per-request timeout. The server adds:
//!
//! - Rate limiting via tower-governor
//! - Open CORS for browser clients
//! - Request tracing via tower-http

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use risk_engine::{AnalysisPipeline, PipelineConfig};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;

use api::{handle_analyze, handle_health};

/// Command-line arguments for the jeonse server
#[derive(Parser, Debug)]
#[command(name = "jeonse-server")]
#[command(about = "Jeonse fraud risk analysis server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Pipeline configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Analysis timeout in milliseconds
    #[arg(long, default_value = "120000")]
    timeout_ms: u64,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "2")]
    rate_limit: u32,

    /// Maximum upload size in megabytes
    #[arg(long, default_value = "20")]
    max_upload_mb: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnalysisPipeline>,
    /// Analysis timeout in milliseconds
    pub timeout_ms: u64,
}

/// Routes plus CORS, tracing and upload limits; rate limiting is added by `main`
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/analyze", post(handle_analyze))
        .route("/analyze", post(handle_analyze))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jeonse server on {}:{}", args.host, args.port);

    // defaults → config file → environment
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    config.apply_env()?;

    // Blocking HTTP clients and the reference table are built off the runtime
    let pipeline = tokio::task::spawn_blocking(move || AnalysisPipeline::from_config(config)).await??;
    info!(
        "Pipeline ready (query year {}, {} dpi)",
        pipeline.config().query_year,
        pipeline.config().dpi
    );

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit.max(1) * 2)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limit: {}", args.rate_limit))?,
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
        timeout_ms: args.timeout_ms,
    };

    let app = router(state, args.max_upload_mb * 1024 * 1024).layer(GovernorLayer {
        config: governor_conf,
    });

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("Analysis timeout: {}ms", args.timeout_ms);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
