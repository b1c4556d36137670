//! Oratio Eval Engine - Main Entry Point

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use oratio_api_http::{build_router, ApiConfig, AppState};
use oratio_core::application::{EvaluationService, RequestQueue, RequestQueueConfig};
use oratio_core::port::EvaluationProvider;
use oratio_infra_gemini::GeminiClient;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_HTTP_PORT: u16 = 8943;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format = std::env::var("ORATIO_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("oratio=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Oratio Eval Engine v{} starting...", VERSION);

    // 2. Load configuration from the environment
    let http_port: u16 = std::env::var("ORATIO_HTTP_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_HTTP_PORT);

    let admission_threshold: usize = std::env::var("ORATIO_ADMISSION_THRESHOLD")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5);

    let request_timeout_secs: u64 = std::env::var("ORATIO_REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(60);

    // 3. Wire up the provider adapter
    //
    // A missing key is not fatal here: the evaluate handler reports the
    // configuration error per request, everything else keeps serving.
    let provider: Option<Arc<dyn EvaluationProvider>> = match std::env::var("GEMINI_API_KEY") {
        Ok(api_key) if !api_key.is_empty() => {
            let mut client = GeminiClient::new(api_key);
            if let Ok(model) = std::env::var("ORATIO_GEMINI_MODEL") {
                client = client.with_model(model);
            }
            Some(Arc::new(client))
        }
        _ => {
            warn!("GEMINI_API_KEY not set; /evaluate will answer with a configuration error");
            None
        }
    };

    // 4. Construct the one process-wide request queue (DI wiring, no globals)
    let queue: RequestQueue<String> = RequestQueue::new(RequestQueueConfig::default());
    let evaluation = provider.map(|p| Arc::new(EvaluationService::new(queue, p)));

    let state = AppState::new(
        evaluation,
        ApiConfig {
            admission_threshold,
            request_timeout: Duration::from_secs(request_timeout_secs),
        },
    );

    // 5. Start the HTTP server
    let addr = format!("127.0.0.1:{}", http_port);
    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let router = build_router(state);

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = ?e, "HTTP server failed");
        }
    });

    info!("System ready. Waiting for evaluations...");
    info!("Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting...");

    // No drain: pending and retrying evaluations die with the process.
    server.abort();

    info!("Shutdown complete.");

    Ok(())
}
