//! DocuMind Server
//!
//! Entry point for the document extraction dashboard.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use documind::config::{AppConfig, load_llm_settings};
use documind::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (M-LOG-STRUCTURED)
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load .env (if present)
    let _ = dotenv();

    let config = match AppConfig::load() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let mut settings = load_llm_settings();
    settings.request_timeout = config.provider_timeout();
    if let Err(e) = settings.validate() {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    }

    info!(
        name: "config.loaded",
        port = config.server.port,
        max_file_size_mb = config.upload.max_file_size_mb,
        allowed_extensions = %config.upload.allowed_display(),
        "Application configuration loaded"
    );

    server::start_server(config, settings).await
}
