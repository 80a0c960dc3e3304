//! Sweet Home Bakery chatbot server
//!
//! Entry point: load configuration, then serve the widget.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use dotenvy::dotenv;
use tracing::info;

use sweet_home_chatbot::{config::AppConfig, server, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    // Initialize tracing (M-LOG-STRUCTURED)
    telemetry::init();

    let config = AppConfig::load()?;
    let settings = config.gemini_settings()?;

    info!(
        name: "config.loaded",
        host = %config.server.host,
        port = config.server.port,
        model = %settings.model,
        "Configuration loaded"
    );

    server::start_server(Arc::new(config), settings).await
}
