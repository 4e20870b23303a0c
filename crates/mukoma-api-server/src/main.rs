use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use mukoma_api_server::config::Settings;
use mukoma_api_server::services::LlmService;
use mukoma_api_server::utils::logger::init_logger;
use mukoma_api_server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (reads .env first so RUST_LOG/LOG_* apply to the logger)
    let settings = Settings::load()?;

    let _log_guard = init_logger()?;
    info!("🚀 Starting Mukoma.ai backend...");
    info!("✅ Configuration loaded");

    if settings.llm.api_key.is_empty() {
        warn!("OPENAI_API_KEY is not set, provider calls will be rejected");
    }

    let llm_service = Arc::new(LlmService::new(settings.llm.clone())?);

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!(
        "✅ Conversation memory at {}",
        settings.memory.file_path.display()
    );

    let state = AppState::new(settings, llm_service);
    let app = build_router(state);

    info!("🎯 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
